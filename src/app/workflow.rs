use crate::core::dispatcher::{DeleteOutcome, MutationDispatcher};
use crate::core::listing::Listing;
use crate::core::selection::SelectionStore;
use crate::domain::model::{Allotment, AssignResponse, Course, NewCourse, ReportScope, Teacher};
use crate::domain::ports::{Backend, Confirmer, Storage};
use crate::utils::error::{ClientError, Result};

/// 分配頁面的狀態擁有者：三個來源集合、目前的選擇與 dispatcher。
///
/// 卸載 (drop) 時會 detach 所有集合，晚到的回應不再改動它們。
pub struct AllotmentWorkflow<B: Backend, C: Confirmer> {
    dispatcher: MutationDispatcher<B, C>,
    teachers: Listing<Teacher>,
    courses: Listing<Course>,
    allotments: Listing<Allotment>,
    selection: SelectionStore,
}

impl<B: Backend, C: Confirmer> AllotmentWorkflow<B, C> {
    pub fn new(backend: B, confirmer: C) -> Self {
        Self {
            dispatcher: MutationDispatcher::new(backend, confirmer),
            teachers: Listing::default(),
            courses: Listing::default(),
            allotments: Listing::default(),
            selection: SelectionStore::new(),
        }
    }

    pub fn backend(&self) -> &B {
        self.dispatcher.backend()
    }

    pub fn teachers(&self) -> &Listing<Teacher> {
        &self.teachers
    }

    pub fn courses(&self) -> &Listing<Course> {
        &self.courses
    }

    pub fn allotments(&self) -> &Listing<Allotment> {
        &self.allotments
    }

    pub fn selection(&self) -> &SelectionStore {
        &self.selection
    }

    // 載入失敗時保留原本的集合，錯誤交給呼叫端顯示

    pub async fn load_teachers(&self) -> Result<usize> {
        let teachers = self.backend().list_teachers().await.map_err(|e| {
            tracing::error!("❌ Error fetching teachers: {}", e);
            e
        })?;
        let count = teachers.len();
        self.teachers.replace(teachers);
        tracing::debug!("Loaded {} teacher(s)", count);
        Ok(count)
    }

    pub async fn load_courses(&self) -> Result<usize> {
        let courses = self.backend().list_courses().await.map_err(|e| {
            tracing::error!("❌ Error fetching courses: {}", e);
            e
        })?;
        let count = courses.len();
        self.courses.replace(courses);
        tracing::debug!("Loaded {} course(s)", count);
        Ok(count)
    }

    pub async fn load_allotments(&self) -> Result<usize> {
        let allotments = self.backend().list_allotments().await.map_err(|e| {
            tracing::error!("❌ Error fetching allotments: {}", e);
            e
        })?;
        let count = allotments.len();
        self.allotments.replace(allotments);
        tracing::debug!("Loaded {} allotment(s)", count);
        Ok(count)
    }

    /// 分配表單需要的兩份清單，同時載入
    pub async fn load_assignment_form(&self) -> Result<()> {
        let (teachers, courses) = tokio::join!(self.load_teachers(), self.load_courses());
        teachers?;
        courses?;
        Ok(())
    }

    /// 只接受已載入的教師；清單為空（尚未載入）時不檢查
    pub fn select_teacher(&mut self, email: &str) -> Result<()> {
        let email = email.trim();
        if !email.is_empty()
            && !self.teachers.is_empty()
            && !self.teachers.contains(&email.to_string())
        {
            return Err(ClientError::validation(format!(
                "Teacher {} is not registered.",
                email
            )));
        }
        self.selection.select_teacher(email);
        Ok(())
    }

    pub fn add_course(&mut self, id: i64) -> Result<bool> {
        if !self.courses.is_empty() && !self.courses.contains(&id) {
            return Err(ClientError::validation(format!(
                "Course {} is not in the catalog.",
                id
            )));
        }
        Ok(self.selection.add_course(id))
    }

    pub fn remove_course(&mut self, id: i64) -> bool {
        self.selection.remove_course(id)
    }

    pub fn selected_courses(&self) -> Vec<Course> {
        let catalog = self.courses.source();
        self.selection
            .selected_courses(&catalog)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn submit(&mut self) -> Result<AssignResponse> {
        let response = self.dispatcher.submit_allotment(&mut self.selection).await?;
        self.reload_allotments_quietly().await;
        Ok(response)
    }

    pub async fn reassign(&mut self) -> Result<AssignResponse> {
        let response = self.dispatcher.replace_allotment(&mut self.selection).await?;
        self.reload_allotments_quietly().await;
        Ok(response)
    }

    /// 新增後重新載入課程目錄，讓新課程出現在清單中
    pub async fn create_course(&self, course: &NewCourse) -> Result<()> {
        self.dispatcher.create_course(course).await?;
        if let Err(e) = self.load_courses().await {
            tracing::warn!("⚠️ Course registered but catalog reload failed: {}", e);
        }
        Ok(())
    }

    pub async fn delete_course(&self, id: i64) -> Result<DeleteOutcome> {
        self.dispatcher.delete_course(&self.courses, id).await
    }

    pub async fn delete_allotment(&self, teacher_email: &str) -> Result<DeleteOutcome> {
        self.dispatcher
            .delete_allotment(&self.allotments, teacher_email)
            .await
    }

    /// 下載 PDF 報表並寫入儲存；回傳完整路徑
    pub async fn download_report<S: Storage>(
        &self,
        scope: &ReportScope,
        storage: &S,
    ) -> Result<String> {
        let report = self.backend().download_report(scope).await.map_err(|e| {
            tracing::error!("❌ Error downloading PDF: {}", e);
            e
        })?;
        let path = storage.write_file(&report.filename, &report.bytes).await?;
        tracing::info!("📄 Report saved to {} ({} bytes)", path, report.bytes.len());
        Ok(path)
    }

    async fn reload_allotments_quietly(&self) {
        if let Err(e) = self.load_allotments().await {
            tracing::warn!("⚠️ Allotment list reload failed: {}", e);
        }
    }
}

impl<B: Backend, C: Confirmer> Drop for AllotmentWorkflow<B, C> {
    fn drop(&mut self) {
        self.teachers.detach();
        self.courses.detach();
        self.allotments.detach();
    }
}
