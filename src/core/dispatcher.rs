use crate::core::listing::{Identified, Listing};
use crate::core::selection::SelectionStore;
use crate::domain::model::{Allotment, AssignResponse, Course, DeleteReceipt, NewCourse};
use crate::domain::ports::{Backend, Confirmer};
use crate::utils::error::{ClientError, Result};
use crate::utils::validation::require_field;
use std::future::Future;

pub const SELECTION_REQUIRED: &str = "Please select a teacher and at least one course.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// 後端已刪除；`applied` 為 false 表示畫面已卸載，本地狀態未更新
    Deleted { receipt: DeleteReceipt, applied: bool },
    Cancelled,
    AlreadyInFlight,
}

/// 對後端執行新增／刪除，成功後再更新本地狀態。不自動重試。
pub struct MutationDispatcher<B: Backend, C: Confirmer> {
    backend: B,
    confirmer: C,
}

impl<B: Backend, C: Confirmer> MutationDispatcher<B, C> {
    pub fn new(backend: B, confirmer: C) -> Self {
        Self { backend, confirmer }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// 成功才清空選擇；失敗時保留使用者的選擇以便修正後重送
    pub async fn submit_allotment(&self, selection: &mut SelectionStore) -> Result<AssignResponse> {
        let request = selection
            .assign_request()
            .ok_or_else(|| ClientError::validation(SELECTION_REQUIRED))?;

        match self.backend.assign_courses(&request).await {
            Ok(response) => {
                tracing::info!(
                    "✅ Assigned {} course(s) to {}",
                    request.course_ids.len(),
                    request.teacher_email
                );
                selection.clear();
                Ok(response)
            }
            Err(e) => {
                tracing::error!("❌ Error assigning courses to {}: {}", request.teacher_email, e);
                Err(e)
            }
        }
    }

    /// 以目前選擇取代該教師的整組課程（而非合併）
    pub async fn replace_allotment(&self, selection: &mut SelectionStore) -> Result<AssignResponse> {
        let request = selection
            .assign_request()
            .ok_or_else(|| ClientError::validation(SELECTION_REQUIRED))?;

        let response = self.backend.replace_allotment(&request).await.map_err(|e| {
            tracing::error!("❌ Error updating allotment for {}: {}", request.teacher_email, e);
            e
        })?;
        tracing::info!("✅ Allotment for {} replaced", request.teacher_email);
        selection.clear();
        Ok(response)
    }

    pub async fn create_course(&self, course: &NewCourse) -> Result<()> {
        require_field("Course name", &course.course_name)?;
        require_field("Course code", &course.course_code)?;

        self.backend.create_course(course).await.map_err(|e| {
            tracing::error!("❌ Failed to register course {}: {}", course.course_code, e);
            e
        })?;
        tracing::info!("✅ Course {} registered", course.course_code);
        Ok(())
    }

    pub async fn delete_course(&self, listing: &Listing<Course>, id: i64) -> Result<DeleteOutcome> {
        self.delete_with(
            listing,
            id,
            "Are you sure you want to delete this course?",
            || self.backend.delete_course(id),
        )
        .await
    }

    pub async fn delete_allotment(
        &self,
        listing: &Listing<Allotment>,
        teacher_email: &str,
    ) -> Result<DeleteOutcome> {
        let prompt = format!(
            "Are you sure you want to delete allotments for {}?",
            teacher_email
        );
        self.delete_with(listing, teacher_email.to_string(), &prompt, || {
            self.backend.delete_allotment(teacher_email)
        })
        .await
    }

    /// Idle → Confirming → (取消回 Idle) | InFlight → 成功移除 | 失敗回 Idle
    async fn delete_with<T, F, Fut>(
        &self,
        listing: &Listing<T>,
        key: T::Key,
        prompt: &str,
        send: F,
    ) -> Result<DeleteOutcome>
    where
        T: Identified + Clone,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<DeleteReceipt>>,
    {
        if !listing.begin_confirm(&key) {
            tracing::warn!("🗑️ Delete of {:?} already in progress", key);
            return Ok(DeleteOutcome::AlreadyInFlight);
        }

        if !self.confirmer.confirm(prompt) {
            listing.reset(&key);
            tracing::debug!("🗑️ Delete of {:?} cancelled", key);
            return Ok(DeleteOutcome::Cancelled);
        }

        listing.begin_delete(&key);
        match send().await {
            Ok(receipt) => {
                let applied = listing.complete_delete(&key);
                if applied {
                    tracing::info!(
                        "✅ Deleted {:?} (via {}, HTTP {})",
                        key,
                        receipt.label,
                        receipt.status
                    );
                } else {
                    tracing::debug!("🗑️ {:?} deleted but listing is detached", key);
                }
                Ok(DeleteOutcome::Deleted { receipt, applied })
            }
            Err(e) => {
                listing.reset(&key);
                tracing::error!("❌ Delete of {:?} failed: {}", key, e);
                for attempt in e.attempts() {
                    tracing::error!("   {}", attempt);
                }
                Err(e)
            }
        }
    }
}
