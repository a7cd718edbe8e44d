use crate::domain::model::{
    Allotment, AssignRequest, AssignResponse, Course, Credentials, DeleteAttempt, DeleteReceipt,
    LoginResponse, NewCourse, PdfReport, ReportScope, ResetPasswordRequest, Teacher,
    TeacherDetails,
};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn timeout_seconds(&self) -> Option<u64>;
    fn delete_course_attempts(&self) -> &[DeleteAttempt];
}

/// 確認閘門：在送出刪除前詢問使用者（阻塞式 yes/no）
pub trait Confirmer: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// 後端 REST API。列表方法回傳已正規化的紀錄。
#[async_trait]
pub trait Backend: Send + Sync {
    async fn list_teachers(&self) -> Result<Vec<Teacher>>;
    async fn list_courses(&self) -> Result<Vec<Course>>;
    async fn list_allotments(&self) -> Result<Vec<Allotment>>;

    async fn create_course(&self, course: &NewCourse) -> Result<()>;
    async fn assign_courses(&self, request: &AssignRequest) -> Result<AssignResponse>;
    async fn replace_allotment(&self, request: &AssignRequest) -> Result<AssignResponse>;
    async fn delete_course(&self, id: i64) -> Result<DeleteReceipt>;
    async fn delete_allotment(&self, teacher_email: &str) -> Result<DeleteReceipt>;

    async fn teacher_details(&self, email: &str) -> Result<TeacherDetails>;
    async fn download_report(&self, scope: &ReportScope) -> Result<PdfReport>;

    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse>;
    async fn reset_password(&self, request: &ResetPasswordRequest) -> Result<()>;
}
