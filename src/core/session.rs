use crate::domain::model::{Credentials, LoginResponse, ResetPasswordRequest, TeacherDetails};
use crate::domain::ports::Backend;
use crate::utils::error::{ClientError, Result};
use crate::utils::validation::{require_field, validate_new_password};
use std::sync::{Arc, PoisonError, RwLock};

/// 本次執行期間的登入狀態（不落地保存）。明確傳入需要它的元件。
#[derive(Debug, Default)]
pub struct Session {
    teacher_email: RwLock<Option<String>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, email: &str) {
        *self
            .teacher_email
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(email.to_string());
    }

    pub fn sign_out(&self) {
        *self
            .teacher_email
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn teacher_email(&self) -> Option<String> {
        self.teacher_email
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.teacher_email().is_some()
    }
}

/// 教師登入、個人資料與重設密碼
pub struct AuthService<B: Backend> {
    backend: B,
    session: Arc<Session>,
}

impl<B: Backend> AuthService<B> {
    pub fn new(backend: B, session: Arc<Session>) -> Self {
        Self { backend, session }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        require_field("Email", email)?;
        require_field("Password", password)?;

        let credentials = Credentials {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let response = self.backend.login(&credentials).await.map_err(|e| {
            tracing::warn!("🔐 Login failed for {}: {}", credentials.email, e);
            e
        })?;

        let email = response.email.as_deref().unwrap_or(&credentials.email);
        self.session.sign_in(email);
        tracing::info!("🔐 Signed in as {}", email);
        Ok(response)
    }

    pub fn logout(&self) {
        self.session.sign_out();
    }

    /// 沒有登入身分時不發出請求，直接回傳 SessionExpired
    pub async fn my_details(&self) -> Result<TeacherDetails> {
        let email = self
            .session
            .teacher_email()
            .ok_or(ClientError::SessionExpired)?;
        self.backend.teacher_details(&email).await
    }

    pub async fn reset_password(
        &self,
        email: &str,
        token: &str,
        password: &str,
        confirm: &str,
    ) -> Result<()> {
        validate_new_password(password, confirm)?;
        require_field("Email", email)?;

        let request = ResetPasswordRequest {
            email: email.trim().to_string(),
            token: token.to_string(),
            password: password.to_string(),
        };
        self.backend.reset_password(&request).await?;
        tracing::info!("🔐 Password reset for {}", request.email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_sign_in_and_out() {
        let session = Session::new();
        assert!(!session.is_signed_in());

        session.sign_in("a@x.com");
        assert_eq!(session.teacher_email().as_deref(), Some("a@x.com"));

        session.sign_in("b@x.com");
        assert_eq!(session.teacher_email().as_deref(), Some("b@x.com"));

        session.sign_out();
        assert_eq!(session.teacher_email(), None);
    }
}
