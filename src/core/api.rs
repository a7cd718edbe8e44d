use crate::core::normalize::normalize;
use crate::domain::model::{
    Allotment, AssignRequest, AssignResponse, Course, Credentials, DeleteAttempt, DeleteReceipt,
    LoginResponse, NewCourse, PdfReport, ReportScope, ResetPasswordRequest, Teacher,
    TeacherDetails,
};
use crate::domain::ports::{Backend, ConfigProvider};
use crate::utils::error::{ClientError, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::{header, Client, Method, RequestBuilder, Response};
use std::time::Duration;
use url::Url;

pub const TEACHERS_PATH: &str = "/auth/list";
pub const COURSES_PATH: &str = "/add/courses/all";
pub const CREATE_COURSE_PATH: &str = "/add/courses";
pub const ALLOTMENTS_PATH: &str = "/admin/view-all";
pub const ASSIGN_PATH: &str = "/allotments/assign";
pub const EDIT_ALLOTMENT_PATH: &str = "/allotments/edit";
pub const DELETE_ALLOTMENT_PATH: &str = "/allotments/delete";
pub const TEACHER_VIEW_PATH: &str = "/teacher/view";
pub const TEACHER_REPORT_PATH: &str = "/teacher/download";
pub const ALL_REPORT_PATH: &str = "/admin/download-all";
pub const LOGIN_PATH: &str = "/auth/login";
pub const RESET_PASSWORD_PATH: &str = "/auth/reset-password";

/// 後端 REST API 的 reqwest 實作
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    timeout: Option<Duration>,
    delete_course_attempts: Vec<DeleteAttempt>,
}

impl HttpBackend {
    pub fn new<C: ConfigProvider>(config: &C) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url().trim_end_matches('/').to_string(),
            timeout: config.timeout_seconds().map(Duration::from_secs),
            delete_course_attempts: config.delete_course_attempts().to_vec(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 路徑最後一段是使用者資料（email），需經過編碼
    fn url_with_segment(&self, prefix: &str, segment: &str) -> Result<Url> {
        let mut url = Url::parse(&self.url(prefix)).map_err(|e| ClientError::Config {
            message: format!("Invalid backend URL '{}': {}", self.base_url, e),
        })?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Config {
                message: format!("Backend URL '{}' cannot take path segments", self.base_url),
            })?
            .push(segment);
        Ok(url)
    }

    fn request(&self, method: Method, url: impl reqwest::IntoUrl) -> RequestBuilder {
        let request = self.client.request(method, url);
        match self.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        }
    }

    /// 送出請求；非 2xx 轉成 `ClientError::Network`
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        tracing::debug!("📡 {} -> HTTP {}", response.url(), response.status());

        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Network { status, body })
    }

    async fn get_json(&self, path: &str) -> Result<serde_json::Value> {
        let url = self.url(path);
        tracing::debug!("📡 GET {}", url);
        let response = self.send(self.request(Method::GET, url)).await?;
        Ok(response.json().await?)
    }

    async fn send_allotment(&self, method: Method, path: &str, request: &AssignRequest) -> Result<AssignResponse> {
        let url = self.url(path);
        tracing::debug!("📡 {} {} ({} courses)", method, url, request.course_ids.len());
        let response = self.send(self.request(method, url).json(request)).await?;

        // 後端回應內容僅供顯示；空白或非 JSON 的成功回應也算成功
        let text = response.text().await?;
        Ok(serde_json::from_str(&text).unwrap_or_default())
    }

    async fn try_delete_attempt(&self, attempt: &DeleteAttempt, id: i64) -> std::result::Result<u16, String> {
        let label = attempt.display_label();
        let method = Method::from_bytes(attempt.method.to_uppercase().as_bytes())
            .map_err(|_| format!("{} -> invalid method '{}'", label, attempt.method))?;

        let mut request = self.request(method, self.url(&attempt.path_for(id)));
        if let Some(body) = attempt.body_for(id) {
            let payload: serde_json::Value = serde_json::from_str(&body)
                .map_err(|e| format!("{} -> invalid body template: {}", label, e))?;
            request = request.json(&payload);
        }

        let response = request
            .send()
            .await
            .map_err(|e| format!("{} -> {}", label, e))?;
        let status = response.status();
        if status.is_success() {
            return Ok(status.as_u16());
        }

        let text = response.text().await.unwrap_or_default();
        if text.is_empty() {
            Err(format!("{} -> HTTP {}", label, status.as_u16()))
        } else {
            Err(format!("{} -> HTTP {}, {}", label, status.as_u16(), text))
        }
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_teachers(&self) -> Result<Vec<Teacher>> {
        let raw = self.get_json(TEACHERS_PATH).await?;
        Ok(normalize(&raw))
    }

    async fn list_courses(&self) -> Result<Vec<Course>> {
        let raw = self.get_json(COURSES_PATH).await?;
        Ok(normalize(&raw))
    }

    async fn list_allotments(&self) -> Result<Vec<Allotment>> {
        let raw = self.get_json(ALLOTMENTS_PATH).await?;
        Ok(normalize(&raw))
    }

    async fn create_course(&self, course: &NewCourse) -> Result<()> {
        let url = self.url(CREATE_COURSE_PATH);
        tracing::debug!("📡 POST {} ({})", url, course.course_code);
        self.send(self.request(Method::POST, url).json(course)).await?;
        Ok(())
    }

    async fn assign_courses(&self, request: &AssignRequest) -> Result<AssignResponse> {
        self.send_allotment(Method::POST, ASSIGN_PATH, request).await
    }

    async fn replace_allotment(&self, request: &AssignRequest) -> Result<AssignResponse> {
        self.send_allotment(Method::PUT, EDIT_ALLOTMENT_PATH, request).await
    }

    /// 依序嘗試設定中的候選端點，第一個成功即停止；全部失敗時彙整每次的錯誤
    async fn delete_course(&self, id: i64) -> Result<DeleteReceipt> {
        if self.delete_course_attempts.is_empty() {
            return Err(ClientError::Config {
                message: "No course delete endpoints configured".to_string(),
            });
        }

        let mut failures = Vec::new();
        for attempt in &self.delete_course_attempts {
            match self.try_delete_attempt(attempt, id).await {
                Ok(status) => {
                    if !failures.is_empty() {
                        tracing::info!(
                            "🗑️ Course {} deleted after {} failed attempt(s)",
                            id,
                            failures.len()
                        );
                    }
                    return Ok(DeleteReceipt {
                        label: attempt.display_label(),
                        status,
                    });
                }
                Err(failure) => {
                    tracing::warn!("🗑️ {}", failure);
                    failures.push(failure);
                }
            }
        }

        Err(ClientError::DeleteFailed { attempts: failures })
    }

    async fn delete_allotment(&self, teacher_email: &str) -> Result<DeleteReceipt> {
        let url = self.url_with_segment(DELETE_ALLOTMENT_PATH, teacher_email)?;
        tracing::debug!("📡 DELETE {}", url);
        let response = self.send(self.request(Method::DELETE, url)).await?;
        Ok(DeleteReceipt {
            label: "DELETE /allotments/delete/:teacherEmail".to_string(),
            status: response.status().as_u16(),
        })
    }

    async fn teacher_details(&self, email: &str) -> Result<TeacherDetails> {
        let url = self.url_with_segment(TEACHER_VIEW_PATH, email)?;
        tracing::debug!("📡 GET {}", url);
        match self.send(self.request(Method::GET, url)).await {
            Ok(response) => Ok(response.json().await?),
            Err(ClientError::Network { status: 404, body }) => Err(ClientError::NotFound {
                what: not_found_detail(&body).unwrap_or_else(|| format!("Teacher {}", email)),
            }),
            Err(e) => Err(e),
        }
    }

    async fn download_report(&self, scope: &ReportScope) -> Result<PdfReport> {
        let url = match scope {
            ReportScope::All => Url::parse(&self.url(ALL_REPORT_PATH)).map_err(|e| {
                ClientError::Config {
                    message: format!("Invalid backend URL '{}': {}", self.base_url, e),
                }
            })?,
            ReportScope::Teacher(email) => self.url_with_segment(TEACHER_REPORT_PATH, email)?,
        };
        tracing::debug!("📡 GET {}", url);

        let response = self.send(self.request(Method::GET, url)).await?;
        let filename = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(filename_from_disposition)
            .unwrap_or_else(fallback_report_filename);
        let bytes = response.bytes().await?.to_vec();

        tracing::info!("📄 Downloaded {} ({} bytes)", filename, bytes.len());
        Ok(PdfReport { filename, bytes })
    }

    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse> {
        let url = self.url(LOGIN_PATH);
        tracing::debug!("📡 POST {} ({})", url, credentials.email);
        let response = self
            .send(self.request(Method::POST, url).json(credentials))
            .await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text).unwrap_or_default())
    }

    async fn reset_password(&self, request: &ResetPasswordRequest) -> Result<()> {
        let url = self.url(RESET_PASSWORD_PATH);
        tracing::debug!("📡 POST {} ({})", url, request.email);
        self.send(self.request(Method::POST, url).json(request)).await?;
        Ok(())
    }
}

/// FastAPI 的 404 會帶 `{"detail": "..."}`
fn not_found_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let detail = value.get("detail")?.as_str()?.trim();
    let detail = detail.strip_suffix(" not found").unwrap_or(detail);
    (!detail.is_empty()).then(|| detail.to_string())
}

/// 從 `Content-Disposition` 取出檔名，接受有無引號兩種寫法
pub fn filename_from_disposition(value: &str) -> Option<String> {
    let re = Regex::new(r#"filename\*?=(?:UTF-8'')?"?([^";]+)"?"#).ok()?;
    let name = re.captures(value)?.get(1)?.as_str().trim();
    (!name.is_empty()).then(|| name.to_string())
}

fn fallback_report_filename() -> String {
    format!("allotments_{}.pdf", chrono::Local::now().format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::toml_config::ClientConfig;
    use httpmock::prelude::*;

    fn backend_for(server: &MockServer) -> HttpBackend {
        HttpBackend::new(&ClientConfig::new(server.base_url()))
    }

    #[test]
    fn test_filename_from_disposition() {
        assert_eq!(
            filename_from_disposition("attachment; filename=all_teachers_report.pdf").as_deref(),
            Some("all_teachers_report.pdf")
        );
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="teacher_a@x.com_report.pdf""#)
                .as_deref(),
            Some("teacher_a@x.com_report.pdf")
        );
        assert_eq!(filename_from_disposition("inline"), None);
    }

    #[test]
    fn test_fallback_filename_is_pdf() {
        let name = fallback_report_filename();
        assert!(name.starts_with("allotments_"));
        assert!(name.ends_with(".pdf"));
    }

    #[test]
    fn test_not_found_detail() {
        assert_eq!(
            not_found_detail(r#"{"detail": "Teacher not found"}"#).as_deref(),
            Some("Teacher")
        );
        assert_eq!(
            not_found_detail(r#"{"detail": "No courses assigned to this teacher"}"#).as_deref(),
            Some("No courses assigned to this teacher")
        );
        assert_eq!(not_found_detail("<html>"), None);
    }

    #[tokio::test]
    async fn test_list_teachers_normalizes_wrapped_payload() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path(TEACHERS_PATH);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"users": [
                    {"user_email": "a@x.com", "full_name": "Alice"}
                ]}));
        });

        let teachers = backend_for(&server).list_teachers().await.unwrap();

        api_mock.assert();
        assert_eq!(teachers.len(), 1);
        assert_eq!(teachers[0].email, "a@x.com");
        assert_eq!(teachers[0].name, "Alice");
    }

    #[tokio::test]
    async fn test_list_courses_http_error_is_network_kind() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(COURSES_PATH);
            then.status(500).body("boom");
        });

        let err = backend_for(&server).list_courses().await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Network { status: 500, ref body } if body == "boom"
        ));
    }

    #[tokio::test]
    async fn test_malformed_json_is_network_kind() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(ALLOTMENTS_PATH);
            then.status(200).body("{not json");
        });

        let err = backend_for(&server).list_allotments().await.unwrap_err();
        assert_eq!(err.kind(), crate::utils::error::ErrorKind::Network);
    }

    #[tokio::test]
    async fn test_delete_allotment_uses_single_endpoint() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(DELETE).path("/allotments/delete/a@x.com");
            then.status(204);
        });

        let receipt = backend_for(&server).delete_allotment("a@x.com").await.unwrap();

        api_mock.assert();
        assert_eq!(receipt.status, 204);
    }

    #[tokio::test]
    async fn test_assign_tolerates_empty_success_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(ASSIGN_PATH);
            then.status(200);
        });

        let response = backend_for(&server)
            .assign_courses(&AssignRequest {
                teacher_email: "a@x.com".to_string(),
                course_ids: vec![1],
            })
            .await
            .unwrap();
        assert_eq!(response, AssignResponse::default());
    }

    #[tokio::test]
    async fn test_course_delete_accepts_no_content() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(DELETE).path("/couses/delete/5");
            then.status(204);
        });

        let receipt = backend_for(&server).delete_course(5).await.unwrap();

        api_mock.assert();
        assert_eq!(receipt.status, 204);
        assert_eq!(receipt.label, "DELETE /couses/delete/:id");
    }

    #[tokio::test]
    async fn test_replace_allotment_sends_put() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(PUT).path(EDIT_ALLOTMENT_PATH);
            then.status(200).json_body(serde_json::json!({"message": "updated"}));
        });

        let response = backend_for(&server)
            .replace_allotment(&AssignRequest {
                teacher_email: "a@x.com".to_string(),
                course_ids: vec![2],
            })
            .await
            .unwrap();

        api_mock.assert();
        assert_eq!(response.message, "updated");
    }
}
