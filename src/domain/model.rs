use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub department: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub hours: u32,
}

/// 分配清單內嵌的課程（後端不回傳 id）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSummary {
    #[serde(alias = "course_name")]
    pub name: String,
    #[serde(alias = "course_code")]
    pub code: String,
    #[serde(default)]
    pub hours: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allotment {
    pub teacher_name: String,
    pub teacher_email: String,
    pub courses: Vec<CourseSummary>,
}

impl Allotment {
    pub fn total_hours(&self) -> u32 {
        total_hours(&self.courses)
    }
}

pub fn total_hours(courses: &[CourseSummary]) -> u32 {
    courses.iter().map(|c| c.hours).sum()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCourse {
    pub course_name: String,
    pub course_code: String,
    pub hours: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignRequest {
    pub teacher_email: String,
    pub course_ids: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub teacher_email: String,
    #[serde(default)]
    pub courses: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherIdentity {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherDetails {
    pub teacher: TeacherIdentity,
    #[serde(default)]
    pub courses: Vec<CourseSummary>,
}

impl TeacherDetails {
    pub fn total_hours(&self) -> u32 {
        total_hours(&self.courses)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default, alias = "access_token")]
    pub token: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub token: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportScope {
    All,
    Teacher(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfReport {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// 成功的刪除請求是由哪個端點完成的
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteReceipt {
    pub label: String,
    pub status: u16,
}

/// 刪除課程時依序嘗試的端點，`{id}` 會被替換成課程 id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAttempt {
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_delete_method")]
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub body: Option<String>,
}

fn default_delete_method() -> String {
    "DELETE".to_string()
}

impl DeleteAttempt {
    pub fn new(method: &str, path: &str, body: Option<&str>) -> Self {
        Self {
            label: String::new(),
            method: method.to_string(),
            path: path.to_string(),
            body: body.map(str::to_string),
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn display_label(&self) -> String {
        if !self.label.is_empty() {
            return self.label.clone();
        }
        match &self.body {
            Some(body) => format!("{} {} (body {})", self.method, self.path, body),
            None => format!("{} {}", self.method, self.path),
        }
    }

    pub fn path_for(&self, id: i64) -> String {
        self.path.replace("{id}", &id.to_string())
    }

    pub fn body_for(&self, id: i64) -> Option<String> {
        self.body
            .as_ref()
            .map(|body| body.replace("{id}", &id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allotment_total_hours() {
        let allotment = Allotment {
            teacher_name: "A".to_string(),
            teacher_email: "a@x.com".to_string(),
            courses: vec![
                CourseSummary {
                    name: "Algo".to_string(),
                    code: "C1".to_string(),
                    hours: 3,
                },
                CourseSummary {
                    name: "DB".to_string(),
                    code: "C2".to_string(),
                    hours: 4,
                },
            ],
        };
        assert_eq!(allotment.total_hours(), 7);
    }

    #[test]
    fn test_login_response_accepts_access_token() {
        let response: LoginResponse =
            serde_json::from_str(r#"{"access_token": "abc", "token_type": "bearer"}"#).unwrap();
        assert_eq!(response.token.as_deref(), Some("abc"));

        let response: LoginResponse = serde_json::from_str(r#"{"token": "xyz"}"#).unwrap();
        assert_eq!(response.token.as_deref(), Some("xyz"));
    }

    #[test]
    fn test_teacher_details_reads_backend_course_shape() {
        let details: TeacherDetails = serde_json::from_value(serde_json::json!({
            "teacher": {"name": "A", "email": "a@x.com"},
            "courses": [{"course_name": "Algo", "course_code": "C1", "hours": 3}]
        }))
        .unwrap();
        assert_eq!(details.courses[0].name, "Algo");
        assert_eq!(details.total_hours(), 3);
    }

    #[test]
    fn test_delete_attempt_templates() {
        let attempt = DeleteAttempt::new("DELETE", "/couses/delete", Some(r#"{"id": {id}}"#));
        assert_eq!(attempt.path_for(7), "/couses/delete");
        assert_eq!(attempt.body_for(7).as_deref(), Some(r#"{"id": 7}"#));
        assert_eq!(
            attempt.display_label(),
            r#"DELETE /couses/delete (body {"id": {id}})"#
        );

        let attempt = DeleteAttempt::new("DELETE", "/courses/delete/{id}", None)
            .with_label("by path");
        assert_eq!(attempt.path_for(7), "/courses/delete/7");
        assert_eq!(attempt.display_label(), "by path");
    }
}
