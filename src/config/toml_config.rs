use crate::domain::model::DeleteAttempt;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ClientError, Result};
use crate::utils::validation::{
    validate_endpoint_path, validate_positive_number, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const BASE_URL_ENV: &str = "TCA_BASE_URL";
pub const DEFAULT_CONFIG_FILE: &str = "tca-admin.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub backend: BackendConfig,
    #[serde(default)]
    pub delete_course: DeleteCourseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteCourseConfig {
    #[serde(default = "default_delete_attempts")]
    pub attempts: Vec<DeleteAttempt>,
}

impl Default for DeleteCourseConfig {
    fn default() -> Self {
        Self {
            attempts: default_delete_attempts(),
        }
    }
}

/// 後端課程刪除路由不一致，依序嘗試這些端點
pub fn default_delete_attempts() -> Vec<DeleteAttempt> {
    vec![
        DeleteAttempt::new("DELETE", "/couses/delete/{id}", None)
            .with_label("DELETE /couses/delete/:id"),
        DeleteAttempt::new("DELETE", "/courses/delete/{id}", None)
            .with_label("DELETE /courses/delete/:id"),
        DeleteAttempt::new("DELETE", "/add/courses/delete/{id}", None)
            .with_label("DELETE /add/courses/delete/:id"),
        DeleteAttempt::new("DELETE", "/couses/delete", Some(r#"{"id": {id}}"#))
            .with_label("DELETE /couses/delete (body { id })"),
    ]
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            backend: BackendConfig {
                base_url: base_url.into(),
                timeout_seconds: None,
            },
            delete_course: DeleteCourseConfig::default(),
        }
    }

    /// 只用環境變數 `TCA_BASE_URL` 組成設定
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ClientError::MissingConfig {
                field: BASE_URL_ENV.to_string(),
            })?;
        Ok(Self::new(base_url))
    }

    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${TCA_BASE_URL})；未設定的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").map_err(|e| ClientError::Config {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 有設定檔就讀檔，否則退回環境變數；`base_url_override` 優先
    pub fn load(path: Option<&Path>, base_url_override: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE)?,
            None => match base_url_override {
                Some(url) => Self::new(url),
                None => Self::from_env()?,
            },
        };
        if let Some(url) = base_url_override {
            config.backend.base_url = url.to_string();
        }
        Ok(config)
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_url("backend.base_url", &self.backend.base_url)?;

        if let Some(timeout) = self.backend.timeout_seconds {
            validate_positive_number("backend.timeout_seconds", timeout, 1)?;
        }

        let attempts = &self.delete_course.attempts;
        if attempts.is_empty() {
            return Err(ClientError::InvalidConfigValue {
                field: "delete_course.attempts".to_string(),
                value: "[]".to_string(),
                reason: "At least one delete endpoint is required".to_string(),
            });
        }

        for (index, attempt) in attempts.iter().enumerate() {
            let field = format!("delete_course.attempts[{}]", index);
            validate_endpoint_path(&format!("{}.path", field), &attempt.path)?;

            let method = attempt.method.to_uppercase();
            if method != "DELETE" && method != "POST" {
                return Err(ClientError::InvalidConfigValue {
                    field: format!("{}.method", field),
                    value: attempt.method.clone(),
                    reason: "Supported methods: DELETE, POST".to_string(),
                });
            }

            if let Some(body) = attempt.body_for(0) {
                if let Err(e) = serde_json::from_str::<serde_json::Value>(&body) {
                    return Err(ClientError::InvalidConfigValue {
                        field: format!("{}.body", field),
                        value: attempt.body.clone().unwrap_or_default(),
                        reason: format!("Body must be JSON once {{id}} is substituted: {}", e),
                    });
                }
            }
        }

        Ok(())
    }
}

impl ConfigProvider for ClientConfig {
    fn base_url(&self) -> &str {
        &self.backend.base_url
    }

    fn timeout_seconds(&self) -> Option<u64> {
        self.backend.timeout_seconds
    }

    fn delete_course_attempts(&self) -> &[DeleteAttempt] {
        &self.delete_course.attempts
    }
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[backend]
base_url = "https://api.example.com"
timeout_seconds = 15
"#;

        let config = ClientConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.base_url(), "https://api.example.com");
        assert_eq!(config.timeout_seconds(), Some(15));
        assert_eq!(config.delete_course_attempts(), default_delete_attempts().as_slice());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_delete_attempts() {
        let toml_content = r#"
[backend]
base_url = "http://localhost:8000"

[[delete_course.attempts]]
label = "by path"
path = "/courses/delete/{id}"

[[delete_course.attempts]]
method = "POST"
path = "/courses/remove"
body = '{"course_id": {id}}'
"#;

        let config = ClientConfig::from_toml_str(toml_content).unwrap();
        let attempts = config.delete_course_attempts();

        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].method, "DELETE");
        assert_eq!(attempts[0].display_label(), "by path");
        assert_eq!(attempts[1].body_for(4).as_deref(), Some(r#"{"course_id": 4}"#));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TCA_TEST_SUBST_URL", "https://test.api.com");

        let toml_content = r#"
[backend]
base_url = "${TCA_TEST_SUBST_URL}"
"#;

        let config = ClientConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.backend.base_url, "https://test.api.com");

        std::env::remove_var("TCA_TEST_SUBST_URL");
    }

    #[test]
    fn test_unset_env_var_is_left_in_place() {
        let toml_content = r#"
[backend]
base_url = "${TCA_TEST_DEFINITELY_UNSET}"
"#;

        let config = ClientConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.backend.base_url, "${TCA_TEST_DEFINITELY_UNSET}");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ClientConfig::new("invalid-url");
        assert!(config.validate().is_err());

        config.backend.base_url = "http://localhost:8000".to_string();
        config.backend.timeout_seconds = Some(0);
        assert!(config.validate().is_err());

        config.backend.timeout_seconds = Some(10);
        config.delete_course.attempts = vec![];
        assert!(config.validate().is_err());

        config.delete_course.attempts = vec![DeleteAttempt::new("GET", "/courses/{id}", None)];
        assert!(config.validate().is_err());

        config.delete_course.attempts =
            vec![DeleteAttempt::new("DELETE", "/courses/delete", Some("{id: {id}}"))];
        assert!(config.validate().is_err());

        config.delete_course.attempts = default_delete_attempts();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[backend]
base_url = "https://api.example.com"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = ClientConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.base_url(), "https://api.example.com");
    }

    #[test]
    fn test_base_url_override_wins() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[backend]\nbase_url = \"https://from-file.example.com\"\n")
            .unwrap();

        let config =
            ClientConfig::load(Some(temp_file.path()), Some("http://localhost:9000")).unwrap();
        assert_eq!(config.base_url(), "http://localhost:9000");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ClientConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ClientError::Io(_)));
    }
}
