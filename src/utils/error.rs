use thiserror::Error;

/// 對使用者可見的錯誤類別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Validation,
    NotFound,
    SessionExpired,
    Config,
    Io,
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API responded with HTTP {status}: {body}")]
    Network { status: u16, body: String },

    #[error("Delete failed after {} attempt(s)", .attempts.len())]
    DeleteFailed { attempts: Vec<String> },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("{what} not found")]
    NotFound { what: String },

    #[error("Teacher session expired. Please login again.")]
    SessionExpired,

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfig { field: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV output error: {0}")]
    Csv(#[from] csv::Error),
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(_) | Self::Network { .. } | Self::DeleteFailed { .. } => ErrorKind::Network,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::SessionExpired => ErrorKind::SessionExpired,
            Self::Config { .. }
            | Self::InvalidConfigValue { .. }
            | Self::MissingConfig { .. }
            | Self::Toml(_) => ErrorKind::Config,
            Self::Io(_) | Self::Serialization(_) | Self::Csv(_) => ErrorKind::Io,
        }
    }

    /// 每次嘗試的失敗紀錄（僅 DeleteFailed 有）
    pub fn attempts(&self) -> &[String] {
        match self {
            Self::DeleteFailed { attempts } => attempts,
            _ => &[],
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Http(e) if e.is_timeout() => "The server took too long to respond.".to_string(),
            Self::Http(e) if e.is_decode() => "The server sent a response we could not read.".to_string(),
            Self::Http(_) => "Could not reach the server.".to_string(),
            Self::Network { status: 401, .. } => "Invalid credentials. Please try again.".to_string(),
            Self::Network { status, .. } => format!("The server rejected the request (HTTP {}).", status),
            Self::DeleteFailed { .. } => "Delete failed. See the log for details.".to_string(),
            Self::Validation { message } => message.clone(),
            Self::NotFound { what } => format!("{} not found.", what),
            Self::SessionExpired => self.to_string(),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Network => "Check the backend URL and try again.",
            ErrorKind::Validation => "Correct the input and submit again.",
            ErrorKind::NotFound => "Make sure the record still exists, then reload.",
            ErrorKind::SessionExpired => "Log in again.",
            ErrorKind::Config => "Check the configuration file and TCA_BASE_URL.",
            ErrorKind::Io => "Check file permissions and the output path.",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Validation => 2,
            ErrorKind::Network | ErrorKind::NotFound => 1,
            ErrorKind::SessionExpired => 4,
            ErrorKind::Config | ErrorKind::Io => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
