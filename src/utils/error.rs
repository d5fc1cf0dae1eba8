use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Bad or missing input. No upstream call has been made.
    Validation(String),
    /// Missing or unusable server configuration (e.g. no API key).
    Configuration(String),
    /// The indexing service failed. `status` is the upstream HTTP status when one was received.
    Upstream { status: Option<u16>, message: String },
    /// A single NFT metadata lookup failed. Logged and swallowed by the gateway.
    MetadataFetch(String),
}

impl AppError {
    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        AppError::Upstream {
            status,
            message: message.into(),
        }
    }

    /// Message exposed to API callers
    pub fn message(&self) -> &str {
        match self {
            AppError::Validation(msg)
            | AppError::Configuration(msg)
            | AppError::MetadataFetch(msg) => msg,
            AppError::Upstream { message, .. } => message,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AppError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Upstream { status: Some(code), message } => {
                write!(f, "Upstream error ({}): {}", code, message)
            }
            AppError::Upstream { status: None, message } => write!(f, "Upstream error: {}", message),
            AppError::MetadataFetch(msg) => write!(f, "Metadata fetch error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Configuration(_) | AppError::MetadataFetch(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Upstream { status, .. } => status
                .and_then(|code| StatusCode::from_u16(code).ok())
                .filter(|code| code.is_client_error() || code.is_server_error())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = match self {
            AppError::Upstream { .. } => serde_json::json!({
                "error": self.message(),
                "status": status.as_u16()
            }),
            _ => serde_json::json!({ "error": self.message() }),
        };
        HttpResponse::build(status).json(body)
    }
}
