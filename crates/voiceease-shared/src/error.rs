//! Error types for VoiceEase.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoiceEaseError {
    /// A required field is missing or malformed. `field` names the first
    /// failing field when there is one.
    #[error("{message}")]
    Validation {
        field: Option<String>,
        message: String,
    },

    #[error("{0} not found")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden - Admin access required")]
    Forbidden,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl VoiceEaseError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        VoiceEaseError::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Validation failure that is not tied to a single field (bad JSON, duplicate user).
    pub fn invalid(message: impl Into<String>) -> Self {
        VoiceEaseError::Validation {
            field: None,
            message: message.into(),
        }
    }

    /// HTTP status the error maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            VoiceEaseError::Validation { .. } => 400,
            VoiceEaseError::Unauthorized => 401,
            VoiceEaseError::Forbidden => 403,
            VoiceEaseError::NotFound(_) => 404,
            VoiceEaseError::Storage(_) => 500,
            VoiceEaseError::Internal(_) => 500,
        }
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            VoiceEaseError::Validation { field, .. } => field.as_deref(),
            _ => None,
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

pub type Result<T> = std::result::Result<T, VoiceEaseError>;
