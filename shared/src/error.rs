use serde::{Deserialize, Serialize};

pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate prompts";
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check if the server is running.";
pub const DOWNLOAD_FAILED_MESSAGE: &str = "Failed to download Excel file";
pub const DOWNLOAD_ERROR_MESSAGE: &str = "Error downloading file";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Generation,
    Download,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Generation => "GENERATION_ERROR",
            Self::Download => "DOWNLOAD_ERROR",
        }
    }
}

/// A failure as the user sees it. `message` is the only text ever shown;
/// `internal_message` goes to logs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    pub internal_message: Option<String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            internal_message: None,
        }
    }

    #[must_use]
    pub fn with_internal(mut self, internal: impl Into<String>) -> Self {
        self.internal_message = Some(internal.into());
        self
    }

    #[must_use]
    pub fn generation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Generation, message)
    }

    #[must_use]
    pub fn network() -> Self {
        Self::new(ErrorKind::Generation, NETWORK_ERROR_MESSAGE)
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub fn user_facing_message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)?;
        if let Some(internal) = &self.internal_message {
            write!(f, " (internal: {internal})")?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}
