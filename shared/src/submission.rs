//! Submission lifecycle: `Idle -> Loading -> {Succeeded, Failed}`, re-entering
//! `Loading` on the next submit.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AppError;
use crate::protocol::{ArtifactHandle, GenerateResponseBody, PromptItem};
use crate::resource::ObjectUrl;

/// Monotonic per-session tag. Responses carry it back so that completions of
/// a superseded submission can be recognised and dropped.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SubmissionId(pub u64);

impl SubmissionId {
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrImage {
    pub handle: ObjectUrl,
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub prompt_items: Vec<PromptItem>,
    pub artifact: Option<ArtifactHandle>,
    pub qr_image: Option<QrImage>,
    pub using_fallback: bool,
    pub message: Option<String>,
}

impl GenerationResult {
    #[must_use]
    pub fn from_body(body: GenerateResponseBody) -> Self {
        Self {
            prompt_items: body.prompts,
            artifact: body.excel_file,
            qr_image: None,
            using_fallback: body.using_fallback,
            message: body.message,
        }
    }

    /// A QR image only makes sense next to an artifact. Hands the image back
    /// when there is none so the caller can release it.
    pub fn attach_qr(&mut self, qr: QrImage) -> Result<(), QrImage> {
        if self.artifact.is_none() {
            return Err(qr);
        }
        self.qr_image = Some(qr);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadingStage {
    Generating,
    /// Generation succeeded; waiting on the QR image for its artifact.
    FetchingQr { generated: GenerationResult },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSubmission {
    pub id: SubmissionId,
    pub stage: LoadingStage,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionState {
    #[default]
    Idle,
    Loading(PendingSubmission),
    Succeeded(GenerationResult),
    Failed(AppError),
}

impl SubmissionState {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading(_))
    }

    /// Id of the in-flight submission, if any.
    #[must_use]
    pub fn pending_id(&self) -> Option<SubmissionId> {
        match self {
            Self::Loading(pending) => Some(pending.id),
            _ => None,
        }
    }

    #[must_use]
    pub fn result(&self) -> Option<&GenerationResult> {
        match self {
            Self::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    #[must_use]
    pub fn failure(&self) -> Option<&AppError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }

    #[must_use]
    pub fn failure_message(&self) -> Option<&str> {
        self.failure().map(AppError::user_facing_message)
    }

    #[must_use]
    pub fn qr_image(&self) -> Option<&QrImage> {
        self.result().and_then(|r| r.qr_image.as_ref())
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading(PendingSubmission {
                stage: LoadingStage::Generating,
                ..
            }) => "generating",
            Self::Loading(PendingSubmission {
                stage: LoadingStage::FetchingQr { .. },
                ..
            }) => "fetching_qr",
            Self::Succeeded(_) => "succeeded",
            Self::Failed(_) => "failed",
        }
    }
}
