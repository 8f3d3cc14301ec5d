use serde::{Deserialize, Serialize};

use crate::config::ServiceConfig;
use crate::error::AppError;
use crate::form::FormState;
use crate::protocol::HealthBody;
use crate::resource::ResourceRegistry;
use crate::submission::{LoadingStage, PendingSubmission, SubmissionId, SubmissionState};
use crate::validate::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceHealth {
    Checking,
    Reachable(HealthBody),
    Unreachable { reason: String },
}

/// The single owner of all session state. Only `App::update` mutates it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub config: ServiceConfig,
    pub form: FormState,
    pub validation_error: Option<ValidationError>,
    pub submission: SubmissionState,
    pub last_submission: SubmissionId,
    pub qr_modal_open: bool,
    pub download_error: Option<AppError>,
    pub downloads_in_flight: usize,
    pub resources: ResourceRegistry,
    pub service_health: Option<ServiceHealth>,
}

impl Model {
    /// Moves to `Loading(Generating)` under a fresh id. Whatever result was
    /// showing is discarded and its QR resource released.
    pub fn begin_submission(&mut self) -> SubmissionId {
        let id = self.last_submission.next();
        self.last_submission = id;
        self.validation_error = None;
        self.download_error = None;
        self.qr_modal_open = false;
        self.replace_submission(SubmissionState::Loading(PendingSubmission {
            id,
            stage: LoadingStage::Generating,
        }));
        id
    }

    /// Overwrites the submission wholesale, releasing the QR resource held by
    /// the outgoing state when the incoming one does not keep it.
    pub fn replace_submission(&mut self, next: SubmissionState) {
        let outgoing = std::mem::replace(&mut self.submission, next);
        if let Some(qr) = outgoing.qr_image() {
            let kept = self
                .submission
                .qr_image()
                .is_some_and(|current| current.handle == qr.handle);
            if !kept {
                self.resources.release(&qr.handle);
            }
        }
        if self.submission.qr_image().is_none() {
            self.qr_modal_open = false;
        }
    }

    #[must_use]
    pub fn is_current(&self, id: SubmissionId) -> bool {
        self.submission.pending_id() == Some(id)
    }

    pub fn set_download_error(&mut self, error: AppError) {
        self.download_error = Some(error);
    }

    pub fn clear_download_error(&mut self) {
        self.download_error = None;
    }
}
