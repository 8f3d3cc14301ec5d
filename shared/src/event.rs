use serde::{Deserialize, Serialize};

use crate::capabilities::HttpResult;
use crate::category::Category;
use crate::config::ServiceConfig;
use crate::form::Document;
use crate::protocol::ArtifactHandle;
use crate::submission::SubmissionId;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Event {
    #[default]
    Noop,
    Configure(ServiceConfig),

    OverviewChanged(String),
    CountChanged(i64),
    MetaPromptChanged(String),
    DocumentAttached(Document),
    DocumentCleared,

    CategoryToggled(Category),
    CategoryRemoved(Category),
    CategoryPickerToggled,

    SubmitRequested,
    DownloadRequested { artifact: ArtifactHandle },
    DismissDownloadError,
    ShowQrRequested,
    CloseQrRequested,
    HealthCheckRequested,

    #[serde(skip)]
    GenerateResponse {
        submission: SubmissionId,
        result: Box<HttpResult>,
    },
    #[serde(skip)]
    QrCodeResponse {
        submission: SubmissionId,
        artifact: ArtifactHandle,
        result: Box<HttpResult>,
    },
    #[serde(skip)]
    DownloadResponse {
        artifact: ArtifactHandle,
        result: Box<HttpResult>,
    },
    #[serde(skip)]
    HealthCheckResponse { result: Box<HttpResult> },
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::Configure(_) => "configure",
            Self::OverviewChanged(_) => "overview_changed",
            Self::CountChanged(_) => "count_changed",
            Self::MetaPromptChanged(_) => "meta_prompt_changed",
            Self::DocumentAttached(_) => "document_attached",
            Self::DocumentCleared => "document_cleared",
            Self::CategoryToggled(_) => "category_toggled",
            Self::CategoryRemoved(_) => "category_removed",
            Self::CategoryPickerToggled => "category_picker_toggled",
            Self::SubmitRequested => "submit_requested",
            Self::DownloadRequested { .. } => "download_requested",
            Self::DismissDownloadError => "dismiss_download_error",
            Self::ShowQrRequested => "show_qr_requested",
            Self::CloseQrRequested => "close_qr_requested",
            Self::HealthCheckRequested => "health_check_requested",
            Self::GenerateResponse { .. } => "generate_response",
            Self::QrCodeResponse { .. } => "qr_code_response",
            Self::DownloadResponse { .. } => "download_response",
            Self::HealthCheckResponse { .. } => "health_check_response",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::OverviewChanged(_)
                | Self::CountChanged(_)
                | Self::MetaPromptChanged(_)
                | Self::DocumentAttached(_)
                | Self::DocumentCleared
                | Self::CategoryToggled(_)
                | Self::CategoryRemoved(_)
                | Self::CategoryPickerToggled
                | Self::SubmitRequested
                | Self::DownloadRequested { .. }
                | Self::DismissDownloadError
                | Self::ShowQrRequested
                | Self::CloseQrRequested
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_actions_are_distinguished_from_completions() {
        assert!(Event::SubmitRequested.is_user_initiated());
        assert!(Event::CategoryRemoved(Category::LogicFlaws).is_user_initiated());
        assert!(!Event::Noop.is_user_initiated());
        assert!(!Event::HealthCheckResponse {
            result: Box::new(Ok(crate::capabilities::HttpResponse::ok(Vec::new())))
        }
        .is_user_initiated());
    }

    #[test]
    fn shell_events_round_trip_through_json() {
        let event = Event::CategoryToggled(Category::DenialOfService);
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"CategoryToggled":"Denial of Service (DoS)"}"#);
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
