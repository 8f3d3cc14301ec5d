use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::model::{Model, ServiceHealth};
use crate::protocol::{ArtifactHandle, PromptItem, SeverityLevel};
use crate::submission::{LoadingStage, SubmissionState};

pub const SUBMIT_LABEL: &str = "Generate Prompts";
pub const SUBMIT_LABEL_LOADING: &str = "Generating Prompts...";
pub const CATEGORY_PLACEHOLDER: &str = "Select categories...";
pub const DOWNLOAD_LABEL: &str = "Download Excel File";
pub const SHOW_QR_LABEL: &str = "Generate QR Code for Mobile";
pub const QR_MODAL_TITLE: &str = "Scan QR Code to Download on Mobile";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryOption {
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentView {
    pub file_name: String,
    pub size_bytes: usize,
    pub advisories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormView {
    pub overview: String,
    pub count: i64,
    pub meta_prompt: String,
    pub document: Option<DocumentView>,
    pub selected_categories: Vec<String>,
    pub category_placeholder: Option<String>,
    pub picker_open: bool,
    pub picker_options: Vec<CategoryOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptCardView {
    pub severity: String,
    pub severity_class: String,
    pub category: String,
    pub text: String,
}

impl From<&PromptItem> for PromptCardView {
    fn from(item: &PromptItem) -> Self {
        let severity_class = item.severity_level().map_or_else(
            || format!("severity-{}", item.severity.trim().to_lowercase()),
            |level: SeverityLevel| level.css_class().to_string(),
        );
        Self {
            severity: item.severity.clone(),
            severity_class,
            category: item.category.clone(),
            text: item.text.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultsView {
    pub heading: String,
    pub cards: Vec<PromptCardView>,
    pub artifact: Option<ArtifactHandle>,
    pub download_label: String,
    pub is_downloading: bool,
    pub qr_available: bool,
    pub show_qr_label: String,
    pub using_fallback: bool,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrModalView {
    pub title: String,
    pub object_url: String,
    pub mime_type: String,
    #[serde(with = "serde_bytes")]
    pub image: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthView {
    Checking,
    Online {
        status: String,
        /// The service reported an `OK` status.
        healthy: bool,
        generator_configured: bool,
        api_key_present: bool,
    },
    Offline {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewModel {
    pub form: FormView,
    /// The single inline error line: validation first, then submission failure.
    pub error: Option<String>,
    pub is_loading: bool,
    pub loading_stage: Option<String>,
    pub submit_enabled: bool,
    pub submit_label: String,
    pub results: Option<ResultsView>,
    pub qr_modal: Option<QrModalView>,
    pub download_error: Option<String>,
    pub service_health: Option<HealthView>,
}

#[must_use]
pub fn build(model: &Model) -> ViewModel {
    let is_loading = model.submission.is_loading();
    let error = model
        .validation_error
        .map(|e| e.to_string())
        .or_else(|| model.submission.failure_message().map(str::to_string));

    ViewModel {
        form: form_view(model),
        error,
        is_loading,
        loading_stage: loading_stage(&model.submission).map(str::to_string),
        submit_enabled: !is_loading,
        submit_label: if is_loading {
            SUBMIT_LABEL_LOADING
        } else {
            SUBMIT_LABEL
        }
        .to_string(),
        results: results_view(model),
        qr_modal: qr_modal_view(model),
        download_error: model
            .download_error
            .as_ref()
            .map(|e| e.user_facing_message().to_string()),
        service_health: model.service_health.as_ref().map(health_view),
    }
}

fn form_view(model: &Model) -> FormView {
    let form = &model.form;
    let selected: Vec<String> = form
        .categories
        .selected()
        .iter()
        .map(|c| c.label().to_string())
        .collect();

    FormView {
        overview: form.overview.clone(),
        count: form.count,
        meta_prompt: form.meta_prompt.clone(),
        document: form.document.as_ref().map(|doc| DocumentView {
            file_name: doc.file_name.clone(),
            size_bytes: doc.bytes.len(),
            advisories: doc.advisories().iter().map(|a| a.message()).collect(),
        }),
        category_placeholder: selected
            .is_empty()
            .then(|| CATEGORY_PLACEHOLDER.to_string()),
        selected_categories: selected,
        picker_open: form.categories.is_open(),
        picker_options: Category::ALL
            .iter()
            .map(|c| CategoryOption {
                label: c.label().to_string(),
                selected: form.categories.contains(*c),
            })
            .collect(),
    }
}

fn loading_stage(submission: &SubmissionState) -> Option<&'static str> {
    match submission {
        SubmissionState::Loading(pending) => Some(match pending.stage {
            LoadingStage::Generating => "generating",
            LoadingStage::FetchingQr { .. } => "fetching_qr",
        }),
        _ => None,
    }
}

fn results_view(model: &Model) -> Option<ResultsView> {
    let result = model.submission.result()?;
    if result.prompt_items.is_empty() {
        return None;
    }

    Some(ResultsView {
        heading: format!("Generated Prompts ({})", result.prompt_items.len()),
        cards: result.prompt_items.iter().map(PromptCardView::from).collect(),
        artifact: result.artifact.clone(),
        download_label: DOWNLOAD_LABEL.to_string(),
        is_downloading: model.downloads_in_flight > 0,
        qr_available: result.qr_image.is_some(),
        show_qr_label: SHOW_QR_LABEL.to_string(),
        using_fallback: result.using_fallback,
        message: result.message.clone(),
    })
}

fn qr_modal_view(model: &Model) -> Option<QrModalView> {
    if !model.qr_modal_open {
        return None;
    }
    let qr = model.submission.qr_image()?;
    let resource = model.resources.get(&qr.handle)?;

    Some(QrModalView {
        title: QR_MODAL_TITLE.to_string(),
        object_url: qr.handle.to_string(),
        mime_type: qr.mime_type.clone(),
        image: resource.bytes.clone(),
        width: qr.width,
        height: qr.height,
    })
}

fn health_view(health: &ServiceHealth) -> HealthView {
    match health {
        ServiceHealth::Checking => HealthView::Checking,
        ServiceHealth::Reachable(body) => HealthView::Online {
            status: body.status.clone(),
            healthy: body.is_ok(),
            generator_configured: body.cerebras_configured && body.cerebras_sdk_available,
            api_key_present: body.api_key_present,
        },
        ServiceHealth::Unreachable { reason } => HealthView::Offline {
            reason: reason.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::submission::{GenerationResult, PendingSubmission, SubmissionId};
    use crate::validate::ValidationError;

    fn succeeded(items: Vec<PromptItem>) -> SubmissionState {
        SubmissionState::Succeeded(GenerationResult {
            prompt_items: items,
            artifact: Some(ArtifactHandle::new("a.xlsx")),
            qr_image: None,
            using_fallback: true,
            message: Some("Prompts generated successfully".into()),
        })
    }

    #[test]
    fn fresh_session_view() {
        let view = build(&Model::default());
        assert_eq!(view.submit_label, "Generate Prompts");
        assert!(view.submit_enabled);
        assert_eq!(view.form.count, 10);
        assert_eq!(view.form.picker_options.len(), 19);
        assert!(view.form.picker_options.iter().all(|o| !o.selected));
        assert_eq!(
            view.form.category_placeholder.as_deref(),
            Some("Select categories...")
        );
        assert!(view.results.is_none());
        assert!(view.error.is_none());
    }

    #[test]
    fn loading_disables_submit() {
        let model = Model {
            submission: SubmissionState::Loading(PendingSubmission {
                id: SubmissionId(1),
                stage: LoadingStage::Generating,
            }),
            ..Model::default()
        };
        let view = build(&model);
        assert!(view.is_loading);
        assert!(!view.submit_enabled);
        assert_eq!(view.submit_label, "Generating Prompts...");
        assert_eq!(view.loading_stage.as_deref(), Some("generating"));
    }

    #[test]
    fn validation_error_wins_over_failure() {
        let model = Model {
            validation_error: Some(ValidationError::MissingOverview),
            submission: SubmissionState::Failed(AppError::generation("bad input")),
            ..Model::default()
        };
        assert_eq!(
            build(&model).error.as_deref(),
            Some("Application overview is required")
        );

        let model = Model {
            submission: SubmissionState::Failed(AppError::generation("bad input")),
            ..Model::default()
        };
        let view = build(&model);
        assert_eq!(view.error.as_deref(), Some("bad input"));
        assert!(view.results.is_none());
    }

    #[test]
    fn results_render_cards_with_severity_classes() {
        let model = Model {
            submission: succeeded(vec![
                PromptItem::new("HIGH", "Prompt Injection", "a"),
                PromptItem::new("Low", "Toxicity Generation", "b"),
                PromptItem::new("Critical", "Data Leakage", "c"),
            ]),
            ..Model::default()
        };
        let results = build(&model).results.unwrap();
        assert_eq!(results.heading, "Generated Prompts (3)");
        assert_eq!(results.cards[0].severity_class, "severity-high");
        assert_eq!(results.cards[1].severity_class, "severity-low");
        assert_eq!(results.cards[1].category, "Toxicity Generation");
        assert_eq!(results.cards[2].severity_class, "severity-critical");
        assert!(!results.qr_available);
        assert!(results.using_fallback);
    }

    #[test]
    fn empty_result_hides_results_section() {
        let model = Model {
            submission: succeeded(Vec::new()),
            ..Model::default()
        };
        assert!(build(&model).results.is_none());
    }

    #[test]
    fn modal_needs_open_flag_and_qr() {
        let model = Model {
            qr_modal_open: true,
            submission: succeeded(vec![PromptItem::new("High", "x", "y")]),
            ..Model::default()
        };
        assert!(build(&model).qr_modal.is_none());
    }

    #[test]
    fn selected_categories_keep_click_order() {
        let mut model = Model::default();
        model.form.categories.toggle(Category::LogicFlaws);
        model.form.categories.toggle(Category::PromptInjection);
        let view = build(&model);
        assert_eq!(
            view.form.selected_categories,
            vec!["Logic Flaws", "Prompt Injection"]
        );
        assert!(view.form.category_placeholder.is_none());
        assert_eq!(
            view.form
                .picker_options
                .iter()
                .filter(|o| o.selected)
                .count(),
            2
        );
    }
}
