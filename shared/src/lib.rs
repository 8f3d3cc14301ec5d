//! Platform-independent core of the security testing prompt generator.
//!
//! Shells feed [`Event`]s into [`App`] and execute the effects it requests
//! (HTTP calls, file saves, re-renders); all session state lives in
//! [`Model`] and is read back through [`ViewModel`].

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod app;
pub mod capabilities;
pub mod category;
pub mod config;
pub mod error;
pub mod event;
pub mod form;
pub mod model;
pub mod protocol;
pub mod qr;
pub mod resource;
pub mod selector;
pub mod submission;
pub mod validate;
pub mod view;

use std::time::Duration;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use category::{Category, CategoryParseError};
pub use config::ServiceConfig;
pub use crux_core::{render::Render, App as CruxApp};
pub use error::{AppError, ErrorKind};
pub use event::Event;
pub use form::{Document, DocumentAdvisory, FormState};
pub use model::{Model, ServiceHealth};
pub use protocol::{ArtifactHandle, PromptItem, SeverityLevel};
pub use resource::{ObjectUrl, ResourceRegistry};
pub use submission::{GenerationResult, LoadingStage, SubmissionId, SubmissionState};
pub use validate::{validate, ValidationError};
pub use view::ViewModel;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_PROMPT_COUNT: i64 = 10;
pub const MIN_PROMPT_COUNT: i64 = 1;
pub const MAX_PROMPT_COUNT: i64 = 100;
pub const MAX_DOCUMENT_BYTES: usize = 16 * 1024 * 1024;
pub const MAX_QR_BYTES: usize = 2 * 1024 * 1024;
pub const MAX_QR_DIMENSION: u32 = 4096;
pub const MAX_QR_ALLOC: u64 = 64 * 1024 * 1024;
pub const GENERATE_TIMEOUT: Duration = Duration::from_secs(120);
pub const QR_TIMEOUT: Duration = Duration::from_secs(15);
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(10);
pub const DOWNLOAD_FILE_NAME: &str = "security_testing_prompts.xlsx";
pub const XLSX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
