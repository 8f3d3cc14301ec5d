mod http;
mod save;

pub use self::http::{
    FormPart, Http, HttpError, HttpHeaders, HttpMethod, HttpOperation, HttpOutput, HttpRequest,
    HttpResponse, HttpResult, MultipartForm, RequestBody, ValidatedUrl, DEFAULT_TIMEOUT_MS,
    MAX_TIMEOUT_MS,
};
pub use self::save::{Save, SaveOperation};

/// Render capability re-export.
pub use crux_core::render::Render;

use crate::event::Event;

#[derive(crux_core::macros::Effect)]
#[effect(app = "crate::App")]
pub struct Capabilities {
    pub http: Http<Event>,
    pub save: Save<Event>,
    pub render: Render<Event>,
}
