//! Executes core HTTP requests with reqwest.

use anyhow::Context;
use promptgen_shared::capabilities::{
    FormPart, HttpError, HttpHeaders, HttpMethod, HttpRequest, HttpResponse, HttpResult,
    MultipartForm,
};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::debug;

#[derive(Clone)]
pub struct Transport {
    client: Client,
}

impl Transport {
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("promptgen/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client })
    }

    pub async fn execute(&self, request: &HttpRequest) -> HttpResult {
        let method = match request.method() {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        };

        let mut builder = self
            .client
            .request(method, request.url().as_str())
            .timeout(request.timeout());
        if let Some(form) = request.multipart() {
            builder = builder.multipart(to_reqwest_form(form)?);
        }

        debug!(
            method = request.method().as_str(),
            url = request.url().as_str(),
            request_id = request.request_id(),
            "executing request"
        );

        let response = builder
            .send()
            .await
            .map_err(|e| map_error(&e, request))?;

        let status = response.status().as_u16();
        let mut headers = HttpHeaders::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                // HttpHeaders refuses transport-managed names; those are skipped.
                headers.insert(name.as_str(), value).ok();
            }
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                map_error(&e, request)
            } else {
                HttpError::InvalidResponse {
                    reason: e.to_string(),
                    request_id: request.request_id().to_string(),
                }
            }
        })?;

        debug!(status, len = body.len(), request_id = request.request_id(), "response received");
        Ok(HttpResponse::new(status, body.to_vec()).with_headers(headers))
    }
}

fn to_reqwest_form(form: &MultipartForm) -> Result<Form, HttpError> {
    let mut out = Form::new();
    for part in form.parts() {
        out = match part {
            FormPart::Text { name, value } => out.text(name.clone(), value.clone()),
            FormPart::File {
                name,
                file_name,
                mime_type,
                bytes,
            } => {
                let part = Part::bytes(bytes.clone())
                    .file_name(file_name.clone())
                    .mime_str(mime_type)
                    .map_err(|e| HttpError::InvalidRequest {
                        reason: format!("invalid MIME type '{mime_type}': {e}"),
                    })?;
                out.part(name.clone(), part)
            }
        };
    }
    Ok(out)
}

fn map_error(error: &reqwest::Error, request: &HttpRequest) -> HttpError {
    if error.is_timeout() {
        HttpError::Timeout {
            timeout_ms: u64::try_from(request.timeout().as_millis()).unwrap_or(u64::MAX),
            request_id: request.request_id().to_string(),
        }
    } else if error.is_connect() {
        HttpError::ConnectionError {
            host: request.url().host().to_string(),
            message: error.to_string(),
        }
    } else {
        HttpError::Network {
            message: error.to_string(),
        }
    }
}
