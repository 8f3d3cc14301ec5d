use tracing::{debug, info, warn};

use crate::capabilities::{Capabilities, HttpError, HttpRequest, HttpResult, SaveOperation};
use crate::error::{
    AppError, ErrorKind, DOWNLOAD_ERROR_MESSAGE, DOWNLOAD_FAILED_MESSAGE,
    GENERATION_FAILED_MESSAGE,
};
use crate::event::Event;
use crate::model::{Model, ServiceHealth};
use crate::protocol::{ArtifactHandle, ErrorBody, GenerateResponseBody, HealthBody};
use crate::qr::decode_qr_image;
use crate::submission::{
    GenerationResult, LoadingStage, PendingSubmission, QrImage, SubmissionId, SubmissionState,
};
use crate::validate::validate;
use crate::view::{self, ViewModel};
use crate::{DOWNLOAD_FILE_NAME, XLSX_MIME_TYPE};

#[derive(Default)]
pub struct App;

impl App {
    fn submit(model: &mut Model, caps: &Capabilities) {
        if model.submission.is_loading() {
            debug!("submit ignored while a submission is in flight");
            return;
        }

        if let Err(e) = validate(&model.form) {
            info!(reason = ?e, "submission blocked by validation");
            model.validation_error = Some(e);
            caps.render.render();
            return;
        }

        let id = model.begin_submission();
        info!(
            submission = %id,
            count = model.form.count,
            categories = model.form.categories.len(),
            has_document = model.form.document.is_some(),
            "submission started"
        );

        if let Err(e) = Self::send_generate(model, id, caps) {
            warn!(submission = %id, error = %e, "generate request could not be built");
            model.replace_submission(SubmissionState::Failed(
                AppError::network().with_internal(e.to_string()),
            ));
        }

        caps.render.render();
    }

    fn send_generate(
        model: &Model,
        id: SubmissionId,
        caps: &Capabilities,
    ) -> Result<(), HttpError> {
        let request = HttpRequest::post(model.config.generate_url()?)
            .with_timeout(model.config.generate_timeout())?
            .with_multipart(model.form.to_multipart())?;

        debug!(submission = %id, request_id = request.request_id(), "sending generate request");
        caps.http.send(request, move |result| Event::GenerateResponse {
            submission: id,
            result: Box::new(result),
        });
        Ok(())
    }

    fn send_qr(
        model: &Model,
        id: SubmissionId,
        artifact: &ArtifactHandle,
        caps: &Capabilities,
    ) -> Result<(), HttpError> {
        let request = HttpRequest::get(model.config.qr_url(artifact)?)
            .with_timeout(model.config.qr_timeout())?;

        debug!(submission = %id, artifact = %artifact, "fetching QR image");
        let artifact = artifact.clone();
        caps.http.send(request, move |result| Event::QrCodeResponse {
            submission: id,
            artifact,
            result: Box::new(result),
        });
        Ok(())
    }

    fn handle_generate_response(
        model: &mut Model,
        id: SubmissionId,
        result: HttpResult,
        caps: &Capabilities,
    ) {
        if !model.is_current(id) {
            debug!(submission = %id, "dropping stale generate response");
            return;
        }

        let generated = match result {
            Ok(response) if response.is_success() => {
                match response.json_body::<GenerateResponseBody>() {
                    Ok(body) => GenerationResult::from_body(body),
                    Err(e) => {
                        warn!(submission = %id, error = %e, "generate response body unreadable");
                        model.replace_submission(SubmissionState::Failed(
                            AppError::network().with_internal(e.to_string()),
                        ));
                        caps.render.render();
                        return;
                    }
                }
            }
            Ok(response) => {
                let status = response.status();
                let error = match response.json_body::<ErrorBody>() {
                    Ok(body) => AppError::generation(
                        body.into_message()
                            .unwrap_or_else(|| GENERATION_FAILED_MESSAGE.to_string()),
                    ),
                    Err(e) => AppError::network().with_internal(e.to_string()),
                };
                warn!(submission = %id, status, "generation rejected by service");
                model.replace_submission(SubmissionState::Failed(
                    error.with_internal(format!("HTTP {status}")),
                ));
                caps.render.render();
                return;
            }
            Err(e) => {
                warn!(submission = %id, error = %e, "generate request failed");
                model.replace_submission(SubmissionState::Failed(
                    AppError::network().with_internal(e.to_string()),
                ));
                caps.render.render();
                return;
            }
        };

        info!(
            submission = %id,
            prompts = generated.prompt_items.len(),
            has_artifact = generated.artifact.is_some(),
            using_fallback = generated.using_fallback,
            "prompts generated"
        );

        match generated.artifact.clone() {
            Some(artifact) => {
                model.submission = SubmissionState::Loading(PendingSubmission {
                    id,
                    stage: LoadingStage::FetchingQr { generated },
                });
                if let Err(e) = Self::send_qr(model, id, &artifact, caps) {
                    warn!(submission = %id, error = %e, "QR request could not be built");
                    Self::finish_without_qr(model);
                }
            }
            None => {
                model.replace_submission(SubmissionState::Succeeded(generated));
            }
        }

        caps.render.render();
    }

    /// Completes a `FetchingQr` submission with whatever was generated.
    fn finish_without_qr(model: &mut Model) {
        if let SubmissionState::Loading(PendingSubmission {
            stage: LoadingStage::FetchingQr { generated },
            ..
        }) = std::mem::take(&mut model.submission)
        {
            model.replace_submission(SubmissionState::Succeeded(generated));
        }
    }

    fn handle_qr_response(
        model: &mut Model,
        id: SubmissionId,
        artifact: &ArtifactHandle,
        result: HttpResult,
        caps: &Capabilities,
    ) {
        if !model.is_current(id) {
            debug!(submission = %id, "dropping stale QR response");
            return;
        }

        let mut generated = match std::mem::take(&mut model.submission) {
            SubmissionState::Loading(PendingSubmission {
                stage: LoadingStage::FetchingQr { generated },
                ..
            }) if generated.artifact.as_ref() == Some(artifact) => generated,
            other => {
                debug!(submission = %id, state = other.name(), "QR response without a matching fetch");
                model.submission = other;
                return;
            }
        };

        match result {
            Ok(response) if response.is_success() => {
                match decode_qr_image(response.body()) {
                    Ok(decoded) => {
                        let mime_type = decoded.mime_type.to_string();
                        if let Some(declared) =
                            response.mime_type().filter(|declared| *declared != mime_type)
                        {
                            debug!(submission = %id, %declared, sniffed = %mime_type, "QR content type disagrees with payload");
                        }
                        let handle = model
                            .resources
                            .acquire(response.into_body(), mime_type.clone());
                        let qr = QrImage {
                            handle,
                            mime_type,
                            width: decoded.width,
                            height: decoded.height,
                        };
                        if let Err(orphan) = generated.attach_qr(qr) {
                            model.resources.release(&orphan.handle);
                        } else {
                            info!(submission = %id, width = decoded.width, height = decoded.height, "QR image attached");
                        }
                    }
                    Err(e) => {
                        warn!(submission = %id, error = %e, "QR payload is not a usable image");
                    }
                }
            }
            Ok(response) => {
                warn!(submission = %id, status = response.status(), "QR fetch rejected; continuing without QR");
            }
            Err(e) => {
                warn!(submission = %id, error = %e, "QR fetch failed; continuing without QR");
            }
        }

        model.replace_submission(SubmissionState::Succeeded(generated));
        caps.render.render();
    }

    fn request_download(model: &mut Model, artifact: ArtifactHandle, caps: &Capabilities) {
        let request = model.config.download_url(&artifact).and_then(|url| {
            HttpRequest::get(url).with_timeout(model.config.download_timeout())
        });

        match request {
            Ok(request) => {
                model.downloads_in_flight += 1;
                info!(artifact = %artifact, "download started");
                caps.http.send(request, move |result| Event::DownloadResponse {
                    artifact,
                    result: Box::new(result),
                });
            }
            Err(e) => {
                warn!(artifact = %artifact, error = %e, "download request could not be built");
                model.set_download_error(
                    AppError::new(ErrorKind::Download, DOWNLOAD_ERROR_MESSAGE)
                        .with_internal(e.to_string()),
                );
            }
        }
        caps.render.render();
    }

    fn handle_download_response(
        model: &mut Model,
        artifact: &ArtifactHandle,
        result: HttpResult,
        caps: &Capabilities,
    ) {
        model.downloads_in_flight = model.downloads_in_flight.saturating_sub(1);

        match result {
            Ok(response) if response.is_success() => {
                let mime_type = response
                    .mime_type()
                    .unwrap_or_else(|| XLSX_MIME_TYPE.to_string());
                let bytes = response.into_body();
                let size = bytes.len();
                let source = model.resources.acquire(bytes.clone(), mime_type.clone());
                caps.save.save(SaveOperation {
                    file_name: DOWNLOAD_FILE_NAME.to_string(),
                    mime_type,
                    source: source.clone(),
                    bytes,
                });
                model.resources.release(&source);
                model.clear_download_error();
                info!(artifact = %artifact, size, "download handed to shell");
            }
            Ok(response) => {
                let status = response.status();
                warn!(artifact = %artifact, status, "download rejected by service");
                model.set_download_error(
                    AppError::new(ErrorKind::Download, DOWNLOAD_FAILED_MESSAGE)
                        .with_internal(format!("HTTP {status}")),
                );
            }
            Err(e) => {
                warn!(artifact = %artifact, error = %e, "download failed");
                model.set_download_error(
                    AppError::new(ErrorKind::Download, DOWNLOAD_ERROR_MESSAGE)
                        .with_internal(e.to_string()),
                );
            }
        }
        caps.render.render();
    }

    fn request_health(model: &mut Model, caps: &Capabilities) {
        let request = model
            .config
            .health_url()
            .and_then(|url| HttpRequest::get(url).with_timeout(model.config.health_timeout()));

        match request {
            Ok(request) => {
                model.service_health = Some(ServiceHealth::Checking);
                caps.http.send(request, |result| Event::HealthCheckResponse {
                    result: Box::new(result),
                });
            }
            Err(e) => {
                model.service_health = Some(ServiceHealth::Unreachable {
                    reason: e.to_string(),
                });
            }
        }
        caps.render.render();
    }

    fn handle_health_response(model: &mut Model, result: HttpResult, caps: &Capabilities) {
        let health = match result {
            Ok(response) if response.is_success() => match response.json_body::<HealthBody>() {
                Ok(body) => ServiceHealth::Reachable(body),
                Err(e) => ServiceHealth::Unreachable {
                    reason: format!("unreadable health response: {e}"),
                },
            },
            Ok(response) => ServiceHealth::Unreachable {
                reason: format!("HTTP {}", response.status()),
            },
            Err(e) => ServiceHealth::Unreachable {
                reason: e.to_string(),
            },
        };
        info!(reachable = matches!(health, ServiceHealth::Reachable(_)), "service health updated");
        model.service_health = Some(health);
        caps.render.render();
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        let event_name = event.name();
        if event.is_user_initiated() {
            debug!(event = event_name, "user action");
        } else {
            debug!(event = event_name, "event");
        }

        match event {
            Event::Noop => {}

            Event::Configure(config) => match config.validate() {
                Ok(()) => {
                    info!(base_url = %config.base_url, "service configured");
                    model.config = config;
                    caps.render.render();
                }
                Err(e) => {
                    warn!(error = %e, "rejected service configuration");
                }
            },

            Event::OverviewChanged(text) => {
                model.form.overview = text;
                caps.render.render();
            }

            Event::CountChanged(count) => {
                model.form.count = count;
                caps.render.render();
            }

            Event::MetaPromptChanged(text) => {
                model.form.meta_prompt = text;
                caps.render.render();
            }

            Event::DocumentAttached(document) => {
                let advisories = document.advisories();
                if !advisories.is_empty() {
                    warn!(?advisories, "attached document outside upload guidance");
                }
                debug!(size = document.bytes.len(), "document attached");
                model.form.document = Some(document);
                caps.render.render();
            }

            Event::DocumentCleared => {
                model.form.document = None;
                caps.render.render();
            }

            Event::CategoryToggled(category) => {
                let selected = model.form.categories.toggle(category);
                debug!(%category, selected, "category toggled");
                caps.render.render();
            }

            Event::CategoryRemoved(category) => {
                if model.form.categories.remove(category) {
                    debug!(%category, "category removed");
                    caps.render.render();
                }
            }

            Event::CategoryPickerToggled => {
                model.form.categories.toggle_open();
                caps.render.render();
            }

            Event::SubmitRequested => Self::submit(model, caps),

            Event::GenerateResponse { submission, result } => {
                Self::handle_generate_response(model, submission, *result, caps);
            }

            Event::QrCodeResponse {
                submission,
                artifact,
                result,
            } => {
                Self::handle_qr_response(model, submission, &artifact, *result, caps);
            }

            Event::DownloadRequested { artifact } => Self::request_download(model, artifact, caps),

            Event::DownloadResponse { artifact, result } => {
                Self::handle_download_response(model, &artifact, *result, caps);
            }

            Event::DismissDownloadError => {
                model.clear_download_error();
                caps.render.render();
            }

            Event::ShowQrRequested => {
                if model.submission.qr_image().is_some() {
                    model.qr_modal_open = true;
                    caps.render.render();
                } else {
                    debug!("show QR ignored without a QR image");
                }
            }

            Event::CloseQrRequested => {
                if model.qr_modal_open {
                    model.qr_modal_open = false;
                    caps.render.render();
                }
            }

            Event::HealthCheckRequested => Self::request_health(model, caps),

            Event::HealthCheckResponse { result } => {
                Self::handle_health_response(model, *result, caps);
            }
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        view::build(model)
    }
}
