//! The image capture state machine.
//!
//! ```text
//!   Empty ──accepted──▶ Decoding ──ok──▶ Valid
//!     ▲                    │
//!     │ cleared            └──err──▶ Invalid ◀──rejected── (any)
//!   (any)
//! ```
//!
//! Validation is synchronous. Decoding runs as a spawned tokio task; its
//! result comes back as a [`DecodeCompletion`] tagged with the request id
//! it was started under. Every selection event bumps the id, so a late
//! completion from a superseded decode is recognised and dropped.

use super::decode::{decode_file, DecodeError};
use super::selection::SelectedFile;
use super::validate::is_accepted_type;
use super::{CaptureEvent, EncodedImage, ValidationState};
use crate::config::CaptureConfig;
use crate::host::{DataSink, ErrorNotice, ErrorSink, PreviewSurface, SubmitControl};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

pub const ERROR_TITLE: &str = "Image Upload Error";
/// Shown for every user-visible failure. The wording names the default
/// allow-list; a config that widens `accepted_types` keeps this text.
pub const ERROR_MESSAGE: &str = "Please verify that you have uploaded a valid image (PNG and JPEG).";

const EVENT_CAPACITY: usize = 16;

/// Result of one decode, delivered back to the controller.
#[derive(Debug)]
pub struct DecodeCompletion {
    pub request_id: u64,
    pub result: Result<EncodedImage, DecodeError>,
}

/// Why a selection ended in [`ValidationState::Invalid`].
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Unsupported file type: {0:?}")]
    UnsupportedType(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

pub struct ImageCaptureController {
    config: CaptureConfig,
    state: ValidationState,
    data_sink: Box<dyn DataSink>,
    preview: Box<dyn PreviewSurface>,
    error_sink: Option<Box<dyn ErrorSink>>,
    submit: Option<Box<dyn SubmitControl>>,
    events: broadcast::Sender<CaptureEvent>,
    /// Bumped on every selection event.
    generation: u64,
    /// Request id of the decode whose result is still wanted.
    pending: Option<u64>,
    task: Option<JoinHandle<DecodeCompletion>>,
    last_error: Option<CaptureError>,
}

impl ImageCaptureController {
    /// Creates the controller and renders its initial state: no preview,
    /// empty data slot, state [`ValidationState::Empty`].
    pub fn new(
        config: CaptureConfig,
        data_sink: impl DataSink + 'static,
        preview: impl PreviewSurface + 'static,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let mut controller = Self {
            config,
            state: ValidationState::Empty,
            data_sink: Box::new(data_sink),
            preview: Box::new(preview),
            error_sink: None,
            submit: None,
            events,
            generation: 0,
            pending: None,
            task: None,
            last_error: None,
        };
        controller.clear_outputs();
        controller
    }

    pub fn with_error_sink(mut self, sink: impl ErrorSink + 'static) -> Self {
        self.error_sink = Some(Box::new(sink));
        self
    }

    /// Attaches the submit control and disables it to match the current state.
    pub fn with_submit_control(mut self, control: impl SubmitControl + 'static) -> Self {
        let mut control: Box<dyn SubmitControl> = Box::new(control);
        control.set_enabled(self.state == ValidationState::Valid);
        self.submit = Some(control);
        self
    }

    pub fn state(&self) -> ValidationState {
        self.state
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Request id of the decode in flight, if any.
    pub fn current_request(&self) -> Option<u64> {
        self.pending
    }

    /// Cause of the current Invalid state. Never shown to the user as-is.
    pub fn last_error(&self) -> Option<&CaptureError> {
        self.last_error.as_ref()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CaptureEvent> {
        self.events.subscribe()
    }

    /// Handles a file chooser change. `None` means the selection was cleared.
    ///
    /// Returns the request id when a decode was started. Must be called from
    /// within a tokio runtime for the decode to run; without one the
    /// selection fails like any other decode error.
    pub fn on_file_selected(&mut self, file: Option<SelectedFile>) -> Option<u64> {
        self.generation += 1;
        self.abort_in_flight();

        let mut file = match file {
            Some(file) => file,
            None => {
                log::info!("[CAPTURE] Selection cleared");
                self.publish_failure(None);
                return None;
            }
        };

        // One canonical spelling for the allow-list, the sniff and the data URI.
        file.mime_type = file.mime_type.trim().to_ascii_lowercase();

        if !is_accepted_type(&file.mime_type, &self.config.accepted_types) {
            log::warn!(
                "[CAPTURE] Rejected {}: type {:?} not accepted",
                file.name,
                file.mime_type
            );
            self.publish_failure(Some(CaptureError::UnsupportedType(file.mime_type)));
            return None;
        }

        let request_id = self.generation;
        self.set_state(ValidationState::Decoding);
        self.clear_outputs();

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                let error = DecodeError::TaskFailed(e.to_string());
                self.publish_failure(Some(error.into()));
                return None;
            }
        };

        log::info!("[CAPTURE] Decoding {} (request {})", file.name, request_id);
        let verify = self.config.verify_content;
        let handle = runtime.spawn(async move {
            DecodeCompletion {
                request_id,
                result: decode_file(file, verify).await,
            }
        });
        self.pending = Some(request_id);
        self.task = Some(handle);

        Some(request_id)
    }

    /// Waits for the decode in flight. Returns `None` when nothing is pending.
    ///
    /// Cancel-safe: dropping the future before it resolves leaves the task
    /// in place, so a later call (or `settle`) still receives its result.
    pub async fn next_completion(&mut self) -> Option<DecodeCompletion> {
        let request_id = self.pending?;
        let joined = self.task.as_mut()?.await;
        // A finished JoinHandle must not be polled again.
        self.task = None;
        let completion = match joined {
            Ok(completion) => completion,
            Err(e) => DecodeCompletion {
                request_id,
                result: Err(DecodeError::TaskFailed(e.to_string())),
            },
        };
        Some(completion)
    }

    /// Applies a decode result. Completions whose request id is not the
    /// current one are ignored; returns whether it was applied.
    pub fn handle_completion(&mut self, completion: DecodeCompletion) -> bool {
        if self.current_request() != Some(completion.request_id) {
            log::debug!(
                "[CAPTURE] Ignoring stale completion for request {} (current {})",
                completion.request_id,
                self.generation
            );
            return false;
        }
        self.pending = None;
        self.task = None;

        match completion.result {
            Ok(image) => self.publish_image(image),
            Err(e) => {
                log::warn!("[CAPTURE] Decode failed: {}", e);
                self.publish_failure(Some(e.into()));
            }
        }
        true
    }

    /// Drives the controller until no decode is in flight.
    pub async fn settle(&mut self) -> ValidationState {
        while let Some(completion) = self.next_completion().await {
            self.handle_completion(completion);
        }
        self.state
    }

    fn publish_image(&mut self, image: EncodedImage) {
        self.data_sink.set(&self.config.slot_name, &image);
        self.preview.set_source(image.as_str());
        self.set_submit_enabled(true);
        if let Some(sink) = self.error_sink.as_mut() {
            sink.set(ErrorNotice::hidden());
        }
        self.set_state(ValidationState::Valid);
        self.last_error = None;
        // No receivers is fine.
        let _ = self.events.send(CaptureEvent::ImageCaptured);
    }

    /// Shared failure path. `None` is a silent clear (state Empty); an error
    /// shows the generic notice (state Invalid).
    fn publish_failure(&mut self, error: Option<CaptureError>) {
        self.clear_outputs();
        let shown = error.is_some();
        if let Some(sink) = self.error_sink.as_mut() {
            let notice = if shown {
                ErrorNotice::visible(ERROR_TITLE, ERROR_MESSAGE)
            } else {
                ErrorNotice::hidden()
            };
            sink.set(notice);
        }
        self.set_state(if shown {
            ValidationState::Invalid
        } else {
            ValidationState::Empty
        });
        self.last_error = error;
    }

    /// Empties the preview and the data slot, and disables submit.
    fn clear_outputs(&mut self) {
        self.preview.set_source("");
        self.data_sink.set(&self.config.slot_name, &EncodedImage::empty());
        self.set_submit_enabled(false);
    }

    fn set_submit_enabled(&mut self, enabled: bool) {
        if let Some(submit) = self.submit.as_mut() {
            submit.set_enabled(enabled);
        }
    }

    fn set_state(&mut self, next: ValidationState) {
        if self.state != next {
            log::info!("[CAPTURE] {:?} -> {:?}", self.state, next);
        }
        self.state = next;
    }

    fn abort_in_flight(&mut self) {
        if let Some(id) = self.pending.take() {
            log::debug!("[CAPTURE] Superseding decode request {}", id);
        }
        if let Some(handle) = self.task.take() {
            handle.abort();
        }
    }
}

impl Drop for ImageCaptureController {
    fn drop(&mut self) {
        self.abort_in_flight();
    }
}
