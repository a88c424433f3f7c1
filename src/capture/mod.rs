//! Image capture domain: public API.
//!
//! This module owns the select → validate → decode → publish flow.
//! External code should only use the items exported here.

mod controller;
pub mod decode;
mod selection;
pub mod validate;

pub use controller::{
    CaptureError, DecodeCompletion, ImageCaptureController, ERROR_MESSAGE, ERROR_TITLE,
};
pub use decode::DecodeError;
pub use selection::{guess_mime_type, FileSource, SelectedFile};

use serde::Serialize;

/// A validated image as a `data:` URI, or empty for "no image".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedImage(String);

impl EncodedImage {
    pub fn new(data: String) -> Self {
        Self(data)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Where the controller is in the capture cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationState {
    /// Nothing selected, or the selection was cleared.
    Empty,
    /// An accepted file is being read.
    Decoding,
    /// An image is published; submit is enabled.
    Valid,
    /// The last selection was rejected or failed to decode.
    Invalid,
}

/// Signals broadcast to observers of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureEvent {
    /// Fired once per transition into [`ValidationState::Valid`].
    ImageCaptured,
}
