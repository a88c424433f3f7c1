//! Data, error and preview sinks: the write-only outputs of the controller.
//!
//! The controller never reads these back. The in-memory implementations are
//! cheap clonable handles over shared state, so a host (or a test) can keep
//! one clone and hand another to the controller.

use super::lock;
use crate::capture::EncodedImage;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Stores the encoded image under a named slot. An empty value means "no image".
pub trait DataSink {
    fn set(&mut self, slot: &str, value: &EncodedImage);
}

/// Receives the displayable error notice. Overwrite-only.
pub trait ErrorSink {
    fn set(&mut self, notice: ErrorNotice);
}

/// The preview image element. An empty source clears it.
pub trait PreviewSurface {
    fn set_source(&mut self, data: &str);
}

/// User-facing error state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorNotice {
    #[serde(rename = "errorTitle")]
    pub title: String,
    #[serde(rename = "errorMsg")]
    pub message: String,
    pub shown: bool,
}

impl ErrorNotice {
    pub fn visible(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            shown: true,
        }
    }

    pub fn hidden() -> Self {
        Self::default()
    }
}

/// Key/value model, in the spirit of a view model with named attributes.
#[derive(Debug, Clone, Default)]
pub struct MemoryModel {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of `slot`, or `None` if it was never written.
    pub fn get(&self, slot: &str) -> Option<String> {
        lock(&self.slots).get(slot).cloned()
    }
}

impl DataSink for MemoryModel {
    fn set(&mut self, slot: &str, value: &EncodedImage) {
        lock(&self.slots).insert(slot.to_string(), value.as_str().to_string());
    }
}

/// Holds the last notice written.
#[derive(Debug, Clone, Default)]
pub struct MemoryErrorModel {
    notice: Arc<Mutex<ErrorNotice>>,
}

impl MemoryErrorModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notice(&self) -> ErrorNotice {
        lock(&self.notice).clone()
    }
}

impl ErrorSink for MemoryErrorModel {
    fn set(&mut self, notice: ErrorNotice) {
        *lock(&self.notice) = notice;
    }
}

/// Stands in for an `<img class="preview">` element's `src` attribute.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreview {
    src: Arc<Mutex<String>>,
}

impl MemoryPreview {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn src(&self) -> String {
        lock(&self.src).clone()
    }
}

impl PreviewSurface for MemoryPreview {
    fn set_source(&mut self, data: &str) {
        *lock(&self.src) = data.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_clones_share_slots() {
        let model = MemoryModel::new();
        let mut handle = model.clone();
        handle.set("faceImage", &EncodedImage::new("data:image/png;base64,AA==".into()));
        assert_eq!(model.get("faceImage").as_deref(), Some("data:image/png;base64,AA=="));
        assert_eq!(model.get("photoIdImage"), None);
    }

    #[test]
    fn notice_serializes_with_sink_field_names() {
        let notice = ErrorNotice::visible("Title", "Body");
        let json = serde_json::to_value(&notice).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "errorTitle": "Title", "errorMsg": "Body", "shown": true })
        );
    }

    #[test]
    fn hidden_notice_is_blank() {
        let notice = ErrorNotice::hidden();
        assert!(!notice.shown);
        assert!(notice.title.is_empty() && notice.message.is_empty());
    }
}
