//! Host collaborators: everything the capture controller writes to.
//!
//! The controller is handed these by dependency injection; nothing here
//! knows about capture state.

mod sinks;
mod submit;

pub use sinks::{
    DataSink, ErrorNotice, ErrorSink, MemoryErrorModel, MemoryModel, MemoryPreview, PreviewSurface,
};
pub use submit::{ButtonState, SubmitButton, SubmitControl};

use std::sync::{Mutex, MutexGuard};

/// Lock helper for the in-memory collaborators: a poisoned lock still holds
/// usable state here.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}
