//! Submit control: enabled exactly when a valid image is held.

use super::lock;
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// Something that can be enabled or disabled by the controller.
pub trait SubmitControl {
    fn set_enabled(&mut self, enabled: bool);
}

/// Observable state of a submit button.
///
/// The three fields mirror the three ways a button shows it is disabled: the
/// `is-disabled` styling class, the native `disabled` property and the
/// `aria-disabled` attribute. They only change together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonState {
    pub is_disabled_class: bool,
    pub disabled: bool,
    pub aria_disabled: String,
}

impl ButtonState {
    fn for_enabled(enabled: bool) -> Self {
        Self {
            is_disabled_class: !enabled,
            disabled: !enabled,
            aria_disabled: (!enabled).to_string(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }

    /// `true` when all three representations agree.
    pub fn is_consistent(&self) -> bool {
        self.is_disabled_class == self.disabled && self.aria_disabled == self.disabled.to_string()
    }
}

impl Default for ButtonState {
    /// Buttons start enabled, as in plain markup.
    fn default() -> Self {
        Self::for_enabled(true)
    }
}

/// Clonable handle to a shared [`ButtonState`].
#[derive(Debug, Clone, Default)]
pub struct SubmitButton {
    state: Arc<Mutex<ButtonState>>,
}

impl SubmitButton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ButtonState {
        lock(&self.state).clone()
    }

    pub fn is_enabled(&self) -> bool {
        self.state().is_enabled()
    }
}

impl SubmitControl for SubmitButton {
    fn set_enabled(&mut self, enabled: bool) {
        *lock(&self.state) = ButtonState::for_enabled(enabled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_keeps_all_three_forms_in_sync() {
        let mut button = SubmitButton::new();

        button.set_enabled(false);
        let s = button.state();
        assert!(s.is_disabled_class && s.disabled);
        assert_eq!(s.aria_disabled, "true");
        assert!(s.is_consistent());

        button.set_enabled(true);
        let s = button.state();
        assert!(!s.is_disabled_class && !s.disabled);
        assert_eq!(s.aria_disabled, "false");
        assert!(s.is_consistent());
    }

    #[test]
    fn starts_enabled() {
        assert!(SubmitButton::new().is_enabled());
    }

    #[test]
    fn poisoned_lock_still_toggles() {
        let button = SubmitButton::new();
        let shared = button.state.clone();
        let _ = std::thread::spawn(move || {
            let _guard = shared.lock().unwrap();
            panic!("poison the button state");
        })
        .join();
        assert!(button.state.is_poisoned());

        let mut handle = button.clone();
        handle.set_enabled(false);
        assert!(!button.is_enabled());
        assert!(button.state().is_consistent());
    }
}
