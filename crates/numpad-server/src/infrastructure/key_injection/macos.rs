//! macOS key injection through CoreGraphics.
//!
//! Each event is created from an event source in the HID system state and
//! posted at the HID tap, the same level as physical keyboard input.
//!
//! # Accessibility permission
//!
//! Posting at `kCGHIDEventTap` requires the **Accessibility** permission
//! (System Settings → Privacy & Security → Accessibility).  Without it the
//! events are silently discarded by the OS.

use core_graphics::event::{CGEvent, CGEventTapLocation};
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use numpad_core::{KeyMapper, NumpadKey};

use crate::application::press_key::{InjectionError, PlatformKeyInjector};

/// macOS implementation of [`PlatformKeyInjector`].
#[derive(Debug, Default)]
pub struct MacosKeyInjector;

impl MacosKeyInjector {
    pub fn new() -> Self {
        Self
    }
}

impl PlatformKeyInjector for MacosKeyInjector {
    fn key_down(&self, key: NumpadKey) -> Result<(), InjectionError> {
        post_key(key, true)
    }

    fn key_up(&self, key: NumpadKey) -> Result<(), InjectionError> {
        post_key(key, false)
    }
}

fn post_key(key: NumpadKey, key_down: bool) -> Result<(), InjectionError> {
    let source = CGEventSource::new(CGEventSourceStateID::HIDSystemState)
        .map_err(|_| InjectionError::Platform("failed to create CGEventSource".to_string()))?;
    let event = CGEvent::new_keyboard_event(source, KeyMapper::to_macos_cgkeycode(key), key_down)
        .map_err(|_| InjectionError::Platform("failed to create keyboard event".to_string()))?;
    event.post(CGEventTapLocation::HID);
    Ok(())
}
