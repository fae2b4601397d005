//! Windows key injection via the SendInput API.
//!
//! Keypad digits and operators have their own Virtual Key codes
//! (`VK_NUMPAD0`, `VK_ADD`, ...).  Keypad Enter shares `VK_RETURN` with the
//! main Enter key and is told apart by `KEYEVENTF_EXTENDEDKEY`.

use numpad_core::keymap::windows_vk;
use numpad_core::{KeyMapper, NumpadKey};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT, KEYBD_EVENT_FLAGS,
    KEYEVENTF_EXTENDEDKEY, KEYEVENTF_KEYUP, VIRTUAL_KEY,
};

use crate::application::press_key::{InjectionError, PlatformKeyInjector};

/// Windows implementation of [`PlatformKeyInjector`] using SendInput.
#[derive(Debug, Default)]
pub struct WindowsKeyInjector;

impl WindowsKeyInjector {
    pub fn new() -> Self {
        Self
    }
}

impl PlatformKeyInjector for WindowsKeyInjector {
    fn key_down(&self, key: NumpadKey) -> Result<(), InjectionError> {
        send_inputs(&[keyboard_input(key, false)])
    }

    fn key_up(&self, key: NumpadKey) -> Result<(), InjectionError> {
        send_inputs(&[keyboard_input(key, true)])
    }

    /// Submits down and up in one call so no other input interleaves.
    fn tap(&self, key: NumpadKey) -> Result<(), InjectionError> {
        send_inputs(&[keyboard_input(key, false), keyboard_input(key, true)])
    }
}

fn keyboard_input(key: NumpadKey, key_up: bool) -> INPUT {
    let mut flags = KEYBD_EVENT_FLAGS(0);
    if key_up {
        flags |= KEYEVENTF_KEYUP;
    }
    if windows_vk::is_extended(key) {
        flags |= KEYEVENTF_EXTENDEDKEY;
    }

    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(KeyMapper::to_windows_vk(key)),
                wScan: 0,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

fn send_inputs(inputs: &[INPUT]) -> Result<(), InjectionError> {
    // SAFETY: every element is a fully initialised KEYBDINPUT.
    let sent = unsafe { SendInput(inputs, std::mem::size_of::<INPUT>() as i32) };
    if sent as usize != inputs.len() {
        return Err(InjectionError::Platform(format!(
            "SendInput inserted {sent} of {} events (blocked by UIPI?)",
            inputs.len()
        )));
    }
    Ok(())
}
