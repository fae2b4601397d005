//! Linux X11 key injection via the XTest extension.
//!
//! Enabled with the `xtest` cargo feature.  Requires libX11 and libXtst at
//! link time and an X display at runtime.
//!
//! `XTestFakeKeyEvent` takes an X11 *keycode*, so each keypad KeySym is
//! resolved through the server's current keyboard mapping first:
//!
//! ```text
//! NumpadKey → X11 KeySym → XKeysymToKeycode(display, keysym) → keycode
//! ```

use std::ptr;
use std::sync::Mutex;

use numpad_core::{KeyMapper, NumpadKey};
use x11::{xlib, xtest};

use crate::application::press_key::{InjectionError, PlatformKeyInjector};

/// `CurrentTime`: deliver the event immediately.
const CURRENT_TIME: std::os::raw::c_ulong = 0;

struct Display(*mut xlib::Display);

// SAFETY: the pointer is only dereferenced by Xlib while the owning Mutex is
// held, and XInitThreads is called before the display is opened.
unsafe impl Send for Display {}

/// XTest injector holding one connection to the X server.
pub struct XTestKeyInjector {
    display: Mutex<Display>,
}

impl XTestKeyInjector {
    /// Opens the display named by `DISPLAY`.
    ///
    /// # Errors
    ///
    /// Returns [`InjectionError::Platform`] if the display cannot be opened.
    pub fn open() -> Result<Self, InjectionError> {
        // SAFETY: plain Xlib initialisation calls with a null display name.
        let display = unsafe {
            xlib::XInitThreads();
            xlib::XOpenDisplay(ptr::null())
        };
        if display.is_null() {
            return Err(InjectionError::Platform(
                "cannot open X display (is DISPLAY set?)".to_string(),
            ));
        }
        Ok(Self {
            display: Mutex::new(Display(display)),
        })
    }

    fn send(&self, key: NumpadKey, press: bool) -> Result<(), InjectionError> {
        let display = self
            .display
            .lock()
            .map_err(|_| InjectionError::Platform("X display lock poisoned".to_string()))?;
        let keysym = xlib::KeySym::from(KeyMapper::to_x11_keysym(key));

        // SAFETY: the display pointer is non-null and stays open for the
        // lifetime of `self`.
        unsafe {
            let keycode = xlib::XKeysymToKeycode(display.0, keysym);
            if keycode == 0 {
                return Err(InjectionError::Platform(format!(
                    "no keycode mapped for {}",
                    KeyMapper::to_x11_keysym_name(key)
                )));
            }
            xtest::XTestFakeKeyEvent(display.0, u32::from(keycode), i32::from(press), CURRENT_TIME);
            xlib::XFlush(display.0);
        }
        Ok(())
    }
}

impl PlatformKeyInjector for XTestKeyInjector {
    fn key_down(&self, key: NumpadKey) -> Result<(), InjectionError> {
        self.send(key, true)
    }

    fn key_up(&self, key: NumpadKey) -> Result<(), InjectionError> {
        self.send(key, false)
    }
}

impl Drop for XTestKeyInjector {
    fn drop(&mut self) {
        if let Ok(display) = self.display.get_mut() {
            // SAFETY: the display was opened in `open` and is closed once.
            unsafe {
                xlib::XCloseDisplay(display.0);
            }
        }
    }
}
