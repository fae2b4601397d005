//! Platform key injectors.
//!
//! The correct implementation is selected at compile time via
//! `#[cfg(target_os = ...)]`:
//!
//! | Target          | Injector                         | Mechanism                 |
//! |-----------------|----------------------------------|---------------------------|
//! | Windows         | [`windows::WindowsKeyInjector`]  | `SendInput`               |
//! | Linux (default) | [`linux::XdotoolKeyInjector`]    | `xdotool key KP_5`        |
//! | Linux + `xtest` | [`xtest::XTestKeyInjector`]      | XTest extension over Xlib |
//! | macOS           | [`macos::MacosKeyInjector`]      | CoreGraphics events       |
//! | anything else   | [`UnsupportedInjector`]          | always fails              |

use std::sync::Arc;

use numpad_core::NumpadKey;

use crate::application::press_key::{InjectionError, PlatformKeyInjector};

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(all(target_os = "linux", feature = "xtest"))]
pub mod xtest;

#[cfg(target_os = "macos")]
pub mod macos;

/// Injector for targets without a back-end.  Every press reports
/// [`InjectionError::Unsupported`] to the client.
#[derive(Debug, Default)]
pub struct UnsupportedInjector;

impl PlatformKeyInjector for UnsupportedInjector {
    fn key_down(&self, _key: NumpadKey) -> Result<(), InjectionError> {
        Err(InjectionError::Unsupported)
    }

    fn key_up(&self, _key: NumpadKey) -> Result<(), InjectionError> {
        Err(InjectionError::Unsupported)
    }
}

/// Creates the injector for the platform this binary was built for.
///
/// # Errors
///
/// Returns [`InjectionError::Platform`] if the back-end cannot be initialised
/// (e.g. no X display for the XTest injector).
pub fn platform_injector() -> Result<Arc<dyn PlatformKeyInjector>, InjectionError> {
    #[cfg(target_os = "windows")]
    let injector: Arc<dyn PlatformKeyInjector> = Arc::new(windows::WindowsKeyInjector::new());

    #[cfg(all(target_os = "linux", feature = "xtest"))]
    let injector: Arc<dyn PlatformKeyInjector> = Arc::new(xtest::XTestKeyInjector::open()?);

    #[cfg(all(target_os = "linux", not(feature = "xtest")))]
    let injector: Arc<dyn PlatformKeyInjector> = Arc::new(linux::XdotoolKeyInjector::new());

    #[cfg(target_os = "macos")]
    let injector: Arc<dyn PlatformKeyInjector> = Arc::new(macos::MacosKeyInjector::new());

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    let injector: Arc<dyn PlatformKeyInjector> = Arc::new(UnsupportedInjector);

    Ok(injector)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_injector_fails_every_tap() {
        let injector = UnsupportedInjector;
        assert!(matches!(
            injector.tap(NumpadKey::Digit1),
            Err(InjectionError::Unsupported)
        ));
    }
}
