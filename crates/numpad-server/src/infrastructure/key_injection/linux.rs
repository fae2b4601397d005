//! Linux key injection through the `xdotool` command.
//!
//! `xdotool key KP_5` synthesizes a full press and release of the keypad 5
//! through the XTest extension of the running X server (or XWayland).  Using
//! the command keeps the host binary free of a link-time dependency on
//! libX11/libXtst; build with `--features xtest` to call XTest directly
//! instead.
//!
//! The process must run inside the desktop session (with `DISPLAY` set) and
//! `xdotool` must be on `PATH`.  Each press waits for the child process, so
//! the read pump calls it from the blocking thread pool.

use std::ffi::OsString;
use std::process::Command;

use numpad_core::{KeyMapper, NumpadKey};
use tracing::debug;

use crate::application::press_key::{InjectionError, PlatformKeyInjector};

/// Injects keys by running `xdotool`.
#[derive(Debug, Clone)]
pub struct XdotoolKeyInjector {
    program: OsString,
}

impl XdotoolKeyInjector {
    pub fn new() -> Self {
        Self::with_program("xdotool")
    }

    /// Uses `program` in place of `xdotool`.
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, action: &str, key: NumpadKey) -> Result<(), InjectionError> {
        let keysym = KeyMapper::to_x11_keysym_name(key);
        debug!(action, keysym, "running xdotool");

        let status = Command::new(&self.program)
            .arg(action)
            .arg(keysym)
            .status()
            .map_err(|e| {
                InjectionError::Platform(format!(
                    "failed to run {}: {e}",
                    self.program.to_string_lossy()
                ))
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(InjectionError::Platform(format!(
                "{} {action} {keysym} exited with {status}",
                self.program.to_string_lossy()
            )))
        }
    }
}

impl Default for XdotoolKeyInjector {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformKeyInjector for XdotoolKeyInjector {
    fn key_down(&self, key: NumpadKey) -> Result<(), InjectionError> {
        self.run("keydown", key)
    }

    fn key_up(&self, key: NumpadKey) -> Result<(), InjectionError> {
        self.run("keyup", key)
    }

    /// One `xdotool key` invocation instead of two processes.
    fn tap(&self, key: NumpadKey) -> Result<(), InjectionError> {
        self.run("key", key)
    }
}
