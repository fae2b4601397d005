//! Press Key use case: turns a symbolic key from the client into an OS
//! keystroke.
//!
//! The read pump only knows the [`KeyActionSink`] trait.  The production
//! sink, [`PressKeyUseCase`], resolves the symbol to a [`NumpadKey`] and
//! delegates the injection itself to a [`PlatformKeyInjector`] implemented in
//! the infrastructure layer.

use std::sync::Arc;

use numpad_core::{KeymapError, NumpadKey};
use thiserror::Error;
use tracing::info;

/// Error type for key injection.
#[derive(Debug, Error)]
pub enum InjectionError {
    #[error("unknown key: {0}")]
    UnknownKey(String),
    #[error("platform error: {0}")]
    Platform(String),
    #[error("key injection is not supported on this platform")]
    Unsupported,
}

impl From<KeymapError> for InjectionError {
    fn from(err: KeymapError) -> Self {
        match err {
            KeymapError::UnknownKey(key) => InjectionError::UnknownKey(key),
        }
    }
}

/// Receives key actions decoded by the read pump.
pub trait KeyActionSink: Send + Sync {
    /// Performs one key press for the symbolic identifier `key`.
    ///
    /// # Errors
    ///
    /// Any error is reported back to the client; the session continues.
    fn press(&self, key: &str) -> Result<(), InjectionError>;
}

/// OS-level keystroke injection.
///
/// Each supported OS provides an implementation in the infrastructure layer.
#[cfg_attr(test, mockall::automock)]
pub trait PlatformKeyInjector: Send + Sync {
    /// Injects a key-down event.
    fn key_down(&self, key: NumpadKey) -> Result<(), InjectionError>;

    /// Injects a key-up event.
    fn key_up(&self, key: NumpadKey) -> Result<(), InjectionError>;

    /// Injects a key-down immediately followed by a key-up.
    fn tap(&self, key: NumpadKey) -> Result<(), InjectionError> {
        self.key_down(key)?;
        self.key_up(key)
    }
}

/// The production key sink.
pub struct PressKeyUseCase {
    injector: Arc<dyn PlatformKeyInjector>,
}

impl PressKeyUseCase {
    pub fn new(injector: Arc<dyn PlatformKeyInjector>) -> Self {
        Self { injector }
    }
}

impl KeyActionSink for PressKeyUseCase {
    fn press(&self, key: &str) -> Result<(), InjectionError> {
        let parsed = NumpadKey::parse(key)?;
        self.injector.tap(parsed)?;
        info!(key = %parsed, "key pressed");
        Ok(())
    }
}

/// Sink used with `--dry-run`: validates and logs keys, injects nothing.
#[derive(Debug, Default)]
pub struct DryRunSink;

impl KeyActionSink for DryRunSink {
    fn press(&self, key: &str) -> Result<(), InjectionError> {
        let parsed = NumpadKey::parse(key)?;
        info!(key = %parsed, "dry run: key press not injected");
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
