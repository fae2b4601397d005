//! Recording key injector for tests and demos.
//!
//! Replaces all OS calls with in-memory recording so tests can assert
//! exactly which keys a session injected, in order.  Keys listed in
//! `failing` report a platform error instead, which exercises the error
//! payload path without a broken desktop.
//!
//! # Usage in tests
//!
//! ```ignore
//! let injector = Arc::new(MockKeyInjector::new());
//! let sink = PressKeyUseCase::new(injector.clone());
//!
//! sink.press("5").unwrap();
//!
//! assert_eq!(injector.taps(), vec![NumpadKey::Digit5]);
//! ```

use std::sync::Mutex;

use numpad_core::NumpadKey;

use crate::application::press_key::{InjectionError, PlatformKeyInjector};

/// A mock injector that records every event without touching the OS.
#[derive(Debug, Default)]
pub struct MockKeyInjector {
    pub key_downs: Mutex<Vec<NumpadKey>>,
    pub key_ups: Mutex<Vec<NumpadKey>>,
    /// Keys for which every event fails with [`InjectionError::Platform`].
    pub failing: Vec<NumpadKey>,
}

impl MockKeyInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// An injector that fails for the given keys.
    pub fn failing_on(keys: impl IntoIterator<Item = NumpadKey>) -> Self {
        Self {
            failing: keys.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Keys that completed a full down/up tap, in order.
    pub fn taps(&self) -> Vec<NumpadKey> {
        match self.key_ups.lock() {
            Ok(ups) => ups.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn record(&self, log: &Mutex<Vec<NumpadKey>>, key: NumpadKey) -> Result<(), InjectionError> {
        if self.failing.contains(&key) {
            return Err(InjectionError::Platform(format!("simulated failure for {key}")));
        }
        log.lock()
            .map_err(|_| InjectionError::Platform("mock log poisoned".to_string()))?
            .push(key);
        Ok(())
    }
}

impl PlatformKeyInjector for MockKeyInjector {
    fn key_down(&self, key: NumpadKey) -> Result<(), InjectionError> {
        self.record(&self.key_downs, key)
    }

    fn key_up(&self, key: NumpadKey) -> Result<(), InjectionError> {
        self.record(&self.key_ups, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tap_records_down_then_up() {
        let injector = MockKeyInjector::new();

        injector.tap(NumpadKey::Add).unwrap();

        assert_eq!(*injector.key_downs.lock().unwrap(), vec![NumpadKey::Add]);
        assert_eq!(injector.taps(), vec![NumpadKey::Add]);
    }

    #[test]
    fn test_failing_key_records_nothing() {
        let injector = MockKeyInjector::failing_on([NumpadKey::Enter]);

        assert!(injector.tap(NumpadKey::Enter).is_err());
        assert!(injector.taps().is_empty());
        assert!(injector.key_downs.lock().unwrap().is_empty());
    }
}
