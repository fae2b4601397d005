//! Keypad key model and per-platform key code translation tables.
//!
//! The canonical representation is [`NumpadKey`]: the closed set of keys a
//! Remote Numpad client can press.  The browser names keys symbolically
//! (`"5"`, `"+"`, `"enter"`, ...); [`NumpadKey::parse`] turns that symbol
//! into a key, and [`KeyMapper`] turns the key into the code each operating
//! system's injection API expects.
//!
//! Digits and operators are injected as their *numeric keypad* variants
//! (e.g. `KP_5` rather than the top-row `5`), so applications that treat the
//! keypad specially (spreadsheets, calculators, games) see real keypad input.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub mod linux_x11;
pub mod macos_cg;
pub mod windows_vk;

/// Error returned when a symbolic key identifier does not name a keypad key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeymapError {
    #[error("unknown key: {0}")]
    UnknownKey(String),
}

/// A key on the remote numeric keypad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumpadKey {
    Digit0,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    Digit9,
    Multiply,
    Add,
    Subtract,
    Decimal,
    Divide,
    Enter,
    Backspace,
    Escape,
}

impl NumpadKey {
    /// Every keypad key, in keypad order.
    pub const ALL: [NumpadKey; 18] = [
        NumpadKey::Digit0,
        NumpadKey::Digit1,
        NumpadKey::Digit2,
        NumpadKey::Digit3,
        NumpadKey::Digit4,
        NumpadKey::Digit5,
        NumpadKey::Digit6,
        NumpadKey::Digit7,
        NumpadKey::Digit8,
        NumpadKey::Digit9,
        NumpadKey::Multiply,
        NumpadKey::Add,
        NumpadKey::Subtract,
        NumpadKey::Decimal,
        NumpadKey::Divide,
        NumpadKey::Enter,
        NumpadKey::Backspace,
        NumpadKey::Escape,
    ];

    /// Parses a symbolic key identifier as sent by the client.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace, so
    /// `"Enter"`, `"ENTER"` and `" enter "` all name [`NumpadKey::Enter`].
    ///
    /// # Errors
    ///
    /// Returns [`KeymapError::UnknownKey`] for any identifier outside the keypad.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use numpad_core::NumpadKey;
    ///
    /// assert_eq!(NumpadKey::parse("5").unwrap(), NumpadKey::Digit5);
    /// assert_eq!(NumpadKey::parse("Backspace").unwrap(), NumpadKey::Backspace);
    /// assert!(NumpadKey::parse("x").is_err());
    /// ```
    pub fn parse(symbol: &str) -> Result<Self, KeymapError> {
        let normalized = symbol.trim().to_ascii_lowercase();
        let key = match normalized.as_str() {
            "0" => NumpadKey::Digit0,
            "1" => NumpadKey::Digit1,
            "2" => NumpadKey::Digit2,
            "3" => NumpadKey::Digit3,
            "4" => NumpadKey::Digit4,
            "5" => NumpadKey::Digit5,
            "6" => NumpadKey::Digit6,
            "7" => NumpadKey::Digit7,
            "8" => NumpadKey::Digit8,
            "9" => NumpadKey::Digit9,
            "*" => NumpadKey::Multiply,
            "+" => NumpadKey::Add,
            "-" => NumpadKey::Subtract,
            "." => NumpadKey::Decimal,
            "/" => NumpadKey::Divide,
            "enter" => NumpadKey::Enter,
            "backspace" => NumpadKey::Backspace,
            "escape" => NumpadKey::Escape,
            _ => return Err(KeymapError::UnknownKey(symbol.to_string())),
        };
        Ok(key)
    }

    /// The canonical symbolic identifier of this key, as the browser sends it.
    pub fn symbol(self) -> &'static str {
        match self {
            NumpadKey::Digit0 => "0",
            NumpadKey::Digit1 => "1",
            NumpadKey::Digit2 => "2",
            NumpadKey::Digit3 => "3",
            NumpadKey::Digit4 => "4",
            NumpadKey::Digit5 => "5",
            NumpadKey::Digit6 => "6",
            NumpadKey::Digit7 => "7",
            NumpadKey::Digit8 => "8",
            NumpadKey::Digit9 => "9",
            NumpadKey::Multiply => "*",
            NumpadKey::Add => "+",
            NumpadKey::Subtract => "-",
            NumpadKey::Decimal => ".",
            NumpadKey::Divide => "/",
            NumpadKey::Enter => "enter",
            NumpadKey::Backspace => "backspace",
            NumpadKey::Escape => "escape",
        }
    }
}

impl FromStr for NumpadKey {
    type Err = KeymapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for NumpadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Unified key mapper providing every platform translation.
pub struct KeyMapper;

impl KeyMapper {
    /// Translates a [`NumpadKey`] to a Windows Virtual Key code.
    pub fn to_windows_vk(key: NumpadKey) -> u16 {
        windows_vk::key_to_vk(key)
    }

    /// Translates a [`NumpadKey`] to an X11 KeySym value.
    pub fn to_x11_keysym(key: NumpadKey) -> u32 {
        linux_x11::key_to_keysym(key)
    }

    /// Returns the X11 KeySym *name* of a key (e.g. `"KP_5"`), as accepted by
    /// tools such as `xdotool key`.
    pub fn to_x11_keysym_name(key: NumpadKey) -> &'static str {
        linux_x11::key_to_keysym_name(key)
    }

    /// Translates a [`NumpadKey`] to a macOS `CGKeyCode` value.
    pub fn to_macos_cgkeycode(key: NumpadKey) -> u16 {
        macos_cg::key_to_cgkeycode(key)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(NumpadKey::parse("ENTER").unwrap(), NumpadKey::Enter);
        assert_eq!(NumpadKey::parse("Escape").unwrap(), NumpadKey::Escape);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(NumpadKey::parse(" 7 ").unwrap(), NumpadKey::Digit7);
    }

    #[test]
    fn test_parse_unknown_key_reports_original_symbol() {
        assert_eq!(
            NumpadKey::parse("X"),
            Err(KeymapError::UnknownKey("X".to_string()))
        );
    }

    #[test]
    fn test_parse_empty_symbol_is_unknown() {
        assert!(NumpadKey::parse("").is_err());
    }

    #[test]
    fn test_symbol_parses_back_to_same_key_for_all_keys() {
        for key in NumpadKey::ALL {
            assert_eq!(NumpadKey::parse(key.symbol()).unwrap(), key);
        }
    }

    #[test]
    fn test_from_str_delegates_to_parse() {
        let key: NumpadKey = "/".parse().unwrap();
        assert_eq!(key, NumpadKey::Divide);
    }

    #[test]
    fn test_display_uses_symbol() {
        assert_eq!(NumpadKey::Backspace.to_string(), "backspace");
    }

    #[test]
    fn test_platform_codes_are_unique_per_platform() {
        use std::collections::HashSet;

        let vks: HashSet<u16> = NumpadKey::ALL.iter().map(|k| KeyMapper::to_windows_vk(*k)).collect();
        let syms: HashSet<u32> = NumpadKey::ALL.iter().map(|k| KeyMapper::to_x11_keysym(*k)).collect();
        let cgs: HashSet<u16> = NumpadKey::ALL
            .iter()
            .map(|k| KeyMapper::to_macos_cgkeycode(*k))
            .collect();

        assert_eq!(vks.len(), NumpadKey::ALL.len());
        assert_eq!(syms.len(), NumpadKey::ALL.len());
        assert_eq!(cgs.len(), NumpadKey::ALL.len());
    }
}
