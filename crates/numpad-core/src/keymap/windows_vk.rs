//! Keypad key to Windows Virtual Key code translation table.
//!
//! Reference: <https://learn.microsoft.com/en-us/windows/win32/inputdev/virtual-key-codes>
//!
//! # Keypad Enter
//!
//! Windows has no dedicated VK code for the keypad Enter key: both Enter keys
//! report `VK_RETURN` (0x0D).  The keypad one is distinguished by the
//! *extended-key* flag on the injected event, which is why
//! [`is_extended`] exists.

use super::NumpadKey;

/// Translates a [`NumpadKey`] to a Windows Virtual Key code.
pub fn key_to_vk(key: NumpadKey) -> u16 {
    match key {
        NumpadKey::Digit0 => 0x60,    // VK_NUMPAD0
        NumpadKey::Digit1 => 0x61,    // VK_NUMPAD1
        NumpadKey::Digit2 => 0x62,    // VK_NUMPAD2
        NumpadKey::Digit3 => 0x63,    // VK_NUMPAD3
        NumpadKey::Digit4 => 0x64,    // VK_NUMPAD4
        NumpadKey::Digit5 => 0x65,    // VK_NUMPAD5
        NumpadKey::Digit6 => 0x66,    // VK_NUMPAD6
        NumpadKey::Digit7 => 0x67,    // VK_NUMPAD7
        NumpadKey::Digit8 => 0x68,    // VK_NUMPAD8
        NumpadKey::Digit9 => 0x69,    // VK_NUMPAD9
        NumpadKey::Multiply => 0x6A,  // VK_MULTIPLY
        NumpadKey::Add => 0x6B,       // VK_ADD
        NumpadKey::Subtract => 0x6D,  // VK_SUBTRACT
        NumpadKey::Decimal => 0x6E,   // VK_DECIMAL
        NumpadKey::Divide => 0x6F,    // VK_DIVIDE
        NumpadKey::Enter => 0x0D,     // VK_RETURN
        NumpadKey::Backspace => 0x08, // VK_BACK
        NumpadKey::Escape => 0x1B,    // VK_ESCAPE
    }
}

/// Returns `true` if the key must be injected with `KEYEVENTF_EXTENDEDKEY`.
///
/// Keypad Enter and keypad Divide are extended keys on a standard 101-key
/// layout.
pub fn is_extended(key: NumpadKey) -> bool {
    matches!(key, NumpadKey::Enter | NumpadKey::Divide)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_map_to_numpad_range() {
        assert_eq!(key_to_vk(NumpadKey::Digit0), 0x60);
        assert_eq!(key_to_vk(NumpadKey::Digit9), 0x69);
    }

    #[test]
    fn test_enter_is_extended_but_digits_are_not() {
        assert!(is_extended(NumpadKey::Enter));
        assert!(!is_extended(NumpadKey::Digit5));
    }
}
