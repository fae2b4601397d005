//! Keypad key to macOS `CGKeyCode` translation table.
//!
//! Values are the `kVK_*` constants from
//! `Carbon.framework/HIToolbox/Events.h`.  They identify physical key
//! positions on an ANSI keyboard; note that `Keypad8` and `Keypad9` skip
//! 0x5A.

use super::NumpadKey;

/// Translates a [`NumpadKey`] to a macOS `CGKeyCode`.
pub fn key_to_cgkeycode(key: NumpadKey) -> u16 {
    match key {
        NumpadKey::Digit0 => 0x52,    // kVK_ANSI_Keypad0
        NumpadKey::Digit1 => 0x53,    // kVK_ANSI_Keypad1
        NumpadKey::Digit2 => 0x54,    // kVK_ANSI_Keypad2
        NumpadKey::Digit3 => 0x55,    // kVK_ANSI_Keypad3
        NumpadKey::Digit4 => 0x56,    // kVK_ANSI_Keypad4
        NumpadKey::Digit5 => 0x57,    // kVK_ANSI_Keypad5
        NumpadKey::Digit6 => 0x58,    // kVK_ANSI_Keypad6
        NumpadKey::Digit7 => 0x59,    // kVK_ANSI_Keypad7
        NumpadKey::Digit8 => 0x5B,    // kVK_ANSI_Keypad8
        NumpadKey::Digit9 => 0x5C,    // kVK_ANSI_Keypad9
        NumpadKey::Multiply => 0x43,  // kVK_ANSI_KeypadMultiply
        NumpadKey::Add => 0x45,       // kVK_ANSI_KeypadPlus
        NumpadKey::Subtract => 0x4E,  // kVK_ANSI_KeypadMinus
        NumpadKey::Decimal => 0x41,   // kVK_ANSI_KeypadDecimal
        NumpadKey::Divide => 0x4B,    // kVK_ANSI_KeypadDivide
        NumpadKey::Enter => 0x4C,     // kVK_ANSI_KeypadEnter
        NumpadKey::Backspace => 0x33, // kVK_Delete
        NumpadKey::Escape => 0x35,    // kVK_Escape
    }
}
