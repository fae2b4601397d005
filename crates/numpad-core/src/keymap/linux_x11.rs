//! Keypad key to X11 KeySym translation table for Linux hosts.
//!
//! X11 KeySym values are defined in X11/keysymdef.h.
//! Reference: <https://gitlab.freedesktop.org/xorg/proto/xorgproto/-/blob/master/include/X11/keysymdef.h>
//!
//! X11 has distinct KeySyms for the keypad (`XK_KP_0` … `XK_KP_9`,
//! `XK_KP_Add`, ...), so no modifier or extended flag is needed to tell them
//! apart from the main keyboard.  Two forms are exposed: the numeric KeySym
//! for the XTest FFI path, and the KeySym *name* for `xdotool`.

use super::NumpadKey;

/// Translates a [`NumpadKey`] to an X11 KeySym value.
pub fn key_to_keysym(key: NumpadKey) -> u32 {
    match key {
        NumpadKey::Digit0 => 0xFFB0,    // XK_KP_0
        NumpadKey::Digit1 => 0xFFB1,    // XK_KP_1
        NumpadKey::Digit2 => 0xFFB2,    // XK_KP_2
        NumpadKey::Digit3 => 0xFFB3,    // XK_KP_3
        NumpadKey::Digit4 => 0xFFB4,    // XK_KP_4
        NumpadKey::Digit5 => 0xFFB5,    // XK_KP_5
        NumpadKey::Digit6 => 0xFFB6,    // XK_KP_6
        NumpadKey::Digit7 => 0xFFB7,    // XK_KP_7
        NumpadKey::Digit8 => 0xFFB8,    // XK_KP_8
        NumpadKey::Digit9 => 0xFFB9,    // XK_KP_9
        NumpadKey::Multiply => 0xFFAA,  // XK_KP_Multiply
        NumpadKey::Add => 0xFFAB,       // XK_KP_Add
        NumpadKey::Subtract => 0xFFAD,  // XK_KP_Subtract
        NumpadKey::Decimal => 0xFFAE,   // XK_KP_Decimal
        NumpadKey::Divide => 0xFFAF,    // XK_KP_Divide
        NumpadKey::Enter => 0xFF8D,     // XK_KP_Enter
        NumpadKey::Backspace => 0xFF08, // XK_BackSpace
        NumpadKey::Escape => 0xFF1B,    // XK_Escape
    }
}

/// Returns the KeySym name (without the `XK_` prefix) of a key.
pub fn key_to_keysym_name(key: NumpadKey) -> &'static str {
    match key {
        NumpadKey::Digit0 => "KP_0",
        NumpadKey::Digit1 => "KP_1",
        NumpadKey::Digit2 => "KP_2",
        NumpadKey::Digit3 => "KP_3",
        NumpadKey::Digit4 => "KP_4",
        NumpadKey::Digit5 => "KP_5",
        NumpadKey::Digit6 => "KP_6",
        NumpadKey::Digit7 => "KP_7",
        NumpadKey::Digit8 => "KP_8",
        NumpadKey::Digit9 => "KP_9",
        NumpadKey::Multiply => "KP_Multiply",
        NumpadKey::Add => "KP_Add",
        NumpadKey::Subtract => "KP_Subtract",
        NumpadKey::Decimal => "KP_Decimal",
        NumpadKey::Divide => "KP_Divide",
        NumpadKey::Enter => "KP_Enter",
        NumpadKey::Backspace => "BackSpace",
        NumpadKey::Escape => "Escape",
    }
}
