//! Terminal input parsing.
//!
//! Each line typed by the user becomes one [`Command`]:
//!
//! | Input                  | Command                              |
//! |------------------------|--------------------------------------|
//! | `5`, `enter`, `+`      | one key                              |
//! | `1 2 + 3 enter`        | several keys, sent in order          |
//! | `12.5`                 | a run of single-character keys       |
//! | `:reconnect`           | reconnect now (like refocusing a tab)|
//! | `:reload`              | forget retry history and reconnect   |
//! | `:quit`, `:q`          | close the connection and exit        |
//!
//! An empty line is an empty key list.

use numpad_core::NumpadKey;
use thiserror::Error;

/// Error type for unparseable terminal input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown key '{0}'")]
    UnknownKey(String),
    #[error("unknown command ':{0}' (try :reconnect, :reload or :quit)")]
    UnknownCommand(String),
}

/// One user instruction to the client loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Press these keys on the host, in order.
    Keys(Vec<NumpadKey>),
    /// Reconnect if idle with no failed attempts behind it.
    Reconnect,
    /// Reset the retry budget and reconnect.
    Reload,
    /// Close the connection and stop.
    Quit,
}

/// Parses one line of terminal input.
///
/// # Errors
///
/// Returns [`CommandError::UnknownCommand`] for an unrecognised `:` command
/// and [`CommandError::UnknownKey`] if any token is not a keypad key.  No
/// keys are returned for a line containing an invalid token.
pub fn parse_line(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();

    if let Some(name) = line.strip_prefix(':') {
        return match name.trim().to_ascii_lowercase().as_str() {
            "reconnect" | "r" => Ok(Command::Reconnect),
            "reload" => Ok(Command::Reload),
            "quit" | "q" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::UnknownCommand(other.to_string())),
        };
    }

    let mut keys = Vec::new();
    for token in line.split_whitespace() {
        parse_token(token, &mut keys)?;
    }
    Ok(Command::Keys(keys))
}

/// A token is either a key name (`enter`, `5`) or a run of one-character
/// keys (`12+3`).
fn parse_token(token: &str, keys: &mut Vec<NumpadKey>) -> Result<(), CommandError> {
    if let Ok(key) = NumpadKey::parse(token) {
        keys.push(key);
        return Ok(());
    }

    let mut buf = [0u8; 4];
    let run = token
        .chars()
        .map(|c| NumpadKey::parse(c.encode_utf8(&mut buf)))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| CommandError::UnknownKey(token.to_string()))?;
    keys.extend(run);
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_digit_is_one_key() {
        assert_eq!(parse_line("5"), Ok(Command::Keys(vec![NumpadKey::Digit5])));
    }

    #[test]
    fn test_named_keys_are_case_insensitive() {
        assert_eq!(
            parse_line("Enter BACKSPACE escape"),
            Ok(Command::Keys(vec![
                NumpadKey::Enter,
                NumpadKey::Backspace,
                NumpadKey::Escape
            ]))
        );
    }

    #[test]
    fn test_run_of_symbols_expands_to_keys() {
        // Arrange / Act
        let command = parse_line("12.5/4").unwrap();

        // Assert
        assert_eq!(
            command,
            Command::Keys(vec![
                NumpadKey::Digit1,
                NumpadKey::Digit2,
                NumpadKey::Decimal,
                NumpadKey::Digit5,
                NumpadKey::Divide,
                NumpadKey::Digit4,
            ])
        );
    }

    #[test]
    fn test_mixed_tokens_keep_order() {
        assert_eq!(
            parse_line("  7 * 6 enter  "),
            Ok(Command::Keys(vec![
                NumpadKey::Digit7,
                NumpadKey::Multiply,
                NumpadKey::Digit6,
                NumpadKey::Enter
            ]))
        );
    }

    #[test]
    fn test_empty_line_is_empty_key_list() {
        assert_eq!(parse_line("   "), Ok(Command::Keys(Vec::new())));
    }

    #[test]
    fn test_unknown_token_rejects_whole_line() {
        assert_eq!(
            parse_line("1 2 x"),
            Err(CommandError::UnknownKey("x".to_string()))
        );
    }

    #[test]
    fn test_colon_commands() {
        assert_eq!(parse_line(":reconnect"), Ok(Command::Reconnect));
        assert_eq!(parse_line(":reload"), Ok(Command::Reload));
        assert_eq!(parse_line(":q"), Ok(Command::Quit));
        assert_eq!(parse_line(" :QUIT "), Ok(Command::Quit));
    }

    #[test]
    fn test_unknown_colon_command_is_rejected() {
        assert_eq!(
            parse_line(":shutdown"),
            Err(CommandError::UnknownCommand("shutdown".to_string()))
        );
    }
}
