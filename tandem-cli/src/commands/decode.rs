//! Parse a wire command and explain it.

use anyhow::{Context, Result};
use tandem_types::{Command, TandemError};

/// Explain what `text` means on the wire.
pub fn describe(text: &str) -> Result<String, TandemError> {
    let command = Command::parse(text)?;
    let line = match command {
        Command::PhoneChoice(choice) => {
            format!("PHONE_CHOICE {} (phone -> watch, informational)", choice)
        }
        Command::WatchChoice(choice) => {
            format!("WATCH_CHOICE {} (watch -> phone)", choice)
        }
        Command::Result(outcome) => format!("RESULT {} (phone -> watch)", outcome),
        Command::Reset => "RESET (either direction)".to_string(),
    };
    Ok(line)
}

/// Run the decode command.
pub fn run(text: &str) -> Result<()> {
    let line = describe(text).with_context(|| format!("Cannot decode {:?}", text))?;
    println!("{}", line);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_every_command() {
        assert_eq!(
            describe("RPS:PHONE:ROCK").unwrap(),
            "PHONE_CHOICE ROCK (phone -> watch, informational)"
        );
        assert_eq!(
            describe("RPS:WATCH:PAPER").unwrap(),
            "WATCH_CHOICE PAPER (watch -> phone)"
        );
        assert_eq!(
            describe("RPS:RESULT:WATCH").unwrap(),
            "RESULT PEER_WINS (phone -> watch)"
        );
        assert_eq!(describe("RPS:RESET").unwrap(), "RESET (either direction)");
    }

    #[test]
    fn unknown_command_is_an_error() {
        assert!(matches!(
            describe("RPS:FOO"),
            Err(TandemError::UnknownCommand(_))
        ));
        assert!(run("rps:reset").is_err());
    }
}
