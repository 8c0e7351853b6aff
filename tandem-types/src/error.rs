//! Error types for Tandem.

use thiserror::Error;

/// Errors that can occur while decoding Tandem wire data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TandemError {
    /// Payload does not start with a known command prefix
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Choice token is not ROCK, PAPER or SCISSORS
    #[error("invalid choice: {0}")]
    InvalidChoice(String),

    /// Result token is not PHONE, WATCH or DRAW
    #[error("invalid outcome: {0}")]
    InvalidOutcome(String),

    /// Payload bytes are not UTF-8 text
    #[error("payload is not valid UTF-8")]
    InvalidUtf8,

    /// Message arrived on a path other than the command path
    #[error("unexpected channel path: {0}")]
    UnexpectedPath(String),
}
