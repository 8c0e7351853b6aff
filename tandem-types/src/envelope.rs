//! Envelope - what actually crosses the channel.

use crate::{Command, TandemError};

/// The one channel path Tandem commands travel on.
pub const COMMAND_PATH: &str = "/cmd";

/// A path plus opaque payload, as delivered by the message channel.
///
/// Only envelopes on [`COMMAND_PATH`] carry commands. Anything else belongs
/// to some other feature sharing the transport and is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Logical channel path
    pub path: String,
    /// Opaque payload (UTF-8 command text on the command path)
    pub payload: Vec<u8>,
}

impl Envelope {
    /// Create an envelope on an arbitrary path.
    pub fn new(path: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            payload,
        }
    }

    /// Wrap a command on the given path.
    pub fn command_on(path: &str, command: Command) -> Self {
        Self::new(path, command.to_bytes())
    }

    /// Wrap a command on the default command path.
    pub fn command(command: Command) -> Self {
        Self::command_on(COMMAND_PATH, command)
    }

    /// Whether this envelope arrived on `path`.
    pub fn is_on(&self, path: &str) -> bool {
        self.path == path
    }

    /// Payload as text, lossy for diagnostics.
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }

    /// Decode the payload as a command, provided the path matches.
    pub fn decode_on(&self, path: &str) -> Result<Command, TandemError> {
        if !self.is_on(path) {
            return Err(TandemError::UnexpectedPath(self.path.clone()));
        }
        Command::from_bytes(&self.payload)
    }
}
