//! Protocol commands for Tandem.
//!
//! Commands travel as plain colon-delimited text:
//!
//! ```text
//! RPS:PHONE:<CHOICE>                  primary announces its choice
//! RPS:WATCH:<CHOICE>                  peer submits its choice
//! RPS:RESULT:<PHONE|WATCH|DRAW>       primary broadcasts the outcome
//! RPS:RESET                           either side abandons the round
//! ```
//!
//! There is no version field. A new command kind needs a new literal prefix
//! and both devices must be upgraded together.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TandemError;

/// Prefix shared by every command.
pub const COMMAND_PREFIX: &str = "RPS:";

const PHONE_CHOICE_PREFIX: &str = "RPS:PHONE:";
const WATCH_CHOICE_PREFIX: &str = "RPS:WATCH:";
const RESULT_PREFIX: &str = "RPS:RESULT:";
const RESET: &str = "RPS:RESET";

/// A rock/paper/scissors choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Choice {
    /// Beats scissors
    Rock,
    /// Beats rock
    Paper,
    /// Beats paper
    Scissors,
}

impl Choice {
    /// Every choice, in wire order.
    pub const ALL: [Choice; 3] = [Choice::Rock, Choice::Paper, Choice::Scissors];

    /// The wire token for this choice.
    pub fn as_str(&self) -> &'static str {
        match self {
            Choice::Rock => "ROCK",
            Choice::Paper => "PAPER",
            Choice::Scissors => "SCISSORS",
        }
    }

    /// The choice this one defeats.
    pub fn beats(&self) -> Choice {
        match self {
            Choice::Rock => Choice::Scissors,
            Choice::Paper => Choice::Rock,
            Choice::Scissors => Choice::Paper,
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Choice {
    type Err = TandemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ROCK" => Ok(Choice::Rock),
            "PAPER" => Ok(Choice::Paper),
            "SCISSORS" => Ok(Choice::Scissors),
            other => Err(TandemError::InvalidChoice(other.to_string())),
        }
    }
}

/// Result of a round, stated independently of either device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    /// The primary (phone) won
    PrimaryWins,
    /// The peer (watch) won
    PeerWins,
    /// Both chose the same
    Draw,
}

impl Outcome {
    /// The token carried in a `RPS:RESULT:` command.
    pub fn wire_token(&self) -> &'static str {
        match self {
            Outcome::PrimaryWins => "PHONE",
            Outcome::PeerWins => "WATCH",
            Outcome::Draw => "DRAW",
        }
    }

    /// Parse a `RPS:RESULT:` token.
    pub fn from_wire_token(token: &str) -> Result<Self, TandemError> {
        match token {
            "PHONE" => Ok(Outcome::PrimaryWins),
            "WATCH" => Ok(Outcome::PeerWins),
            "DRAW" => Ok(Outcome::Draw),
            other => Err(TandemError::InvalidOutcome(other.to_string())),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::PrimaryWins => f.write_str("PRIMARY_WINS"),
            Outcome::PeerWins => f.write_str("PEER_WINS"),
            Outcome::Draw => f.write_str("DRAW"),
        }
    }
}

/// All protocol commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Primary's choice, informational for the peer
    PhoneChoice(Choice),
    /// Peer's choice, consumed by the primary
    WatchChoice(Choice),
    /// Outcome computed by the primary
    Result(Outcome),
    /// Abandon the current round on both sides
    Reset,
}

impl Command {
    /// Encode to the wire text.
    pub fn encode(&self) -> String {
        match self {
            Command::PhoneChoice(c) => format!("{PHONE_CHOICE_PREFIX}{c}"),
            Command::WatchChoice(c) => format!("{WATCH_CHOICE_PREFIX}{c}"),
            Command::Result(o) => format!("{RESULT_PREFIX}{}", o.wire_token()),
            Command::Reset => RESET.to_string(),
        }
    }

    /// Decode from wire text.
    pub fn parse(text: &str) -> Result<Self, TandemError> {
        if text == RESET {
            return Ok(Command::Reset);
        }
        if let Some(token) = text.strip_prefix(PHONE_CHOICE_PREFIX) {
            return token.parse().map(Command::PhoneChoice);
        }
        if let Some(token) = text.strip_prefix(WATCH_CHOICE_PREFIX) {
            return token.parse().map(Command::WatchChoice);
        }
        if let Some(token) = text.strip_prefix(RESULT_PREFIX) {
            return Outcome::from_wire_token(token).map(Command::Result);
        }
        Err(TandemError::UnknownCommand(text.to_string()))
    }

    /// Decode from raw payload bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TandemError> {
        let text = std::str::from_utf8(bytes).map_err(|_| TandemError::InvalidUtf8)?;
        Self::parse(text)
    }

    /// Encode to raw payload bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.encode().into_bytes()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for Command {
    type Err = TandemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_exact_wire_strings() {
        assert_eq!(Command::PhoneChoice(Choice::Rock).encode(), "RPS:PHONE:ROCK");
        assert_eq!(
            Command::WatchChoice(Choice::Scissors).encode(),
            "RPS:WATCH:SCISSORS"
        );
        assert_eq!(
            Command::Result(Outcome::PrimaryWins).encode(),
            "RPS:RESULT:PHONE"
        );
        assert_eq!(Command::Result(Outcome::PeerWins).encode(), "RPS:RESULT:WATCH");
        assert_eq!(Command::Result(Outcome::Draw).encode(), "RPS:RESULT:DRAW");
        assert_eq!(Command::Reset.encode(), "RPS:RESET");
    }

    #[test]
    fn parses_every_command_kind() {
        assert_eq!(
            Command::parse("RPS:WATCH:PAPER").unwrap(),
            Command::WatchChoice(Choice::Paper)
        );
        assert_eq!(
            Command::parse("RPS:PHONE:SCISSORS").unwrap(),
            Command::PhoneChoice(Choice::Scissors)
        );
        assert_eq!(
            Command::parse("RPS:RESULT:DRAW").unwrap(),
            Command::Result(Outcome::Draw)
        );
        assert_eq!(Command::parse("RPS:RESET").unwrap(), Command::Reset);
    }

    #[test]
    fn unknown_prefix_is_rejected() {
        assert_eq!(
            Command::parse("RPS:FOO"),
            Err(TandemError::UnknownCommand("RPS:FOO".into()))
        );
        assert!(Command::parse("").is_err());
        assert!(Command::parse("RPS:RESET:NOW").is_err());
    }

    #[test]
    fn bad_tokens_are_rejected() {
        assert_eq!(
            Command::parse("RPS:WATCH:LIZARD"),
            Err(TandemError::InvalidChoice("LIZARD".into()))
        );
        // Tokens are case-sensitive on the wire
        assert!(Command::parse("RPS:WATCH:rock").is_err());
        assert_eq!(
            Command::parse("RPS:RESULT:TIE"),
            Err(TandemError::InvalidOutcome("TIE".into()))
        );
    }

    #[test]
    fn non_utf8_payload_is_rejected() {
        assert_eq!(
            Command::from_bytes(&[0xff, 0xfe]),
            Err(TandemError::InvalidUtf8)
        );
    }

    #[test]
    fn beats_relation_is_a_cycle() {
        for c in Choice::ALL {
            assert_ne!(c.beats(), c);
            assert_eq!(c.beats().beats().beats(), c);
        }
    }

    #[test]
    fn outcome_serde_names() {
        let json = serde_json::to_string(&Outcome::PrimaryWins).unwrap();
        assert_eq!(json, "\"PRIMARY_WINS\"");
        let choice: Choice = serde_json::from_str("\"SCISSORS\"").unwrap();
        assert_eq!(choice, Choice::Scissors);
    }
}
