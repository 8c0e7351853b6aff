//! CLI command implementations.

pub mod config;
pub mod decode;
pub mod resolve;
pub mod simulate;

use tandem_types::Choice;

/// Parse a choice argument, ignoring case.
pub fn parse_choice(arg: &str) -> Result<Choice, String> {
    arg.trim()
        .to_ascii_uppercase()
        .parse()
        .map_err(|_| format!("expected rock, paper or scissors, got {:?}", arg))
}
