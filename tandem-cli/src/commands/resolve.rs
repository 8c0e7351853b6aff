//! Compute an outcome offline.

use tandem_core::resolve;
use tandem_types::{Choice, Command};

/// Describe the outcome of `primary` against `peer`.
pub fn describe(primary: Choice, peer: Choice) -> String {
    let outcome = resolve(primary, peer);
    format!(
        "phone {} vs watch {}: {} ({})",
        primary,
        peer,
        outcome,
        Command::Result(outcome)
    )
}

/// Run the resolve command.
pub fn run(primary: Choice, peer: Choice) {
    println!("{}", describe(primary, peer));
}
