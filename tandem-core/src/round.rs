//! Per-device round state.

use serde::Serialize;
use tandem_types::{Choice, Outcome};

/// One play of rock/paper/scissors as seen by one device.
///
/// Each device owns exactly one `Round`. It is only ever mutated through the
/// role machine that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Round {
    /// This device's choice, `None` until submitted.
    pub local_choice: Option<Choice>,
    /// The counterpart's choice. Only the primary ever fills this in.
    pub remote_choice: Option<Choice>,
    /// Resolved outcome, `None` until known.
    pub outcome: Option<Outcome>,
    /// Whether a new choice may be submitted.
    pub accepting_input: bool,
}

impl Round {
    /// A fresh round: nothing chosen, input open.
    pub fn new() -> Self {
        Self {
            local_choice: None,
            remote_choice: None,
            outcome: None,
            accepting_input: true,
        }
    }

    /// Return to the initial state, whatever the current phase.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Check if an outcome is known.
    pub fn is_resolved(&self) -> bool {
        self.outcome.is_some()
    }

    /// Check if this round is in its initial state.
    pub fn is_initial(&self) -> bool {
        *self == Self::new()
    }
}

impl Default for Round {
    fn default() -> Self {
        Self::new()
    }
}
