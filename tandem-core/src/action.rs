//! Inputs, outputs and the role seam shared by both machines.

use std::fmt;

use serde::Serialize;
use tandem_types::{Command, Outcome};

use crate::Round;

/// Which side of the protocol a device plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Phone: resolves rounds and broadcasts results.
    Primary,
    /// Watch: submits a choice and displays the announced result.
    Peer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Primary => f.pad("primary"),
            Role::Peer => f.pad("peer"),
        }
    }
}

/// Where a reset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOrigin {
    /// The local user asked for it; the counterpart must be told.
    Local,
    /// A `RESET` command arrived; nothing is echoed back.
    Remote,
}

/// Everything that can happen to a role machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Local user picked a choice.
    ChoiceSubmitted(tandem_types::Choice),
    /// Local user asked to abandon the round.
    ResetRequested,
    /// Local user asked for another game after a result.
    PlayAgainRequested,
    /// A well-formed command arrived from the counterpart.
    CommandReceived(Command),
    /// Text on the command path that did not decode.
    UndecodableReceived(String),
}

/// Actions to be executed by the runtime.
///
/// These are instructions, not side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Send a command to every reachable peer, best-effort.
    Send(Command),
    /// Notify presentation.
    Emit(GameEvent),
}

/// Notifications delivered to presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// Status line changed.
    StatusChanged(String),
    /// An outcome is known; presentation should offer "play again".
    ResultAvailable(Outcome),
    /// Choice buttons became enabled or disabled.
    InputEnabledChanged(bool),
    /// A command this role does not consume, raw text for diagnostics.
    Unhandled(String),
}

/// A role state machine: owns one [`Round`] and reacts to [`Event`]s.
pub trait RoleMachine: Send + 'static {
    /// The role this machine plays.
    const ROLE: Role;

    /// Current round state.
    fn round(&self) -> &Round;

    /// Current status line.
    fn status(&self) -> &'static str;

    /// Process an event and return the actions to execute.
    fn on_event(&mut self, event: Event) -> Vec<Action>;
}

/// Actions that follow a round reset, shared by both roles.
pub(crate) fn reset_actions(
    round: &mut Round,
    origin: ResetOrigin,
    idle_status: &str,
) -> Vec<Action> {
    let was_accepting = round.accepting_input;
    round.reset();

    let mut actions = Vec::with_capacity(3);
    if origin == ResetOrigin::Local {
        actions.push(Action::Send(Command::Reset));
    }
    if !was_accepting {
        actions.push(Action::Emit(GameEvent::InputEnabledChanged(true)));
    }
    actions.push(Action::Emit(GameEvent::StatusChanged(idle_status.to_string())));
    actions
}
