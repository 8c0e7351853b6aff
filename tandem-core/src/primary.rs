//! Primary (phone) state machine.
//!
//! The primary is the single source of truth for a round's outcome. It
//! collects its own user's choice and the peer's `WATCH_CHOICE`, resolves once
//! both are known, and broadcasts `RESULT`.

use tandem_types::{Choice, Command};

use crate::action::{reset_actions, Action, Event, GameEvent, ResetOrigin, Role, RoleMachine};
use crate::{resolve, status, Round};

/// Primary role machine - NO I/O, just state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryMachine {
    round: Round,
    status: &'static str,
}

impl PrimaryMachine {
    /// Create a machine with a fresh round.
    pub fn new() -> Self {
        Self {
            round: Round::new(),
            status: status::PRIMARY_IDLE,
        }
    }

    /// The local user picked `choice`.
    ///
    /// Ignored unless the round is accepting input. Announces the choice to
    /// the peer (informational only) and resolves if the peer already chose.
    pub fn submit_choice(&mut self, choice: Choice) -> Vec<Action> {
        if !self.round.accepting_input {
            return vec![];
        }

        self.round.local_choice = Some(choice);
        self.round.accepting_input = false;
        self.status = status::PRIMARY_CALCULATING;

        let mut actions = vec![
            Action::Emit(GameEvent::InputEnabledChanged(false)),
            Action::Emit(GameEvent::StatusChanged(self.status.to_string())),
            Action::Send(Command::PhoneChoice(choice)),
        ];
        actions.extend(self.resolve());
        actions
    }

    /// The peer's `WATCH_CHOICE` arrived.
    ///
    /// The first peer choice of a round sticks; repeats are no-ops.
    pub fn on_peer_choice(&mut self, choice: Choice) -> Vec<Action> {
        if self.round.remote_choice.is_some() {
            return vec![];
        }
        self.round.remote_choice = Some(choice);

        let mut actions = Vec::new();
        if self.round.local_choice.is_none() {
            if !self.round.accepting_input {
                self.round.accepting_input = true;
                actions.push(Action::Emit(GameEvent::InputEnabledChanged(true)));
            }
            self.status = status::PRIMARY_YOUR_TURN;
            actions.push(Action::Emit(GameEvent::StatusChanged(
                self.status.to_string(),
            )));
        }
        actions.extend(self.resolve());
        actions
    }

    /// Clear the round. Local resets are propagated with `RESET`.
    pub fn on_reset_requested(&mut self, origin: ResetOrigin) -> Vec<Action> {
        self.status = status::PRIMARY_IDLE;
        reset_actions(&mut self.round, origin, self.status)
    }

    /// Resolve once both choices are known and no outcome exists yet.
    fn resolve(&mut self) -> Vec<Action> {
        let (local, remote) = match (self.round.local_choice, self.round.remote_choice) {
            (Some(local), Some(remote)) if self.round.outcome.is_none() => (local, remote),
            _ => return vec![],
        };

        let outcome = resolve(local, remote);
        self.round.outcome = Some(outcome);
        self.round.accepting_input = false;
        self.status = status::result_text(outcome);

        vec![
            Action::Emit(GameEvent::StatusChanged(self.status.to_string())),
            Action::Emit(GameEvent::ResultAvailable(outcome)),
            Action::Send(Command::Result(outcome)),
        ]
    }

    fn on_command(&mut self, command: Command) -> Vec<Action> {
        match command {
            Command::WatchChoice(choice) => self.on_peer_choice(choice),
            Command::Reset => self.on_reset_requested(ResetOrigin::Remote),
            // Only a primary sends these; another phone is not our peer.
            Command::PhoneChoice(_) | Command::Result(_) => {
                vec![Action::Emit(GameEvent::Unhandled(command.encode()))]
            }
        }
    }
}

impl Default for PrimaryMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl RoleMachine for PrimaryMachine {
    const ROLE: Role = Role::Primary;

    fn round(&self) -> &Round {
        &self.round
    }

    fn status(&self) -> &'static str {
        self.status
    }

    fn on_event(&mut self, event: Event) -> Vec<Action> {
        match event {
            Event::ChoiceSubmitted(choice) => self.submit_choice(choice),
            Event::ResetRequested | Event::PlayAgainRequested => {
                self.on_reset_requested(ResetOrigin::Local)
            }
            Event::CommandReceived(command) => self.on_command(command),
            Event::UndecodableReceived(raw) => vec![Action::Emit(GameEvent::Unhandled(raw))],
        }
    }
}
