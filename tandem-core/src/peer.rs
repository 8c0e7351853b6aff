//! Peer (watch) state machine.

use tandem_types::{Choice, Command, Outcome};

use crate::action::{reset_actions, Action, Event, GameEvent, ResetOrigin, Role, RoleMachine};
use crate::{status, Round};

/// Peer role machine.
///
/// Submits a choice and reflects whatever result the primary announces. It
/// never computes an outcome and never learns the primary's choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerMachine {
    round: Round,
    status: &'static str,
}

impl PeerMachine {
    /// Create a machine with a fresh round.
    pub fn new() -> Self {
        Self {
            round: Round::new(),
            status: status::PEER_IDLE,
        }
    }

    /// The local user picked `choice`. Ignored unless accepting input.
    pub fn submit_choice(&mut self, choice: Choice) -> Vec<Action> {
        if !self.round.accepting_input {
            return vec![];
        }

        self.round.local_choice = Some(choice);
        self.round.accepting_input = false;
        self.status = status::PEER_SENT;

        vec![
            Action::Emit(GameEvent::InputEnabledChanged(false)),
            Action::Emit(GameEvent::StatusChanged(self.status.to_string())),
            Action::Send(Command::WatchChoice(choice)),
        ]
    }

    /// A `RESULT` arrived. Applied whatever the local phase.
    pub fn on_result(&mut self, outcome: Outcome) -> Vec<Action> {
        if self.round.outcome == Some(outcome) {
            return vec![];
        }

        self.round.outcome = Some(outcome);
        self.status = status::result_text(outcome);

        let mut actions = Vec::with_capacity(3);
        if self.round.accepting_input {
            self.round.accepting_input = false;
            actions.push(Action::Emit(GameEvent::InputEnabledChanged(false)));
        }
        actions.push(Action::Emit(GameEvent::StatusChanged(self.status.to_string())));
        actions.push(Action::Emit(GameEvent::ResultAvailable(outcome)));
        actions
    }

    /// Clear the round. Local resets are propagated with `RESET`.
    pub fn on_reset_requested(&mut self, origin: ResetOrigin) -> Vec<Action> {
        self.status = status::PEER_IDLE;
        reset_actions(&mut self.round, origin, self.status)
    }

    fn on_command(&mut self, command: Command) -> Vec<Action> {
        match command {
            Command::Result(outcome) => self.on_result(outcome),
            Command::Reset => self.on_reset_requested(ResetOrigin::Remote),
            // Informational; showing it would spoil the round.
            Command::PhoneChoice(_) => vec![],
            Command::WatchChoice(_) => vec![Action::Emit(GameEvent::Unhandled(command.encode()))],
        }
    }
}

impl Default for PeerMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl RoleMachine for PeerMachine {
    const ROLE: Role = Role::Peer;

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
