//! Controller - the per-device owner of a round.
//!
//! A [`Controller`] is a task that exclusively owns one role machine (from
//! tandem-core). Everything that can change the round reaches it as a
//! message on a single queue:
//!
//! ```text
//! presentation ──┐
//!                ├──► controller task ──► RoleMachine ──► actions
//! listener task ─┘          │                               │
//!                           ├── Send  ──► send tasks ──► MessageChannel
//!                           └── Emit  ──► GameEvent stream ──► presentation
//! ```
//!
//! The round therefore has exactly one writer and needs no lock. Sends run
//! on their own tasks; their results are logged and otherwise discarded.
//! They are awaited only on shutdown.

use std::sync::Arc;
use tandem_core::{Action, Event, GameEvent, PeerMachine, PrimaryMachine, Role, RoleMachine, Round};
use tandem_types::{Choice, Command, COMMAND_PATH};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{JoinHandle, JoinSet};

use crate::channel::{broadcast, ChannelError, Inbound, MessageChannel};

/// Controller errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    /// The controller task has stopped.
    #[error("controller stopped")]
    Stopped,
}

/// Options for a controller.
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Channel path commands are sent and accepted on.
    pub path: String,
}

impl ControllerOptions {
    /// Use a non-default command path.
    pub fn with_path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            path: COMMAND_PATH.to_string(),
        }
    }
}

/// Observable state of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    /// Role of the device.
    pub role: Role,
    /// Current round.
    pub round: Round,
    /// Current status line.
    pub status: &'static str,
    /// Whether the inbound listener is attached.
    pub attached: bool,
}

enum Input {
    User(Event),
    Inbound(Inbound),
    SetAttached(bool),
    Shutdown(oneshot::Sender<()>),
}

/// The task that owns a role machine.
pub struct Controller<M: RoleMachine, C: MessageChannel> {
    machine: M,
    channel: Arc<C>,
    options: ControllerOptions,
    attached: bool,
    inputs: mpsc::UnboundedReceiver<Input>,
    events: mpsc::UnboundedSender<GameEvent>,
    snapshot: watch::Sender<Snapshot>,
    sends: JoinSet<()>,
    listener: JoinHandle<()>,
}

impl<M: RoleMachine, C: MessageChannel> Controller<M, C> {
    /// Start a controller on the current tokio runtime.
    ///
    /// Returns the handle presentation talks to and the stream of
    /// notifications it renders.
    pub fn spawn(
        machine: M,
        channel: C,
        options: ControllerOptions,
    ) -> (ControllerHandle, mpsc::UnboundedReceiver<GameEvent>) {
        let channel = Arc::new(channel);
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let initial = Snapshot {
            role: M::ROLE,
            round: *machine.round(),
            status: machine.status(),
            attached: true,
        };
        let (snapshot_tx, snapshot_rx) = watch::channel(initial);

        channel.set_listening(true);
        let listener = spawn_listener(Arc::clone(&channel), input_tx.downgrade(), M::ROLE);

        let controller = Self {
            machine,
            channel,
            options,
            attached: true,
            inputs: input_rx,
            events: event_tx,
            snapshot: snapshot_tx,
            sends: JoinSet::new(),
            listener,
        };
        let task = tokio::spawn(controller.run());

        let handle = ControllerHandle {
            role: M::ROLE,
            inputs: input_tx,
            snapshot: snapshot_rx,
            task,
        };
        (handle, event_rx)
    }

    async fn run(mut self) {
        tracing::debug!("{} controller started", M::ROLE);

        loop {
            tokio::select! {
                input = self.inputs.recv() => match input {
                    Some(Input::Shutdown(ack)) => {
                        self.stop().await;
                        let _ = ack.send(());
                        return;
                    }
                    Some(input) => self.handle(input),
                    None => break,
                },
                Some(joined) = self.sends.join_next(), if !self.sends.is_empty() => {
                    if let Err(e) = joined {
                        tracing::warn!("{} send task failed: {}", M::ROLE, e);
                    }
                }
            }
        }

        self.stop().await;
    }

    async fn stop(&mut self) {
        self.listener.abort();
        self.channel.set_listening(false);
        while self.sends.join_next().await.is_some() {}
        tracing::debug!("{} controller stopped", M::ROLE);
    }

    fn handle(&mut self, input: Input) {
        match input {
            Input::User(event) => self.apply(event),
            Input::Inbound(inbound) => self.on_inbound(inbound),
            Input::SetAttached(attached) => {
                if self.attached != attached {
                    tracing::debug!(
                        "{} listener {}",
                        M::ROLE,
                        if attached { "attached" } else { "detached" }
                    );
                }
                self.attached = attached;
                self.channel.set_listening(attached);
                self.publish();
            }
            Input::Shutdown(_) => {}
        }
    }

    fn on_inbound(&mut self, inbound: Inbound) {
        let Inbound { from, envelope } = inbound;

        if !self.attached {
            tracing::debug!("{} detached, dropping message from {}", M::ROLE, from);
            return;
        }
        if !envelope.is_on(&self.options.path) {
            tracing::debug!("{} ignoring message on path {}", M::ROLE, envelope.path);
            return;
        }

        let event = match envelope.decode_on(&self.options.path) {
            Ok(command) => {
                tracing::debug!("{} received {} from {}", M::ROLE, command, from);
                Event::CommandReceived(command)
            }
            Err(e) => {
                tracing::warn!("{} unhandled command from {}: {}", M::ROLE, from, e);
                Event::UndecodableReceived(envelope.text_lossy())
            }
        };
        self.apply(event);
    }

    fn apply(&mut self, event: Event) {
        for action in self.machine.on_event(event) {
            match action {
                Action::Send(command) => self.dispatch(command),
                Action::Emit(event) => {
                    if let GameEvent::ResultAvailable(outcome) = &event {
                        tracing::info!("{} round resolved: {}", M::ROLE, outcome);
                    }
                    // Presentation may have gone away; the round carries on.
                    let _ = self.events.send(event);
                }
            }
        }
        self.publish();
    }

    fn dispatch(&mut self, command: Command) {
        if command == Command::Reset {
            tracing::info!("{} resetting round", M::ROLE);
        }

        let channel = Arc::clone(&self.channel);
        let envelope = tandem_types::Envelope::command_on(&self.options.path, command);
        let role = M::ROLE;

        self.sends.spawn(async move {
            let report = broadcast(channel.as_ref(), &envelope).await;
            for (peer, e) in &report.failed {
                tracing::warn!("{} failed to send {} to {}: {}", role, command, peer, e);
            }
            if report.reached_nobody() {
                tracing::debug!("{} {} reached no peer", role, command);
            }
        });
    }

    fn publish(&self) {
        let next = Snapshot {
            role: M::ROLE,
            round: *self.machine.round(),
            status: self.machine.status(),
            attached: self.attached,
        };
        self.snapshot.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

fn spawn_listener<C: MessageChannel>(
    channel: Arc<C>,
    inputs: mpsc::WeakUnboundedSender<Input>,
    role: Role,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match channel.recv().await {
                Ok(inbound) => {
                    // Only the handle keeps the controller alive.
                    let Some(inputs) = inputs.upgrade() else {
                        break;
                    };
                    if inputs.send(Input::Inbound(inbound)).is_err() {
                        break;
                    }
                }
                Err(ChannelError::Closed) => {
                    tracing::debug!("{} channel closed", role);
                    break;
                }
                Err(e) => {
                    tracing::warn!("{} receive error: {}", role, e);
                }
            }
        }
    })
}

/// Handle presentation uses to drive a controller.
#[derive(Debug)]
pub struct ControllerHandle {
    role: Role,
    inputs: mpsc::UnboundedSender<Input>,
    snapshot: watch::Receiver<Snapshot>,
    task: JoinHandle<()>,
}

impl std::fmt::Debug for Input {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Input::User(event) => f.debug_tuple("User").field(event).finish(),
            Input::Inbound(inbound) => f.debug_tuple("Inbound").field(inbound).finish(),
            Input::SetAttached(attached) => f.debug_tuple("SetAttached").field(attached).finish(),
            Input::Shutdown(_) => f.write_str("Shutdown"),
        }
    }
}

impl ControllerHandle {
    fn send(&self, input: Input) -> Result<(), ControllerError> {
        self.inputs.send(input).map_err(|_| ControllerError::Stopped)
    }

    /// Role of the controlled device.
    pub fn role(&self) -> Role {
        self.role
    }

    /// The local user picked a choice.
    pub fn submit_choice(&self, choice: Choice) -> Result<(), ControllerError> {
        self.send(Input::User(Event::ChoiceSubmitted(choice)))
    }

    /// The local user asked to abandon the round.
    pub fn request_reset(&self) -> Result<(), ControllerError> {
        self.send(Input::User(Event::ResetRequested))
    }

    /// The local user asked for another game.
    pub fn request_play_again(&self) -> Result<(), ControllerError> {
        self.send(Input::User(Event::PlayAgainRequested))
    }

    /// Detach the listener (device went to the background).
    pub fn pause(&self) -> Result<(), ControllerError> {
        self.send(Input::SetAttached(false))
    }

    /// Reattach the listener (device came back to the foreground).
    pub fn resume(&self) -> Result<(), ControllerError> {
        self.send(Input::SetAttached(true))
    }

    /// Latest published state.
    pub fn snapshot(&self) -> Snapshot {
        *self.snapshot.borrow()
    }

    /// Latest published round.
    pub fn round(&self) -> Round {
        self.snapshot().round
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot.clone()
    }

    /// Wait until the published state satisfies `predicate`.
    pub async fn wait_for<F>(&self, mut predicate: F) -> Result<Snapshot, ControllerError>
    where
        F: FnMut(&Snapshot) -> bool,
    {
        let mut rx = self.snapshot.clone();
        let snapshot = rx
            .wait_for(|s| predicate(s))
            .await
            .map_err(|_| ControllerError::Stopped)?;
        Ok(*snapshot)
    }

    /// Stop the controller, waiting for in-flight sends to finish.
    pub async fn shutdown(self) -> Result<(), ControllerError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.send(Input::Shutdown(ack_tx))?;
        let _ = ack_rx.await;
        self.task.await.map_err(|_| ControllerError::Stopped)
    }
}

/// Start a primary (phone) controller.
pub fn spawn_primary<C: MessageChannel>(
    channel: C,
    options: ControllerOptions,
) -> (ControllerHandle, mpsc::UnboundedReceiver<GameEvent>) {
    Controller::spawn(PrimaryMachine::new(), channel, options)
}

/// Start a peer (watch) controller.
pub fn spawn_peer<C: MessageChannel>(
    channel: C,
    options: ControllerOptions,
) -> (ControllerHandle, mpsc::UnboundedReceiver<GameEvent>) {
    Controller::spawn(PeerMachine::new(), channel, options)
}
