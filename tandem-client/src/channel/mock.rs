//! Mock channel for testing.
//!
//! Records outbound envelopes, lets tests inject inbound ones and forces
//! discovery or per-peer send failures.

use super::{ChannelError, Inbound, MessageChannel};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tandem_types::{Command, Envelope, PeerId, COMMAND_PATH};
use tokio::sync::mpsc;

/// Mock channel for testing.
///
/// Clones share state, so a test can keep one clone while a controller owns
/// another.
#[derive(Debug, Clone)]
pub struct MockChannel {
    inner: Arc<Mutex<MockChannelInner>>,
    inbound_rx: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<Inbound>>>,
}

#[derive(Debug)]
struct MockChannelInner {
    peers: Vec<PeerId>,
    listening: bool,
    sent_messages: Vec<(PeerId, Envelope)>,
    dropped_while_detached: usize,
    inbound_tx: Option<mpsc::UnboundedSender<Inbound>>,
    fail_next_send: HashMap<PeerId, String>,
    fail_next_discovery: Option<String>,
}

impl MockChannel {
    /// Create a mock with no reachable peers.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            inner: Arc::new(Mutex::new(MockChannelInner {
                peers: Vec::new(),
                listening: false,
                sent_messages: Vec::new(),
                dropped_while_detached: 0,
                inbound_tx: Some(tx),
                fail_next_send: HashMap::new(),
                fail_next_discovery: None,
            })),
            inbound_rx: Arc::new(tokio::sync::Mutex::new(rx)),
        }
    }

    /// Create a mock with the given reachable peers.
    pub fn with_peers(labels: &[&str]) -> Self {
        let channel = Self::new();
        for label in labels {
            channel.add_peer(label);
        }
        channel
    }

    fn lock(&self) -> MutexGuard<'_, MockChannelInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make a peer reachable.
    pub fn add_peer(&self, label: &str) {
        self.lock().peers.push(PeerId::new(label));
    }

    /// Make a peer unreachable.
    pub fn remove_peer(&self, label: &str) {
        self.lock().peers.retain(|p| p.as_str() != label);
    }

    /// Deliver an envelope as if `from` had sent it.
    ///
    /// Returns `false` if the listener is detached and the envelope was dropped.
    pub fn inject(&self, from: &str, envelope: Envelope) -> bool {
        let mut inner = self.lock();
        if !inner.listening {
            inner.dropped_while_detached += 1;
            return false;
        }
        let inbound = Inbound {
            from: PeerId::new(from),
            envelope,
        };
        match &inner.inbound_tx {
            Some(tx) => tx.send(inbound).is_ok(),
            None => false,
        }
    }

    /// Deliver raw text on the command path.
    pub fn inject_text(&self, from: &str, text: &str) -> bool {
        self.inject(from, Envelope::new(COMMAND_PATH, text.as_bytes().to_vec()))
    }

    /// Deliver a command on the command path.
    pub fn inject_command(&self, from: &str, command: Command) -> bool {
        self.inject(from, Envelope::command(command))
    }

    /// Get all (peer, envelope) pairs that were sent.
    pub fn sent_messages(&self) -> Vec<(PeerId, Envelope)> {
        self.lock().sent_messages.clone()
    }

    /// Get the envelopes sent to one peer.
    pub fn sent_to(&self, peer: &PeerId) -> Vec<Envelope> {
        self.lock()
            .sent_messages
            .iter()
            .filter(|(p, _)| p == peer)
            .map(|(_, e)| e.clone())
            .collect()
    }

    /// Get every sent envelope that decodes as a command, in send order.
    pub fn sent_commands(&self) -> Vec<Command> {
        self.lock()
            .sent_messages
            .iter()
            .filter_map(|(_, e)| e.decode_on(COMMAND_PATH).ok())
            .collect()
    }

    /// Number of injected envelopes dropped because the listener was detached.
    pub fn dropped_while_detached(&self) -> usize {
        self.lock().dropped_while_detached
    }

    /// Check if the listener is attached.
    pub fn is_listening(&self) -> bool {
        self.lock().listening
    }

    /// Cause the next send() to `peer` to fail with the given error.
    pub fn fail_next_send(&self, peer: &str, error: &str) {
        self.lock()
            .fail_next_send
            .insert(PeerId::new(peer), error.to_string());
    }

    /// Cause the next reachable_peers() to fail with the given error.
    pub fn fail_next_discovery(&self, error: &str) {
        self.lock().fail_next_discovery = Some(error.to_string());
    }

    /// Close the inbound side; pending and future recv() calls return Closed.
    pub fn close(&self) {
        self.lock().inbound_tx = None;
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageChannel for MockChannel {
    async fn reachable_peers(&self) -> Result<Vec<PeerId>, ChannelError> {
        let mut inner = self.lock();
        if let Some(error) = inner.fail_next_discovery.take() {
            return Err(ChannelError::Discovery(error));
        }
        Ok(inner.peers.clone())
    }

    async fn send(&self, peer: &PeerId, envelope: &Envelope) -> Result<(), ChannelError> {
        let mut inner = self.lock();

        if !inner.peers.contains(peer) {
            return Err(ChannelError::Unreachable(peer.clone()));
        }

        // Check for forced failure
        if let Some(error) = inner.fail_next_send.remove(peer) {
            return Err(ChannelError::SendFailed(error));
        }

        inner.sent_messages.push((peer.clone(), envelope.clone()));
        Ok(())
    }

    async fn recv(&self) -> Result<Inbound, ChannelError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await.ok_or(ChannelError::Closed)
    }

    fn set_listening(&self, listening: bool) {
        self.lock().listening = listening;
    }
}
