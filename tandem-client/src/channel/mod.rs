//! Message channel abstraction for Tandem.
//!
//! This module decouples the controllers from whatever actually carries
//! bytes between the phone and the watch.
//!
//! # Design
//!
//! The channel is best-effort and connectionless:
//! - `reachable_peers()` asks discovery who is currently reachable
//! - `send()` hands one envelope to one peer, with no delivery guarantee
//! - `recv()` waits for the next inbound envelope from any peer
//! - `set_listening()` attaches or detaches the inbound listener
//!
//! Envelopes that reach a detached endpoint are dropped, never queued.
//!
//! # Example
//!
//! ```ignore
//! let (phone, watch) = MemoryChannel::pair(LinkConfig::default());
//! let report = broadcast(&phone, &Envelope::command(Command::Reset)).await;
//! let inbound = watch.recv().await?;
//! ```

mod memory;
mod mock;

pub use memory::{LinkConfig, MemoryChannel};
pub use mock::MockChannel;

use async_trait::async_trait;
use tandem_types::{Envelope, PeerId};
use thiserror::Error;

/// Channel errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// Peer is not currently reachable.
    #[error("peer unreachable: {0}")]
    Unreachable(PeerId),

    /// Send failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Discovery could not produce a peer list.
    #[error("discovery failed: {0}")]
    Discovery(String),

    /// Channel closed.
    #[error("channel closed")]
    Closed,
}

/// An envelope plus the peer it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    /// Sending peer.
    pub from: PeerId,
    /// What arrived.
    pub envelope: Envelope,
}

/// Transport-facing side of a device.
///
/// Implementations may deliver out of order, late, twice or not at all.
#[async_trait]
pub trait MessageChannel: Send + Sync + 'static {
    /// Peers currently reachable, as reported by discovery.
    async fn reachable_peers(&self) -> Result<Vec<PeerId>, ChannelError>;

    /// Hand one envelope to one peer.
    ///
    /// `Ok` means the transport accepted it, not that it arrived.
    async fn send(&self, peer: &PeerId, envelope: &Envelope) -> Result<(), ChannelError>;

    /// Wait for the next inbound envelope.
    ///
    /// Returns [`ChannelError::Closed`] once nothing more can ever arrive.
    async fn recv(&self) -> Result<Inbound, ChannelError>;

    /// Attach (`true`) or detach (`false`) the inbound listener.
    fn set_listening(&self, listening: bool);
}

/// Per-peer outcome of a [`broadcast`].
#[derive(Debug, Default)]
pub struct SendReport {
    /// Peers that accepted the envelope.
    pub delivered: Vec<PeerId>,
    /// Peers that refused it, with the reason.
    pub failed: Vec<(PeerId, ChannelError)>,
}

impl SendReport {
    /// Check if no peer accepted the envelope.
    pub fn reached_nobody(&self) -> bool {
        self.delivered.is_empty()
    }
}

/// Send `envelope` to every reachable peer.
///
/// Never fails as a whole: discovery errors and per-peer errors are folded
/// into the report.
pub async fn broadcast<C>(channel: &C, envelope: &Envelope) -> SendReport
where
    C: MessageChannel + ?Sized,
{
    let mut report = SendReport::default();

    let peers = match channel.reachable_peers().await {
        Ok(peers) => peers,
        Err(e) => {
            tracing::warn!("Peer discovery failed: {}", e);
            return report;
        }
    };

    for peer in peers {
        match channel.send(&peer, envelope).await {
            Ok(()) => report.delivered.push(peer),
            Err(e) => report.failed.push((peer, e)),
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_types::Command;

    #[tokio::test]
    async fn broadcast_reaches_every_peer() {
        let channel = MockChannel::with_peers(&["watch-a", "watch-b"]);
        let envelope = Envelope::command(Command::Reset);

        let report = broadcast(&channel, &envelope).await;

        assert_eq!(report.delivered.len(), 2);
        assert!(report.failed.is_empty());
        assert_eq!(channel.sent_to(&PeerId::new("watch-b")), vec![envelope]);
    }

    #[tokio::test]
    async fn broadcast_folds_per_peer_failures() {
        let channel = MockChannel::with_peers(&["watch-a", "watch-b"]);
        channel.fail_next_send("watch-a", "radio off");

        let report = broadcast(&channel, &Envelope::command(Command::Reset)).await;

        assert_eq!(report.delivered, vec![PeerId::new("watch-b")]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, PeerId::new("watch-a"));
    }

    #[tokio::test]
    async fn broadcast_with_no_peers_reaches_nobody() {
        let channel = MockChannel::new();
        let report = broadcast(&channel, &Envelope::command(Command::Reset)).await;
        assert!(report.reached_nobody());
    }

    #[tokio::test]
    async fn broadcast_survives_discovery_failure() {
        let channel = MockChannel::with_peers(&["watch"]);
        channel.fail_next_discovery("bluetooth off");

        let report = broadcast(&channel, &Envelope::command(Command::Reset)).await;

        assert!(report.reached_nobody());
        assert!(report.failed.is_empty());
        assert!(channel.sent_messages().is_empty());
    }
}
