//! In-memory link between two endpoints.
//!
//! Stands in for the wearable transport in simulations and end-to-end tests.
//! The link can lose messages and delay each one independently, which also
//! reorders them.

use super::{ChannelError, Inbound, MessageChannel};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tandem_types::{Envelope, PeerId};
use tokio::sync::mpsc;

/// Behaviour of an in-memory link.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkConfig {
    /// Probability in `[0, 1]` that a message is silently lost.
    pub loss_rate: f64,
    /// Upper bound of the random per-message delay (zero = immediate).
    pub max_delay: Duration,
    /// RNG seed for reproducible runs.
    pub seed: Option<u64>,
}

impl LinkConfig {
    /// A link that delivers everything immediately.
    pub fn lossless() -> Self {
        Self {
            loss_rate: 0.0,
            max_delay: Duration::ZERO,
            seed: None,
        }
    }

    /// Set the loss probability.
    pub fn with_loss(mut self, loss_rate: f64) -> Self {
        self.loss_rate = loss_rate;
        self
    }

    /// Set the maximum per-message delay.
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Seed the RNG.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::lossless()
    }
}

#[derive(Debug)]
struct Endpoint {
    id: PeerId,
    listening: AtomicBool,
    inbox: mpsc::UnboundedSender<Inbound>,
}

#[derive(Debug)]
struct LinkState {
    up: AtomicBool,
    loss_rate: f64,
    max_delay: Duration,
    rng: Mutex<StdRng>,
    lost: AtomicU64,
    dropped_detached: AtomicU64,
}

impl LinkState {
    /// Decide the fate of one message: `None` if lost, otherwise its delay.
    fn roll(&self) -> Option<Duration> {
        let mut rng = self.rng.lock().unwrap_or_else(|p| p.into_inner());
        if self.loss_rate > 0.0 && rng.gen_bool(self.loss_rate) {
            return None;
        }
        let max_ms = self.max_delay.as_millis() as u64;
        if max_ms == 0 {
            Some(Duration::ZERO)
        } else {
            Some(Duration::from_millis(rng.gen_range(0..=max_ms)))
        }
    }

    fn deliver(&self, target: &Endpoint, inbound: Inbound) {
        if !target.listening.load(Ordering::SeqCst) {
            self.dropped_detached.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("{} is detached, dropping message from {}", target.id, inbound.from);
            return;
        }
        if target.inbox.send(inbound).is_err() {
            tracing::debug!("{} inbox is gone", target.id);
        }
    }
}

/// One end of an in-memory link.
#[derive(Debug, Clone)]
pub struct MemoryChannel {
    local: Arc<Endpoint>,
    remote: Arc<Endpoint>,
    inbox: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<Inbound>>>,
    link: Arc<LinkState>,
}

impl MemoryChannel {
    /// Create a linked `("phone", "watch")` pair.
    pub fn pair(config: LinkConfig) -> (Self, Self) {
        Self::pair_named(config, "phone", "watch")
    }

    /// Create a linked pair with explicit peer labels.
    pub fn pair_named(config: LinkConfig, a: &str, b: &str) -> (Self, Self) {
        let (a_tx, a_rx) = mpsc::unbounded_channel();
        let (b_tx, b_rx) = mpsc::unbounded_channel();

        let a_end = Arc::new(Endpoint {
            id: PeerId::new(a),
            listening: AtomicBool::new(false),
            inbox: a_tx,
        });
        let b_end = Arc::new(Endpoint {
            id: PeerId::new(b),
            listening: AtomicBool::new(false),
            inbox: b_tx,
        });

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let link = Arc::new(LinkState {
            up: AtomicBool::new(true),
            loss_rate: config.loss_rate.clamp(0.0, 1.0),
            max_delay: config.max_delay,
            rng: Mutex::new(rng),
            lost: AtomicU64::new(0),
            dropped_detached: AtomicU64::new(0),
        });

        let first = Self {
            local: Arc::clone(&a_end),
            remote: Arc::clone(&b_end),
            inbox: Arc::new(tokio::sync::Mutex::new(a_rx)),
            link: Arc::clone(&link),
        };
        let second = Self {
            local: b_end,
            remote: a_end,
            inbox: Arc::new(tokio::sync::Mutex::new(b_rx)),
            link,
        };
        (first, second)
    }

    /// This endpoint's id.
    pub fn id(&self) -> &PeerId {
        &self.local.id
    }

    /// The other endpoint's id.
    pub fn remote_id(&self) -> &PeerId {
        &self.remote.id
    }

    /// Bring the link up or down for both ends.
    ///
    /// While down, discovery reports no peers and sends fail as unreachable.
    pub fn set_link_up(&self, up: bool) {
        self.link.up.store(up, Ordering::SeqCst);
    }

    /// Messages the link has silently lost so far (both directions).
    pub fn lost_count(&self) -> u64 {
        self.link.lost.load(Ordering::Relaxed)
    }

    /// Messages dropped at a detached endpoint so far (both directions).
    pub fn dropped_while_detached(&self) -> u64 {
        self.link.dropped_detached.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl MessageChannel for MemoryChannel {
    async fn reachable_peers(&self) -> Result<Vec<PeerId>, ChannelError> {
        if self.link.up.load(Ordering::SeqCst) {
            Ok(vec![self.remote.id.clone()])
        } else {
            Ok(vec![])
        }
    }

    async fn send(&self, peer: &PeerId, envelope: &Envelope) -> Result<(), ChannelError> {
        if *peer != self.remote.id || !self.link.up.load(Ordering::SeqCst) {
            return Err(ChannelError::Unreachable(peer.clone()));
        }

        let delay = match self.link.roll() {
            Some(delay) => delay,
            None => {
                self.link.lost.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Link lost message {} -> {}", self.local.id, peer);
                return Ok(());
            }
        };

        let inbound = Inbound {
            from: self.local.id.clone(),
            envelope: envelope.clone(),
        };

        if delay.is_zero() {
            self.link.deliver(&self.remote, inbound);
        } else {
            let remote = Arc::clone(&self.remote);
            let link = Arc::clone(&self.link);
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                link.deliver(&remote, inbound);
            });
        }
        Ok(())
    }

    async fn recv(&self) -> Result<Inbound, ChannelError> {
        let mut inbox = self.inbox.lock().await;
        inbox.recv().await.ok_or(ChannelError::Closed)
    }

    fn set_listening(&self, listening: bool) {
        self.local.listening.store(listening, Ordering::SeqCst);
    }
}
