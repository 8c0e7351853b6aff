//! # tandem-client
//!
//! Runtime for the Tandem rock/paper/scissors protocol.
//!
//! This is the library a presentation layer embeds on each device.
//!
//! ## Features
//!
//! - **Single-writer controllers**: each device's round lives inside one task;
//!   user actions and inbound commands are marshalled onto it
//! - **Fire-and-forget sends**: commands go out on background tasks whose
//!   results never gate game logic
//! - **Channel abstraction**: pluggable [`MessageChannel`] (in-memory link,
//!   mock)
//! - **Pure state machines**: uses tandem-core for all round logic
//!
//! ## Example
//!
//! ```ignore
//! use tandem_client::{spawn_peer, spawn_primary, ControllerOptions, LinkConfig, MemoryChannel};
//! use tandem_types::Choice;
//!
//! let (phone_link, watch_link) = MemoryChannel::pair(LinkConfig::default());
//! let (phone, _phone_events) = spawn_primary(phone_link, ControllerOptions::default());
//! let (watch, _watch_events) = spawn_peer(watch_link, ControllerOptions::default());
//!
//! phone.submit_choice(Choice::Rock)?;
//! watch.submit_choice(Choice::Scissors)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod channel;
pub mod config;
pub mod controller;

pub use channel::{
    broadcast, ChannelError, Inbound, LinkConfig, MemoryChannel, MessageChannel, MockChannel,
    SendReport,
};
pub use config::{ChannelConfig, Config, ConfigError, LoggingConfig, DEFAULT_CONFIG_FILE};
pub use controller::{
    spawn_peer, spawn_primary, Controller, ControllerError, ControllerHandle, ControllerOptions,
    Snapshot,
};
