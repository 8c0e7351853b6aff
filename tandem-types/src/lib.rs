//! # tandem-types
//!
//! Wire format types for the Tandem rock/paper/scissors protocol.
//!
//! This crate provides the foundational types shared by every Tandem crate:
//! - [`Choice`], [`Outcome`] - Game values
//! - [`Command`] - Protocol commands and their colon-delimited text encoding
//! - [`Envelope`] - Channel path plus opaque payload
//! - [`PeerId`] - Identity of a reachable device
//! - [`TandemError`] - Error types

#![warn(missing_docs)]
#![warn(clippy::all)]

mod envelope;
mod error;
mod ids;
mod messages;

pub use envelope::{Envelope, COMMAND_PATH};
pub use error::TandemError;
pub use ids::PeerId;
pub use messages::{Choice, Command, Outcome, COMMAND_PREFIX};
