//! # tandem-core
//!
//! Pure round logic for Tandem (no I/O, instant tests).
//!
//! This crate implements the two role state machines and the resolution
//! rule without any channel or runtime code.
//!
//! ## Design Philosophy
//!
//! The primary and the peer are **distinct** machines that share a [`Round`]
//! and the [`resolve`] function. Only the primary ever computes an outcome;
//! the peer learns it from a `RESULT` command.
//!
//! Every machine method takes an input and returns a list of [`Action`]s.
//! Nothing is sent or rendered here. `tandem-client` interprets the actions
//! (dispatching sends, forwarding [`GameEvent`]s to presentation).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod action;
pub mod peer;
pub mod primary;
pub mod round;
pub mod rules;
pub mod status;

pub use action::{Action, Event, GameEvent, ResetOrigin, Role, RoleMachine};
pub use peer::PeerMachine;
pub use primary::PrimaryMachine;
pub use round::Round;
pub use rules::resolve;
