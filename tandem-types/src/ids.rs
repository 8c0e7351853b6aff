//! Identity types for Tandem.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a device reachable over the message channel.
///
/// Discovery hands these out; the core treats them as opaque labels.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeerId(String);

impl PeerId {
    /// Create a PeerId from a label supplied by discovery.
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Create a new random PeerId (8 random bytes, hex encoded).
    pub fn random() -> Self {
        let mut bytes = [0u8; 8];
        if getrandom::getrandom(&mut bytes).is_err() {
            bytes = [0u8; 8];
        }
        Self(hex::encode(bytes))
    }

    /// Get the label as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PeerId({})", self.0)
    }
}

impl From<&str> for PeerId {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_peer_ids_differ() {
        let a = PeerId::random();
        let b = PeerId::random();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 16);
    }

    #[test]
    fn display_is_raw_label() {
        let id = PeerId::new("watch-1");
        assert_eq!(id.to_string(), "watch-1");
        assert_eq!(format!("{:?}", id), "PeerId(watch-1)");
    }

    #[test]
    fn serde_is_transparent_string() {
        let id = PeerId::new("phone");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"phone\"");
    }
}
