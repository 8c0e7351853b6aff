//! Status lines shown by presentation.

use tandem_types::Outcome;

/// Primary, fresh round: nothing from the watch yet.
pub const PRIMARY_IDLE: &str = "Waiting for the watch…";
/// Primary has chosen and waits for the watch's choice.
pub const PRIMARY_CALCULATING: &str = "Calculating winner…";
/// Watch's choice arrived before the phone chose.
pub const PRIMARY_YOUR_TURN: &str = "Now choose on the phone…";
/// Peer, fresh round.
pub const PEER_IDLE: &str = "";
/// Peer has sent its choice.
pub const PEER_SENT: &str = "Sent…";

/// Status line announcing an outcome.
pub fn result_text(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::PrimaryWins => "Winner: Phone",
        Outcome::PeerWins => "Winner: Watch",
        Outcome::Draw => "Draw",
    }
}
