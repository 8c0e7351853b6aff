//! The resolution rule.

use tandem_types::{Choice, Outcome};

/// Compute the outcome of a round from the primary's and the peer's choice.
///
/// Equal choices draw. Otherwise the side whose choice beats the other's wins
/// (`ROCK` beats `SCISSORS`, `PAPER` beats `ROCK`, `SCISSORS` beats `PAPER`).
pub fn resolve(primary: Choice, peer: Choice) -> Outcome {
    if primary == peer {
        Outcome::Draw
    } else if primary.beats() == peer {
        Outcome::PrimaryWins
    } else {
        Outcome::PeerWins
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_iff_equal() {
        for a in Choice::ALL {
            for b in Choice::ALL {
                assert_eq!(resolve(a, b) == Outcome::Draw, a == b, "{a} vs {b}");
            }
        }
    }

    #[test]
    fn relation_is_antisymmetric() {
        for a in Choice::ALL {
            for b in Choice::ALL {
                if a == b {
                    continue;
                }
                let forward = resolve(a, b);
                let backward = resolve(b, a);
                assert_ne!(forward, Outcome::Draw);
                assert_ne!(forward, backward, "{a} vs {b}");
            }
        }
    }

    #[test]
    fn fixed_precedence() {
        assert_eq!(resolve(Choice::Rock, Choice::Scissors), Outcome::PrimaryWins);
        assert_eq!(resolve(Choice::Paper, Choice::Rock), Outcome::PrimaryWins);
        assert_eq!(resolve(Choice::Scissors, Choice::Paper), Outcome::PrimaryWins);
        assert_eq!(resolve(Choice::Scissors, Choice::Rock), Outcome::PeerWins);
        assert_eq!(resolve(Choice::Rock, Choice::Paper), Outcome::PeerWins);
        assert_eq!(resolve(Choice::Paper, Choice::Scissors), Outcome::PeerWins);
    }
}
