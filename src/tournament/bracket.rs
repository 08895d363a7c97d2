//! Bracket generation for single elimination, double elimination and
//! round robin formats.
//!
//! Generation is pure: `(players, format) -> Bracket`. Elimination formats
//! get round 1 up front and later rounds are derived from recorded winners;
//! round robin is fully precomputed with the circle/rotation method.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::errors::TournamentError;
use super::models::{PlayerId, TournamentFormat};

/// Minimum roster size for any format.
pub const MIN_PLAYERS: usize = 4;

/// An unstarted match assignment produced by bracket generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPairing {
    /// First player
    pub player1_id: PlayerId,
    /// Second player
    pub player2_id: PlayerId,
    /// Round this pairing belongs to (1-indexed)
    pub round_number: u32,
    /// Position within the round
    pub bracket_position: u32,
}

impl MatchPairing {
    /// True if the given player takes part in this pairing.
    pub fn involves(&self, player: PlayerId) -> bool {
        self.player1_id == player || self.player2_id == player
    }

    /// True if this pairing shares a player with another.
    pub fn conflicts_with(&self, other: &MatchPairing) -> bool {
        self.involves(other.player1_id) || self.involves(other.player2_id)
    }
}

/// One round of a bracket: pairings, auto-advances and recorded winners.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Round {
    /// Round number (1-indexed)
    pub number: u32,
    /// Matches to be played this round
    pub pairings: Vec<MatchPairing>,
    /// Auto-advanced players, keyed by bracket position
    pub byes: Vec<(u32, PlayerId)>,
    /// Winner per bracket position, filled in as results arrive
    pub winners: HashMap<u32, PlayerId>,
}

impl Round {
    /// True once every pairing of this round has a recorded winner.
    pub fn is_complete(&self) -> bool {
        self.winners.len() >= self.pairings.len()
    }

    /// Players moving on from this round: match winners in bracket-position
    /// order, then bye recipients in bracket-position order.
    pub fn advancers(&self) -> Vec<PlayerId> {
        let mut positions: Vec<u32> = self.winners.keys().copied().collect();
        positions.sort_unstable();
        let mut out: Vec<PlayerId> = positions.iter().map(|p| self.winners[p]).collect();
        let mut byes = self.byes.clone();
        byes.sort_unstable_by_key(|(pos, _)| *pos);
        out.extend(byes.into_iter().map(|(_, id)| id));
        out
    }
}

/// The full set of rounds and pairings for a tournament.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bracket {
    /// Rounds in order. Elimination formats grow this as rounds complete.
    pub rounds: Vec<Round>,
    /// Total round count (upper bound for double elimination)
    pub total_rounds: u32,
}

impl Bracket {
    /// Look up a round by number.
    pub fn round(&self, number: u32) -> Option<&Round> {
        self.rounds.iter().find(|r| r.number == number)
    }

    /// Look up a round by number, mutable.
    pub fn round_mut(&mut self, number: u32) -> Option<&mut Round> {
        self.rounds.iter_mut().find(|r| r.number == number)
    }

    /// Position in the next round that a winner at `position` feeds into.
    pub fn next_position(position: u32) -> u32 {
        position / 2
    }
}

/// Generate the bracket for a roster and format.
///
/// # Errors
///
/// Returns [`TournamentError::InsufficientPlayers`] for rosters smaller
/// than [`MIN_PLAYERS`].
pub fn generate(players: &[PlayerId], format: TournamentFormat) -> Result<Bracket, TournamentError> {
    if players.len() < MIN_PLAYERS {
        return Err(TournamentError::InsufficientPlayers {
            needed: MIN_PLAYERS,
            current: players.len(),
        });
    }

    match format {
        TournamentFormat::SingleElimination => Ok(elimination_bracket(players, knockout_rounds(players.len()))),
        TournamentFormat::DoubleElimination => {
            // Winners bracket opens like single elimination; the losers
            // bracket adds rounds, capped by 2*ceil(log2 n) + 1 with the
            // grand final last.
            Ok(elimination_bracket(players, 2 * knockout_rounds(players.len()) + 1))
        }
        TournamentFormat::RoundRobin => Ok(round_robin_bracket(players)),
    }
}

/// Rounds needed to knock a field of `n` down to one: `ceil(log2 n)`.
fn knockout_rounds(n: usize) -> u32 {
    usize::BITS - (n - 1).leading_zeros()
}

/// Round 1 of an elimination bracket. If `n` is not a power of two, the
/// lowest seeds receive byes so the surviving field halves cleanly.
fn elimination_bracket(players: &[PlayerId], total_rounds: u32) -> Bracket {
    let n = players.len();
    let bye_count = n.next_power_of_two() - n;
    let (playing, auto_advanced) = players.split_at(n - bye_count);

    let (pairings, _) = pair_adjacent(playing, 1, 0);
    let first_bye_position = pairings.len() as u32;
    let byes = auto_advanced
        .iter()
        .enumerate()
        .map(|(i, id)| (first_bye_position + i as u32, *id))
        .collect();

    Bracket {
        rounds: vec![Round {
            number: 1,
            pairings,
            byes,
            winners: HashMap::new(),
        }],
        total_rounds,
    }
}

/// All rounds of a round-robin schedule via the circle method: one slot is
/// held fixed and the rest rotate, so each round contains each player at
/// most once. Odd rosters get a phantom slot whose opponent sits out.
fn round_robin_bracket(players: &[PlayerId]) -> Bracket {
    let mut slots: Vec<Option<PlayerId>> = players.iter().copied().map(Some).collect();
    if slots.len() % 2 == 1 {
        slots.push(None);
    }
    let m = slots.len();
    let total_rounds = (m - 1) as u32;

    let mut rounds = Vec::with_capacity(m - 1);
    for number in 1..=total_rounds {
        let mut pairings = Vec::with_capacity(m / 2);
        let mut sitting_out = Vec::new();
        for i in 0..m / 2 {
            match (slots[i], slots[m - 1 - i]) {
                (Some(a), Some(b)) => pairings.push(MatchPairing {
                    player1_id: a,
                    player2_id: b,
                    round_number: number,
                    bracket_position: pairings.len() as u32,
                }),
                (Some(a), None) | (None, Some(a)) => sitting_out.push(a),
                (None, None) => {}
            }
        }
        let byes = sitting_out
            .into_iter()
            .enumerate()
            .map(|(i, id)| (pairings.len() as u32 + i as u32, id))
            .collect();
        rounds.push(Round {
            number,
            pairings,
            byes,
            winners: HashMap::new(),
        });
        slots[1..].rotate_right(1);
    }

    Bracket {
        rounds,
        total_rounds,
    }
}

/// Pair players by adjacent position. An odd trailing player becomes a bye.
/// Positions start at `start_position`.
pub fn pair_adjacent(
    players: &[PlayerId],
    round_number: u32,
    start_position: u32,
) -> (Vec<MatchPairing>, Vec<(u32, PlayerId)>) {
    let mut pairings = Vec::with_capacity(players.len() / 2);
    let mut byes = Vec::new();
    let mut position = start_position;

    let mut chunks = players.chunks_exact(2);
    for pair in &mut chunks {
        pairings.push(MatchPairing {
            player1_id: pair[0],
            player2_id: pair[1],
            round_number,
            bracket_position: position,
        });
        position += 1;
    }
    if let [odd_one_out] = chunks.remainder() {
        byes.push((position, *odd_one_out));
    }

    (pairings, byes)
}
