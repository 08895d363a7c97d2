//! Per-tournament match queue and concurrency-aware selection.
//!
//! Dispatch is a single greedy pass: walk the queue in order, pick pairings
//! whose players are neither busy nor eliminated, stop at the concurrency
//! cap. Selected pairings are removed; the remainder keeps its order.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::tournament::bracket::MatchPairing;
use crate::tournament::models::{PlayerId, Tournament, TournamentId};

/// FIFO pairing queues, one per tournament.
#[derive(Debug, Default)]
pub struct MatchQueue {
    queues: HashMap<TournamentId, VecDeque<MatchPairing>>,
}

impl MatchQueue {
    /// Create an empty queue set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append pairings to a tournament's queue.
    pub fn push_pairings(&mut self, tournament_id: TournamentId, pairings: Vec<MatchPairing>) {
        self.queues
            .entry(tournament_id)
            .or_default()
            .extend(pairings);
    }

    /// Queued pairing count for a tournament.
    pub fn len(&self, tournament_id: TournamentId) -> usize {
        self.queues.get(&tournament_id).map_or(0, VecDeque::len)
    }

    /// True when nothing is queued for a tournament.
    pub fn is_empty(&self, tournament_id: TournamentId) -> bool {
        self.len(tournament_id) == 0
    }

    /// Drop a tournament's queue entirely.
    pub fn remove(&mut self, tournament_id: TournamentId) {
        self.queues.remove(&tournament_id);
    }

    /// Select the next dispatchable batch for a tournament.
    ///
    /// `busy` holds the player ids reserved by currently active matches and
    /// `active_count` is how many matches are running; the batch never
    /// exceeds `max_concurrent - active_count`, never contains two pairings
    /// sharing a player, and skips eliminated players. Never fails: an
    /// empty or fully-busy queue yields an empty batch.
    pub fn next_available(
        &mut self,
        tournament_id: TournamentId,
        tournament: &Tournament,
        busy: &HashSet<PlayerId>,
        max_concurrent: usize,
        active_count: usize,
    ) -> Vec<MatchPairing> {
        let available_slots = max_concurrent.saturating_sub(active_count);
        if available_slots == 0 {
            return Vec::new();
        }

        let Some(queue) = self.queues.get_mut(&tournament_id) else {
            return Vec::new();
        };

        let mut reserved: HashSet<PlayerId> = busy.clone();
        let mut selected_indices = Vec::new();
        let mut selected = Vec::new();

        for (index, pairing) in queue.iter().enumerate() {
            if selected.len() >= available_slots {
                break;
            }
            if reserved.contains(&pairing.player1_id) || reserved.contains(&pairing.player2_id) {
                continue;
            }
            let eliminated = [pairing.player1_id, pairing.player2_id]
                .iter()
                .any(|id| tournament.player(*id).is_none_or(|p| p.is_eliminated));
            if eliminated {
                continue;
            }
            reserved.insert(pairing.player1_id);
            reserved.insert(pairing.player2_id);
            selected_indices.push(index);
            selected.push(pairing.clone());
        }

        // Remove selected entries back to front so indices stay valid.
        for index in selected_indices.into_iter().rev() {
            queue.remove(index);
        }

        selected
    }
}

/// Partition a pairing list into sequential conflict-free waves, each at
/// most `max_concurrent` large.
///
/// Pairings from a well-formed round are pairwise disjoint, so every pass
/// selects something; if a malformed input ever yields an empty pass, the
/// remainder is chunked by `max_concurrent` to guarantee termination.
pub fn schedule_waves(pairings: &[MatchPairing], max_concurrent: usize) -> Vec<Vec<MatchPairing>> {
    if max_concurrent == 0 || pairings.is_empty() {
        return Vec::new();
    }

    let mut remaining: VecDeque<MatchPairing> = pairings.iter().cloned().collect();
    let mut waves = Vec::new();

    while !remaining.is_empty() {
        let mut reserved: HashSet<PlayerId> = HashSet::new();
        let mut wave = Vec::new();
        let mut deferred = VecDeque::new();

        while let Some(pairing) = remaining.pop_front() {
            if wave.len() < max_concurrent
                && !reserved.contains(&pairing.player1_id)
                && !reserved.contains(&pairing.player2_id)
            {
                reserved.insert(pairing.player1_id);
                reserved.insert(pairing.player2_id);
                wave.push(pairing);
            } else {
                deferred.push_back(pairing);
            }
        }

        if wave.is_empty() {
            // Malformed input guard: chunk whatever is left.
            while !deferred.is_empty() {
                let take = deferred.len().min(max_concurrent);
                waves.push(deferred.drain(..take).collect());
            }
            break;
        }

        waves.push(wave);
        remaining = deferred;
    }

    waves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::bracket;
    use crate::tournament::models::{
        LobbyInfo, LobbyPlayer, TournamentFormat, TournamentPlayer, TournamentStatus,
    };
    use uuid::Uuid;

    fn pairing(p1: PlayerId, p2: PlayerId, position: u32) -> MatchPairing {
        MatchPairing {
            player1_id: p1,
            player2_id: p2,
            round_number: 1,
            bracket_position: position,
        }
    }

    fn tournament_with(players: &[PlayerId]) -> Tournament {
        let lobby = LobbyInfo {
            lobby_id: Uuid::new_v4(),
            format: TournamentFormat::RoundRobin,
            players: players
                .iter()
                .map(|id| LobbyPlayer {
                    id: *id,
                    name: format!("p-{id}"),
                    is_host: false,
                })
                .collect(),
        };
        Tournament {
            id: Uuid::new_v4(),
            lobby_id: lobby.lobby_id,
            format: lobby.format,
            players: lobby
                .players
                .iter()
                .map(|p| TournamentPlayer::new(p.id, p.name.clone(), p.is_host))
                .collect(),
            bracket: bracket::generate(players, TournamentFormat::RoundRobin).unwrap(),
            status: TournamentStatus::InProgress,
            current_round: 1,
            total_rounds: 3,
            start_time: None,
            end_time: None,
            winner: None,
            match_history: Vec::new(),
        }
    }

    #[test]
    fn test_batch_respects_cap_and_leaves_remainder() {
        let players: Vec<PlayerId> = (0..6).map(|_| Uuid::new_v4()).collect();
        let tournament = tournament_with(&players);
        let mut queue = MatchQueue::new();
        queue.push_pairings(
            tournament.id,
            vec![
                pairing(players[0], players[1], 0),
                pairing(players[2], players[3], 1),
                pairing(players[4], players[5], 2),
            ],
        );

        let batch = queue.next_available(tournament.id, &tournament, &HashSet::new(), 2, 0);
        assert_eq!(batch.len(), 2);
        assert_eq!(queue.len(tournament.id), 1);
        assert_eq!(batch[0].player1_id, players[0]);

        // One slot frees up, the third pairing dispatches.
        let batch = queue.next_available(tournament.id, &tournament, &HashSet::new(), 2, 1);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].player1_id, players[4]);
        assert!(queue.is_empty(tournament.id));
    }

    #[test]
    fn test_batch_never_double_books_a_player() {
        let players: Vec<PlayerId> = (0..4).map(|_| Uuid::new_v4()).collect();
        let tournament = tournament_with(&players);
        let mut queue = MatchQueue::new();
        queue.push_pairings(
            tournament.id,
            vec![
                pairing(players[0], players[1], 0),
                pairing(players[1], players[2], 1),
                pairing(players[2], players[3], 2),
            ],
        );

        let batch = queue.next_available(tournament.id, &tournament, &HashSet::new(), 8, 0);
        assert_eq!(batch.len(), 2);
        assert!(!batch[0].conflicts_with(&batch[1]));
        // The conflicting middle pairing stays queued.
        assert_eq!(queue.len(tournament.id), 1);
    }

    #[test]
    fn test_busy_players_are_skipped() {
        let players: Vec<PlayerId> = (0..4).map(|_| Uuid::new_v4()).collect();
        let tournament = tournament_with(&players);
        let mut queue = MatchQueue::new();
        queue.push_pairings(
            tournament.id,
            vec![
                pairing(players[0], players[1], 0),
                pairing(players[2], players[3], 1),
            ],
        );

        let busy: HashSet<PlayerId> = [players[0]].into_iter().collect();
        let batch = queue.next_available(tournament.id, &tournament, &busy, 4, 1);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].player1_id, players[2]);
        assert_eq!(queue.len(tournament.id), 1);
    }

    #[test]
    fn test_eliminated_players_are_skipped() {
        let players: Vec<PlayerId> = (0..4).map(|_| Uuid::new_v4()).collect();
        let mut tournament = tournament_with(&players);
        tournament.player_mut(players[0]).unwrap().eliminate();
        let mut queue = MatchQueue::new();
        queue.push_pairings(
            tournament.id,
            vec![
                pairing(players[0], players[1], 0),
                pairing(players[2], players[3], 1),
            ],
        );

        let batch = queue.next_available(tournament.id, &tournament, &HashSet::new(), 4, 0);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].player1_id, players[2]);
    }

    #[test]
    fn test_empty_and_unknown_queues_yield_empty_batches() {
        let players: Vec<PlayerId> = (0..4).map(|_| Uuid::new_v4()).collect();
        let tournament = tournament_with(&players);
        let mut queue = MatchQueue::new();
        let batch = queue.next_available(tournament.id, &tournament, &HashSet::new(), 4, 0);
        assert!(batch.is_empty());

        // Cap already reached.
        queue.push_pairings(tournament.id, vec![pairing(players[0], players[1], 0)]);
        let batch = queue.next_available(tournament.id, &tournament, &HashSet::new(), 2, 2);
        assert!(batch.is_empty());
        assert_eq!(queue.len(tournament.id), 1);
    }

    #[test]
    fn test_schedule_waves_disjoint_round() {
        let players: Vec<PlayerId> = (0..8).map(|_| Uuid::new_v4()).collect();
        let pairings: Vec<MatchPairing> = (0..4)
            .map(|i| pairing(players[2 * i], players[2 * i + 1], i as u32))
            .collect();

        let waves = schedule_waves(&pairings, 3);
        assert_eq!(waves.len(), 2);
        assert_eq!(waves[0].len(), 3);
        assert_eq!(waves[1].len(), 1);
    }

    #[test]
    fn test_schedule_waves_with_conflicts() {
        let players: Vec<PlayerId> = (0..3).map(|_| Uuid::new_v4()).collect();
        let pairings = vec![
            pairing(players[0], players[1], 0),
            pairing(players[1], players[2], 1),
            pairing(players[0], players[2], 2),
        ];

        let waves = schedule_waves(&pairings, 4);
        // Every pairing shares a player with every other: three waves of one.
        assert_eq!(waves.len(), 3);
        for wave in &waves {
            assert_eq!(wave.len(), 1);
        }
    }

    #[test]
    fn test_schedule_waves_malformed_self_pairing_terminates() {
        let p = Uuid::new_v4();
        let pairings = vec![pairing(p, p, 0), pairing(p, p, 1), pairing(p, p, 2)];
        let waves = schedule_waves(&pairings, 2);
        let total: usize = waves.iter().map(Vec::len).sum();
        assert_eq!(total, 3);
    }
}
