//! Game state snapshots and the leaderboard.

use super::room::RoomState;
use crate::entity::Player;
use protocol::{GameState, LeaderboardEntry};
use std::cmp::Ordering;

/// Build the externally visible state of a room.
///
/// Players come in join order, cells and food in id order.
pub(crate) fn build(state: &RoomState) -> GameState {
    let room_id = state.room.id;

    let mut players: Vec<&Player> = state.players.values().collect();
    players.sort_by_key(|p| p.join_seq);

    GameState {
        room: state.room.clone(),
        players: players.iter().map(|p| p.to_record(room_id)).collect(),
        cells: state.world.iter_cells().map(|c| c.to_record()).collect(),
        food: state.world.iter_food().map(|f| f.to_record(room_id)).collect(),
        leaderboard: leaderboard(players),
    }
}

/// Rank players by score, highest first.
pub fn leaderboard<'a>(players: impl IntoIterator<Item = &'a Player>) -> Vec<LeaderboardEntry> {
    let mut ranked: Vec<&Player> = players.into_iter().collect();
    ranked.sort_by(rank);
    ranked
        .into_iter()
        .map(|p| LeaderboardEntry {
            player_id: p.id,
            name: p.name.clone(),
            score: p.score,
        })
        .collect()
}

/// Score descending, then earliest join.
fn rank(a: &&Player, b: &&Player) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.join_seq.cmp(&b.join_seq))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use protocol::Color;

    fn player(score: u64, created_at: u64, join_seq: u64) -> Player {
        let mut player = Player::new(format!("p{join_seq}"), Color::new(0, 0, 0), created_at, join_seq);
        player.score = score;
        player
    }

    #[test]
    fn test_ties_go_to_earliest_joiner() {
        let players = [player(10, 5, 0), player(20, 9, 1), player(10, 3, 2), player(10, 3, 3)];
        let board = leaderboard(&players);
        let order: Vec<_> = board.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(order, ["p1", "p2", "p3", "p0"]);
    }

    proptest! {
        #[test]
        fn leaderboard_is_sorted_and_complete(
            rows in prop::collection::vec((0u64..50, 0u64..20), 0..40)
        ) {
            let players: Vec<Player> = rows
                .iter()
                .enumerate()
                .map(|(i, &(score, created_at))| player(score, created_at, i as u64))
                .collect();
            let board = leaderboard(&players);

            prop_assert_eq!(board.len(), players.len());
            let by_id = |id: protocol::PlayerId| players.iter().find(|p| p.id == id).unwrap();
            for pair in board.windows(2) {
                let (a, b) = (by_id(pair[0].player_id), by_id(pair[1].player_id));
                prop_assert!(a.score > b.score || (a.score == b.score && a.created_at <= b.created_at));
            }
        }
    }
}
