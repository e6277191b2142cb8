//! Candidate move generation
//!
//! The search never considers every empty cell. Candidates are the empty
//! cells within a Chebyshev radius of any stone, deduplicated, scored by
//! the center-bias weight and sorted descending. On an empty board the
//! sole candidate is the center.

use crate::board::{Board, Pos, BOARD_SIZE, CENTER};
use crate::eval::position_weight;

/// Candidate cap for Easy and Medium search
pub const MAX_CANDIDATES: usize = 60;
/// Candidate cap for the Hard variant
pub const MAX_CANDIDATES_HARD: usize = 100;

/// Neighborhood radius around existing stones (Easy/Medium)
pub const NEIGHBOR_RADIUS: i32 = 2;
/// Wider neighborhood for the Hard variant
pub const NEIGHBOR_RADIUS_HARD: i32 = 3;

/// Generate candidate moves: empty cells within `radius` of any stone,
/// ordered by descending center-bias weight and capped at `cap`.
///
/// Returns `[CENTER]` for an empty board.
#[must_use]
pub fn generate_candidates(board: &Board, radius: i32, cap: usize) -> Vec<Pos> {
    if board.is_board_empty() {
        return vec![CENTER];
    }

    let mut seen = [[false; BOARD_SIZE]; BOARD_SIZE];
    let mut scored: Vec<(Pos, i32)> = Vec::with_capacity(cap);

    for stone_pos in board.positions() {
        for dr in -radius..=radius {
            for dc in -radius..=radius {
                let r = i32::from(stone_pos.row) + dr;
                let c = i32::from(stone_pos.col) + dc;
                if !Pos::is_valid(r, c) {
                    continue;
                }

                let (r, c) = (r as usize, c as usize);
                if seen[r][c] {
                    continue;
                }
                seen[r][c] = true;

                let pos = Pos::new(r as u8, c as u8);
                if board.is_empty(pos) {
                    scored.push((pos, position_weight(pos)));
                }
            }
        }
    }

    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.truncate(cap);
    scored.into_iter().map(|(pos, _)| pos).collect()
}
