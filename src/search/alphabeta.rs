//! Alpha-beta minimax search
//!
//! Classic minimax with alpha-beta pruning and an explicit maximizing
//! flag. At every interior node the candidate set is regenerated from
//! the current board, ordered by attack-plus-defense placement scores,
//! and truncated to a per-depth branching cap. Wins discovered while
//! expanding a child terminate the node immediately with a score that
//! prefers shallower wins.
//!
//! The search mutates the board it is given and restores every cell it
//! writes before returning from any frame, on both normal and cutoff
//! exits (try-undo).

use crate::board::{Board, Pos, Stone};
use crate::eval::{evaluate_board, evaluate_position};
use crate::rules::check_win_at;

use super::candidates::{
    generate_candidates, MAX_CANDIDATES, MAX_CANDIDATES_HARD, NEIGHBOR_RADIUS,
    NEIGHBOR_RADIUS_HARD,
};

/// Infinity score for alpha-beta bounds and terminal wins
pub const INFINITY_SCORE: i32 = 10_000_000;

/// Per-ply branching caps for the hard variant, root outward.
/// The last cap applies to all deeper plies.
const HARD_BRANCH_CAPS: [usize; 5] = [50, 35, 25, 18, 12];

/// Result of a (sub)tree search: the minimax score and, when the node
/// expanded at least one child, the move that achieved it.
#[derive(Debug, Clone, Copy)]
pub struct SearchOutcome {
    pub score: i32,
    pub best: Option<Pos>,
}

impl SearchOutcome {
    #[inline]
    fn leaf(score: i32) -> Self {
        Self { score, best: None }
    }
}

/// How a search variant limits branching and candidate generation.
#[derive(Debug, Clone, Copy)]
struct SearchParams {
    radius: i32,
    candidate_cap: usize,
    per_ply_caps: bool,
}

impl SearchParams {
    const STANDARD: Self = Self {
        radius: NEIGHBOR_RADIUS,
        candidate_cap: MAX_CANDIDATES,
        per_ply_caps: false,
    };

    const HARD: Self = Self {
        radius: NEIGHBOR_RADIUS_HARD,
        candidate_cap: MAX_CANDIDATES_HARD,
        per_ply_caps: true,
    };

    /// Branching cap for a node `ply` levels below the root with
    /// `depth` levels remaining.
    fn branch_cap(&self, depth: i32, ply: i32) -> usize {
        if self.per_ply_caps {
            HARD_BRANCH_CAPS[(ply.max(0) as usize).min(HARD_BRANCH_CAPS.len() - 1)]
        } else if depth <= 2 {
            20
        } else if depth <= 4 {
            15
        } else {
            10
        }
    }
}

/// Standard alpha-beta search down to `depth` plies.
///
/// `max_depth` is the depth at the root of the whole search; it is used
/// to grade terminal scores so that shallower wins score higher. Call
/// with `depth == max_depth`, a full `(-INFINITY_SCORE, INFINITY_SCORE)`
/// window, and `is_maximizing == true` to search for `ai_color`'s best
/// move.
#[must_use]
pub fn minimax(
    board: &mut Board,
    depth: i32,
    alpha: i32,
    beta: i32,
    is_maximizing: bool,
    ai_color: Stone,
    max_depth: i32,
) -> SearchOutcome {
    alpha_beta(
        board,
        depth,
        alpha,
        beta,
        is_maximizing,
        ai_color,
        max_depth,
        SearchParams::STANDARD,
    )
}

/// Deeper, wider hard-mode variant: Chebyshev-3 neighborhood, larger
/// candidate pool, and per-ply branching caps from the root outward.
#[must_use]
pub fn minimax_hard(
    board: &mut Board,
    depth: i32,
    alpha: i32,
    beta: i32,
    is_maximizing: bool,
    ai_color: Stone,
    max_depth: i32,
) -> SearchOutcome {
    alpha_beta(
        board,
        depth,
        alpha,
        beta,
        is_maximizing,
        ai_color,
        max_depth,
        SearchParams::HARD,
    )
}

#[allow(clippy::too_many_arguments)]
fn alpha_beta(
    board: &mut Board,
    depth: i32,
    mut alpha: i32,
    mut beta: i32,
    is_maximizing: bool,
    ai_color: Stone,
    max_depth: i32,
    params: SearchParams,
) -> SearchOutcome {
    if depth <= 0 {
        return SearchOutcome::leaf(evaluate_board(board, ai_color));
    }

    let opponent = ai_color.opponent();
    let current = if is_maximizing { ai_color } else { opponent };

    let candidates = generate_candidates(board, params.radius, params.candidate_cap);
    if candidates.is_empty() {
        return SearchOutcome::leaf(evaluate_board(board, ai_color));
    }

    // Move ordering: attack plus defense value of each placement.
    let mut ordered: Vec<(Pos, i32)> = candidates
        .into_iter()
        .map(|pos| {
            let attack = evaluate_position(board, pos, current);
            let defense = evaluate_position(board, pos, current.opponent());
            (pos, attack + defense)
        })
        .collect();
    ordered.sort_by(|a, b| b.1.cmp(&a.1));

    let cap = params.branch_cap(depth, max_depth - depth);
    ordered.truncate(cap);

    // Shallower wins score higher than deeper ones.
    let win_score = INFINITY_SCORE - (max_depth - depth);

    let mut best = SearchOutcome {
        score: if is_maximizing {
            -INFINITY_SCORE
        } else {
            INFINITY_SCORE
        },
        best: Some(ordered[0].0),
    };

    for &(pos, _) in &ordered {
        board.place_stone(pos, current);

        if check_win_at(board, pos, current) {
            board.remove_stone(pos);
            return SearchOutcome {
                score: if is_maximizing { win_score } else { -win_score },
                best: Some(pos),
            };
        }

        let child = alpha_beta(
            board,
            depth - 1,
            alpha,
            beta,
            !is_maximizing,
            ai_color,
            max_depth,
            params,
        );
        board.remove_stone(pos);

        if is_maximizing {
            if child.score > best.score {
                best.score = child.score;
                best.best = Some(pos);
            }
            alpha = alpha.max(best.score);
        } else {
            if child.score < best.score {
                best.score = child.score;
                best.best = Some(pos);
            }
            beta = beta.min(best.score);
        }

        if beta <= alpha {
            break;
        }
    }

    best
}
