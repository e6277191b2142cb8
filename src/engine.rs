//! Main AI engine: layered decision procedure over the search stack
//!
//! `Engine::find_best_move` runs a tactical pipeline before any tree
//! search. Each layer short-circuits when it fires, in order:
//!
//! 1. Immediate win: a placement completing five for us
//! 2. Forced defense: a placement that would complete five for them
//! 3. Decisive combination for us (open four, double four, four-three)
//! 4. Decisive combination for them: block it
//! 5. Closed-four threat against us: defend the strongest one
//! 6. Open three for us, unless their threat is the stronger open three
//! 7. Alpha-beta search at the difficulty's depth
//!
//! Easy mode adds variance: after the layers pass through, it plays a
//! uniformly random choice from the top five candidates 30% of the time.
//! The engine never fails: when the search yields nothing it falls back
//! to the first candidate, and to the center on an empty board.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::board::{Board, Pos, Stone, CENTER};
use crate::eval::{evaluate_position, PatternScore};
use crate::search::{
    generate_candidates, minimax, minimax_hard, INFINITY_SCORE, MAX_CANDIDATES,
    MAX_CANDIDATES_HARD, NEIGHBOR_RADIUS, NEIGHBOR_RADIUS_HARD,
};

/// Probability of the Easy-mode random branch
const EASY_RANDOM_CHANCE: f64 = 0.30;
/// Easy mode picks uniformly among this many top-weighted candidates
const EASY_RANDOM_POOL: usize = 5;

/// Search depth of the standard Hard search; its result stands when it
/// already proves a forced win, otherwise the deep variant decides.
const HARD_BASE_DEPTH: i32 = 6;
/// Depth of the deeper, wider Hard variant
const HARD_FULL_DEPTH: i32 = 8;

/// AI difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Alpha-beta depth for the standard search
    #[must_use]
    pub fn search_depth(self) -> i32 {
        match self {
            Difficulty::Easy => 2,
            Difficulty::Medium => 4,
            Difficulty::Hard => HARD_BASE_DEPTH,
        }
    }

    fn neighbor_radius(self) -> i32 {
        match self {
            Difficulty::Hard => NEIGHBOR_RADIUS_HARD,
            _ => NEIGHBOR_RADIUS,
        }
    }

    fn candidate_cap(self) -> usize {
        match self {
            Difficulty::Hard => MAX_CANDIDATES_HARD,
            _ => MAX_CANDIDATES,
        }
    }
}

/// Gomoku AI engine.
///
/// Stateless between calls apart from the RNG used for Easy-mode
/// variance; the board argument is mutated during evaluation and search
/// but restored before every return.
pub struct Engine {
    rng: StdRng,
}

impl Engine {
    /// Create an engine with an entropy-seeded RNG.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Create an engine with a fixed RNG seed (deterministic Easy mode).
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Find the best next move for `ai_color` at the given difficulty.
    ///
    /// Always returns a cell that was empty before the call; on an empty
    /// board this is the center.
    pub fn find_best_move(
        &mut self,
        board: &mut Board,
        ai_color: Stone,
        difficulty: Difficulty,
    ) -> Pos {
        let candidates = generate_candidates(
            board,
            difficulty.neighbor_radius(),
            difficulty.candidate_cap(),
        );
        let Some(&first) = candidates.first() else {
            // Only reachable when the caller violates the at-least-one-
            // empty-cell precondition; clamp to the center regardless.
            return CENTER;
        };

        let opponent = ai_color.opponent();

        // Attack and defense value of every candidate, computed once and
        // shared by all tactical layers.
        let scored: Vec<(Pos, i32, i32)> = candidates
            .iter()
            .map(|&pos| {
                let mine = evaluate_position(board, pos, ai_color);
                let theirs = evaluate_position(board, pos, opponent);
                (pos, mine, theirs)
            })
            .collect();

        // Layer 1: complete our five
        if let Some(&(pos, mine, _)) = scored.iter().find(|(_, mine, _)| *mine >= PatternScore::FIVE)
        {
            debug!(stage = "win", row = pos.row, col = pos.col, score = mine);
            return pos;
        }

        // Layer 2: deny their five
        if let Some(&(pos, _, theirs)) =
            scored.iter().find(|(_, _, theirs)| *theirs >= PatternScore::FIVE)
        {
            debug!(stage = "block_five", row = pos.row, col = pos.col, score = theirs);
            return pos;
        }

        // Layer 3: our decisive combination wins
        if let Some(&(pos, mine, _)) = scored
            .iter()
            .find(|(_, mine, _)| *mine >= PatternScore::WINNING_THREAT)
        {
            debug!(stage = "winning_threat", row = pos.row, col = pos.col, score = mine);
            return pos;
        }

        // Best defensive option, shared by layers 4-6.
        let &(defense_pos, _, defense_score) = scored
            .iter()
            .max_by_key(|(_, _, theirs)| *theirs)
            .expect("candidate list is non-empty");

        // Layer 4: their decisive combination must be blocked
        if defense_score >= PatternScore::WINNING_THREAT {
            debug!(
                stage = "block_winning_threat",
                row = defense_pos.row,
                col = defense_pos.col,
                score = defense_score
            );
            return defense_pos;
        }

        // Layer 5: closed-four threat against us
        if defense_score >= PatternScore::FOUR {
            debug!(
                stage = "block_four",
                row = defense_pos.row,
                col = defense_pos.col,
                score = defense_score
            );
            return defense_pos;
        }

        // Layer 6: take our open three, unless theirs is stronger
        let &(attack_pos, attack_score, _) = scored
            .iter()
            .max_by_key(|(_, mine, _)| *mine)
            .expect("candidate list is non-empty");
        if attack_score >= PatternScore::OPEN_THREE {
            if defense_score >= PatternScore::OPEN_THREE && defense_score > attack_score {
                debug!(
                    stage = "block_three",
                    row = defense_pos.row,
                    col = defense_pos.col,
                    score = defense_score
                );
                return defense_pos;
            }
            debug!(stage = "open_three", row = attack_pos.row, col = attack_pos.col, score = attack_score);
            return attack_pos;
        }

        // Easy-mode variance: 30% of the time play one of the top five
        // position-weight-ordered candidates instead of searching.
        if difficulty == Difficulty::Easy && self.rng.gen_bool(EASY_RANDOM_CHANCE) {
            let pool = &candidates[..candidates.len().min(EASY_RANDOM_POOL)];
            let pick = pool[self.rng.gen_range(0..pool.len())];
            debug!(stage = "easy_random", row = pick.row, col = pick.col);
            return pick;
        }

        // Layer 7: alpha-beta search
        let depth = difficulty.search_depth();
        let outcome = match difficulty {
            Difficulty::Easy | Difficulty::Medium => minimax(
                board,
                depth,
                -INFINITY_SCORE,
                INFINITY_SCORE,
                true,
                ai_color,
                depth,
            ),
            Difficulty::Hard => {
                let shallow = minimax(
                    board,
                    depth,
                    -INFINITY_SCORE,
                    INFINITY_SCORE,
                    true,
                    ai_color,
                    depth,
                );
                if shallow.score >= INFINITY_SCORE - HARD_BASE_DEPTH {
                    // Forced win already proven; no need to go deeper.
                    shallow
                } else {
                    minimax_hard(
                        board,
                        HARD_FULL_DEPTH,
                        -INFINITY_SCORE,
                        INFINITY_SCORE,
                        true,
                        ai_color,
                        HARD_FULL_DEPTH,
                    )
                }
            }
        };

        let chosen = outcome.best.unwrap_or(first);
        debug!(
            stage = "search",
            row = chosen.row,
            col = chosen.col,
            score = outcome.score,
            depth
        );
        chosen
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience wrapper around [`Engine::find_best_move`] with a fresh
/// entropy-seeded engine.
#[must_use]
pub fn find_best_move(board: &mut Board, ai_color: Stone, difficulty: Difficulty) -> Pos {
    Engine::new().find_best_move(board, ai_color, difficulty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::check_win_at;

    #[test]
    fn test_empty_board_plays_center() {
        let mut board = Board::new();
        let mut engine = Engine::with_seed(1);
        let mov = engine.find_best_move(&mut board, Stone::Black, Difficulty::Medium);
        assert_eq!(mov, CENTER);
    }

    #[test]
    fn test_immediate_win_taken() {
        // Black four at (7,3)..(7,6): any completing cell must win.
        let mut board = Board::new();
        for col in 3..7 {
            board.place_stone(Pos::new(7, col), Stone::Black);
        }

        let mut engine = Engine::with_seed(1);
        let mov = engine.find_best_move(&mut board, Stone::Black, Difficulty::Medium);

        board.place_stone(mov, Stone::Black);
        assert!(
            check_win_at(&board, mov, Stone::Black),
            "move {:?} must complete five",
            mov
        );
    }

    #[test]
    fn test_forced_defense_of_open_four() {
        // White four at (5,5)..(5,8): Black must take an end.
        let mut board = Board::new();
        for col in 5..9 {
            board.place_stone(Pos::new(5, col), Stone::White);
        }

        let mut engine = Engine::with_seed(1);
        let mov = engine.find_best_move(&mut board, Stone::Black, Difficulty::Medium);
        assert!(
            mov == Pos::new(5, 4) || mov == Pos::new(5, 9),
            "must block the four, got {:?}",
            mov
        );
    }

    #[test]
    fn test_open_four_preferred_over_closed_four_defense() {
        let mut board = Board::new();
        // Black open three on row 7: extending makes an open four.
        for col in 5..8 {
            board.place_stone(Pos::new(7, col), Stone::Black);
        }
        // White closed three on row 2 (left end blocked): White's best
        // reply would make only a closed four.
        board.place_stone(Pos::new(2, 2), Stone::Black);
        for col in 3..6 {
            board.place_stone(Pos::new(2, col), Stone::White);
        }

        let mut engine = Engine::with_seed(1);
        let mov = engine.find_best_move(&mut board, Stone::Black, Difficulty::Medium);
        assert!(
            mov == Pos::new(7, 4) || mov == Pos::new(7, 8),
            "open four must be preferred over defending the closed four, got {:?}",
            mov
        );
    }

    #[test]
    fn test_blocks_decisive_double_threat() {
        let mut board = Board::new();
        // White closed four (blocked left) plus open three crossing at
        // (7,7): a four-three for White that must be blocked now.
        board.place_stone(Pos::new(7, 3), Stone::Black);
        for col in 4..7 {
            board.place_stone(Pos::new(7, col), Stone::White);
        }
        for row in 5..7 {
            board.place_stone(Pos::new(row, 7), Stone::White);
        }

        let mut engine = Engine::with_seed(1);
        let mov = engine.find_best_move(&mut board, Stone::Black, Difficulty::Medium);
        assert_eq!(
            mov,
            Pos::new(7, 7),
            "the four-three junction is the only block"
        );
    }

    #[test]
    fn test_returns_empty_cell_only() {
        let mut board = Board::new();
        board.place_stone(Pos::new(7, 7), Stone::Black);
        board.place_stone(Pos::new(8, 8), Stone::White);
        board.place_stone(Pos::new(6, 6), Stone::Black);

        // Easy exercises the random branch across seeds; Medium covers
        // the search path (kept short, debug builds are slow).
        let cases = [
            (Difficulty::Easy, 0..8u64),
            (Difficulty::Medium, 0..2u64),
        ];
        for (difficulty, seeds) in cases {
            for seed in seeds {
                let mut engine = Engine::with_seed(seed);
                let mut work = board.clone();
                let mov = engine.find_best_move(&mut work, Stone::White, difficulty);
                assert!(
                    board.is_empty(mov),
                    "{:?} seed {} returned occupied cell {:?}",
                    difficulty,
                    seed,
                    mov
                );
                assert_eq!(work, board, "board must be restored after the call");
            }
        }
    }

    #[test]
    fn test_easy_random_stays_near_stones() {
        // Whatever the RNG does, Easy moves come from the candidate set,
        // which is confined to the Chebyshev-2 neighborhood.
        let mut board = Board::new();
        let stone = Pos::new(7, 7);
        board.place_stone(stone, Stone::Black);

        for seed in 0..32 {
            let mut engine = Engine::with_seed(seed);
            let mut work = board.clone();
            let mov = engine.find_best_move(&mut work, Stone::White, Difficulty::Easy);
            assert!(
                mov.chebyshev(stone) <= 2,
                "seed {} produced far move {:?}",
                seed,
                mov
            );
        }
    }

    #[test]
    fn test_hard_mode_blocks_win() {
        let mut board = Board::new();
        for col in 5..9 {
            board.place_stone(Pos::new(5, col), Stone::White);
        }

        let mut engine = Engine::with_seed(1);
        let mov = engine.find_best_move(&mut board, Stone::Black, Difficulty::Hard);
        assert!(
            mov == Pos::new(5, 4) || mov == Pos::new(5, 9),
            "hard mode must still take the forced block, got {:?}",
            mov
        );
    }

    #[test]
    fn test_free_function_wrapper() {
        let mut board = Board::new();
        let mov = find_best_move(&mut board, Stone::Black, Difficulty::Medium);
        assert_eq!(mov, CENTER);
    }
}
