//! Heuristic evaluation for Gomoku positions
//!
//! Two evaluators share the same pattern table:
//! - `evaluate_position` scores a single speculative placement. It places
//!   the stone, analyzes the four lines through it, adds combination
//!   bonuses and the center-bias weight, then restores the cell.
//! - `evaluate_board` scores a whole board from one side's perspective
//!   and is the leaf function of the alpha-beta search. Each line segment
//!   is counted exactly once by only scoring runs at their start.

use crate::board::{Board, Pos, Stone, BOARD_SIZE, CENTER, DIRECTIONS};

use super::patterns::PatternScore;

/// Center-bias weight for a cell: `BOARD_SIZE - manhattan_distance_to_center`.
///
/// Small enough to only break ties between otherwise equal placements.
#[inline]
#[must_use]
pub fn position_weight(pos: Pos) -> i32 {
    let dist = (i32::from(pos.row) - i32::from(CENTER.row)).abs()
        + (i32::from(pos.col) - i32::from(CENTER.col)).abs();
    BOARD_SIZE as i32 - dist
}

/// Analyze the maximal run of `color` through `pos` along `(dx, dy)`.
///
/// Returns `(count, open_ends)`: the run length including `pos`, and how
/// many of the run's two ends border an in-board empty cell (0..=2).
/// The cell at `pos` is expected to already hold `color`.
#[must_use]
pub fn analyze_line(board: &Board, pos: Pos, dx: i32, dy: i32, color: Stone) -> (i32, i32) {
    let mut count = 1;
    let mut open_ends = 0;

    // Positive direction
    let mut x = i32::from(pos.col) + dx;
    let mut y = i32::from(pos.row) + dy;
    while Pos::is_valid(y, x) && board.get(Pos::new(y as u8, x as u8)) == color {
        count += 1;
        x += dx;
        y += dy;
    }
    if Pos::is_valid(y, x) && board.get(Pos::new(y as u8, x as u8)) == Stone::Empty {
        open_ends += 1;
    }

    // Negative direction
    x = i32::from(pos.col) - dx;
    y = i32::from(pos.row) - dy;
    while Pos::is_valid(y, x) && board.get(Pos::new(y as u8, x as u8)) == color {
        count += 1;
        x -= dx;
        y -= dy;
    }
    if Pos::is_valid(y, x) && board.get(Pos::new(y as u8, x as u8)) == Stone::Empty {
        open_ends += 1;
    }

    (count, open_ends)
}

/// Map a (run length, open ends) pair to its pattern score.
#[inline]
fn pattern_score(count: i32, open_ends: i32) -> i32 {
    match (count, open_ends) {
        (5.., _) => PatternScore::FIVE,
        (4, 2) => PatternScore::OPEN_FOUR,
        (4, 1) => PatternScore::FOUR,
        (3, 2) => PatternScore::OPEN_THREE,
        (3, 1) => PatternScore::THREE,
        (2, 2) => PatternScore::OPEN_TWO,
        (2, 1) => PatternScore::TWO,
        (1, 2) => PatternScore::ONE * 2,
        (1, 1) => PatternScore::ONE,
        _ => 0,
    }
}

/// Score the placement of `color` at `pos`.
///
/// Temporarily places the stone, accumulates the pattern score of the
/// four lines through it, then adds combination bonuses for placements
/// that create multiple threats at once:
/// - two or more closed fours (double four): `+OPEN_FOUR`
/// - a closed four plus an open three (four-three): `+OPEN_FOUR / 2`
/// - two or more open threes (double three): `+FOUR`
///
/// The center-bias weight is added last and the cell is restored to
/// empty before returning. Returns 0 for an occupied cell.
#[must_use]
pub fn evaluate_position(board: &mut Board, pos: Pos, color: Stone) -> i32 {
    if !board.is_empty(pos) {
        return 0;
    }

    board.place_stone(pos, color);

    let mut score = 0;
    let mut fours = 0;
    let mut open_threes = 0;

    for &(dx, dy) in &DIRECTIONS {
        let (count, open_ends) = analyze_line(board, pos, dx, dy, color);
        score += pattern_score(count, open_ends);

        if count == 4 && open_ends == 1 {
            fours += 1;
        } else if count == 3 && open_ends == 2 {
            open_threes += 1;
        }
    }

    board.remove_stone(pos);

    // Double four: the opponent can only block one of them
    if fours >= 2 {
        score += PatternScore::OPEN_FOUR;
    }
    // Four-three: blocking the four promotes the three to an open four
    if fours >= 1 && open_threes >= 1 {
        score += PatternScore::OPEN_FOUR / 2;
    }
    // Double three: one of the threes becomes an open four
    if open_threes >= 2 {
        score += PatternScore::FOUR;
    }

    score + position_weight(pos)
}

/// Evaluate the whole board from `ai_color`'s perspective.
///
/// Scans every stone and scores the line run it starts in each of the
/// four directions; runs whose predecessor cell holds the same color are
/// skipped so each segment contributes exactly once. Contributions are
/// signed: positive for `ai_color`'s lines, negative for the opponent's,
/// plus the signed center-bias weight of every stone. The result is
/// exactly antisymmetric in the color argument.
#[must_use]
pub fn evaluate_board(board: &Board, ai_color: Stone) -> i32 {
    let mut score = 0;

    for pos in board.positions() {
        let color = board.get(pos);
        let sign = if color == ai_color { 1 } else { -1 };

        score += sign * position_weight(pos);

        for &(dx, dy) in &DIRECTIONS {
            // Only score a run at its start: skip when the previous cell
            // in this direction holds the same color.
            let prev_x = i32::from(pos.col) - dx;
            let prev_y = i32::from(pos.row) - dy;
            if Pos::is_valid(prev_y, prev_x)
                && board.get(Pos::new(prev_y as u8, prev_x as u8)) == color
            {
                continue;
            }

            let (count, open_ends) = analyze_line(board, pos, dx, dy, color);
            score += sign * pattern_score(count, open_ends);
        }
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_weight_center_bias() {
        assert_eq!(position_weight(CENTER), BOARD_SIZE as i32);
        assert_eq!(position_weight(Pos::new(0, 0)), BOARD_SIZE as i32 - 14);
        assert!(position_weight(CENTER) > position_weight(Pos::new(0, 7)));
    }

    #[test]
    fn test_analyze_line_open_three() {
        let mut board = Board::new();
        // _OOO_ on row 7, cols 5..8
        for col in 5..8 {
            board.place_stone(Pos::new(7, col), Stone::Black);
        }
        let (count, open_ends) = analyze_line(&board, Pos::new(7, 6), 1, 0, Stone::Black);
        assert_eq!(count, 3);
        assert_eq!(open_ends, 2);
    }

    #[test]
    fn test_analyze_line_blocked_end() {
        let mut board = Board::new();
        // XOOO_ on row 7
        board.place_stone(Pos::new(7, 4), Stone::White);
        for col in 5..8 {
            board.place_stone(Pos::new(7, col), Stone::Black);
        }
        let (count, open_ends) = analyze_line(&board, Pos::new(7, 5), 1, 0, Stone::Black);
        assert_eq!(count, 3);
        assert_eq!(open_ends, 1);
    }

    #[test]
    fn test_analyze_line_board_edge_is_closed() {
        let mut board = Board::new();
        // Run touching the left edge: no open end there
        for col in 0..3 {
            board.place_stone(Pos::new(7, col), Stone::Black);
        }
        let (count, open_ends) = analyze_line(&board, Pos::new(7, 0), 1, 0, Stone::Black);
        assert_eq!(count, 3);
        assert_eq!(open_ends, 1, "board edge must not count as an open end");
    }

    #[test]
    fn test_evaluate_position_restores_board() {
        let mut board = Board::new();
        board.place_stone(Pos::new(7, 7), Stone::Black);
        let snapshot = board.clone();

        let _ = evaluate_position(&mut board, Pos::new(7, 8), Stone::Black);
        assert_eq!(board, snapshot, "evaluate_position must undo its placement");
    }

    #[test]
    fn test_evaluate_position_occupied_cell_scores_zero() {
        let mut board = Board::new();
        board.place_stone(Pos::new(7, 7), Stone::Black);
        assert_eq!(evaluate_position(&mut board, Pos::new(7, 7), Stone::White), 0);
    }

    #[test]
    fn test_evaluate_position_completes_five() {
        let mut board = Board::new();
        for col in 3..7 {
            board.place_stone(Pos::new(7, col), Stone::Black);
        }
        let score = evaluate_position(&mut board, Pos::new(7, 7), Stone::Black);
        assert!(
            score >= PatternScore::FIVE,
            "completing five should score as a win, got {}",
            score
        );
    }

    #[test]
    fn test_evaluate_position_open_four() {
        let mut board = Board::new();
        // Placing at (7,6) makes _OOOO_ (cols 3..=6 with 2 and 7 empty)
        for col in 3..6 {
            board.place_stone(Pos::new(7, col), Stone::Black);
        }
        let score = evaluate_position(&mut board, Pos::new(7, 6), Stone::Black);
        assert!(
            score >= PatternScore::OPEN_FOUR,
            "open four placement should be decisive, got {}",
            score
        );
    }

    #[test]
    fn test_evaluate_position_double_four_bonus() {
        let mut board = Board::new();
        // Two closed fours through (7,7): horizontal (blocked left) and
        // vertical (blocked top).
        board.place_stone(Pos::new(7, 3), Stone::White);
        for col in 4..7 {
            board.place_stone(Pos::new(7, col), Stone::Black);
        }
        board.place_stone(Pos::new(3, 7), Stone::White);
        for row in 4..7 {
            board.place_stone(Pos::new(row, 7), Stone::Black);
        }

        let score = evaluate_position(&mut board, Pos::new(7, 7), Stone::Black);
        assert!(
            score >= PatternScore::WINNING_THREAT,
            "double four must clear the winning threshold, got {}",
            score
        );
    }

    #[test]
    fn test_evaluate_position_four_three_bonus() {
        let mut board = Board::new();
        // Closed four horizontal (blocked left) + open three vertical
        board.place_stone(Pos::new(7, 3), Stone::White);
        for col in 4..7 {
            board.place_stone(Pos::new(7, col), Stone::Black);
        }
        for row in 5..7 {
            board.place_stone(Pos::new(row, 7), Stone::Black);
        }

        let score = evaluate_position(&mut board, Pos::new(7, 7), Stone::Black);
        assert!(
            score >= PatternScore::WINNING_THREAT,
            "four-three must clear the winning threshold, got {}",
            score
        );
    }

    #[test]
    fn test_evaluate_position_double_three_bonus() {
        let mut board = Board::new();
        // Two open twos meeting at (7,7): placing there makes two open threes
        for col in 5..7 {
            board.place_stone(Pos::new(7, col), Stone::Black);
        }
        for row in 5..7 {
            board.place_stone(Pos::new(row, 7), Stone::Black);
        }

        let score = evaluate_position(&mut board, Pos::new(7, 7), Stone::Black);
        let single_three = 2 * PatternScore::OPEN_THREE;
        assert!(
            score > single_three,
            "double three should earn its bonus, got {}",
            score
        );
        assert!(
            score < PatternScore::WINNING_THREAT,
            "double three is strong but not decisive, got {}",
            score
        );
    }

    #[test]
    fn test_evaluate_board_empty_is_zero() {
        let board = Board::new();
        assert_eq!(evaluate_board(&board, Stone::Black), 0);
        assert_eq!(evaluate_board(&board, Stone::White), 0);
    }

    #[test]
    fn test_evaluate_board_antisymmetric() {
        let mut board = Board::new();
        board.place_stone(Pos::new(7, 6), Stone::Black);
        board.place_stone(Pos::new(7, 7), Stone::Black);
        board.place_stone(Pos::new(7, 8), Stone::Black);
        board.place_stone(Pos::new(5, 5), Stone::White);
        board.place_stone(Pos::new(6, 5), Stone::White);
        board.place_stone(Pos::new(0, 14), Stone::White);

        let black = evaluate_board(&board, Stone::Black);
        let white = evaluate_board(&board, Stone::White);
        assert_eq!(
            black, -white,
            "evaluate_board must be antisymmetric: black={}, white={}",
            black, white
        );
        assert!(black > 0, "open three should outweigh an open two");
    }

    #[test]
    fn test_evaluate_board_counts_each_run_once() {
        let mut board = Board::new();
        for col in 4..7 {
            board.place_stone(Pos::new(7, col), Stone::Black);
        }
        // The start-of-run rule yields exactly one open three for the
        // horizontal line, plus a both-sides-open single per stone in
        // each of the three remaining directions, plus center weights.
        let weights: i32 = (4..7).map(|c| position_weight(Pos::new(7, c))).sum();
        let singles = 3 * 3 * (2 * PatternScore::ONE);
        let score = evaluate_board(&board, Stone::Black);
        assert_eq!(score, PatternScore::OPEN_THREE + singles + weights);
    }

    #[test]
    fn test_evaluate_board_prefers_stronger_side() {
        let mut board = Board::new();
        // Black open three vs White closed two
        for col in 6..9 {
            board.place_stone(Pos::new(7, col), Stone::Black);
        }
        board.place_stone(Pos::new(2, 2), Stone::White);
        board.place_stone(Pos::new(2, 3), Stone::White);
        board.place_stone(Pos::new(2, 4), Stone::Black);

        assert!(evaluate_board(&board, Stone::Black) > 0);
        assert!(evaluate_board(&board, Stone::White) < 0);
    }
}
