use super::*;
use std::collections::HashSet;

#[test]
fn test_stone_opponent() {
    assert_eq!(Stone::Black.opponent(), Stone::White);
    assert_eq!(Stone::White.opponent(), Stone::Black);
    assert_eq!(Stone::Empty.opponent(), Stone::Empty);
}

#[test]
fn test_stone_codes() {
    assert_eq!(Stone::Empty.code(), 0);
    assert_eq!(Stone::Black.code(), 1);
    assert_eq!(Stone::White.code(), 2);

    for stone in [Stone::Empty, Stone::Black, Stone::White] {
        assert_eq!(Stone::from_code(stone.code()), Some(stone));
    }
    assert_eq!(Stone::from_code(3), None);
    assert_eq!(Stone::from_code(-1), None);
}

#[test]
fn test_pos_conversion() {
    let pos = Pos::new(7, 7); // Center
    assert_eq!(pos.to_index(), 7 * 15 + 7);
    assert_eq!(pos.to_index(), 112);

    let pos2 = Pos::from_index(112);
    assert_eq!(pos2.row, 7);
    assert_eq!(pos2.col, 7);
}

#[test]
fn test_pos_validity() {
    assert!(Pos::is_valid(0, 0));
    assert!(Pos::is_valid(14, 14));
    assert!(Pos::is_valid(7, 7));
    assert!(!Pos::is_valid(-1, 0));
    assert!(!Pos::is_valid(0, -1));
    assert!(!Pos::is_valid(15, 0));
    assert!(!Pos::is_valid(0, 15));
}

#[test]
fn test_board_constants() {
    assert_eq!(BOARD_SIZE, 15);
    assert_eq!(TOTAL_CELLS, 225);
    assert_eq!(CENTER, Pos::new(7, 7));
}

#[test]
fn test_pos_chebyshev() {
    let center = Pos::new(7, 7);
    assert_eq!(center.chebyshev(center), 0);
    assert_eq!(center.chebyshev(Pos::new(7, 9)), 2);
    assert_eq!(center.chebyshev(Pos::new(5, 8)), 2);
    assert_eq!(center.chebyshev(Pos::new(0, 0)), 7);
}

#[test]
fn test_pos_ordering() {
    let pos1 = Pos::new(0, 0);
    let pos2 = Pos::new(0, 1);
    let pos3 = Pos::new(1, 0);

    assert!(pos1 < pos2);
    assert!(pos2 < pos3);
    assert!(pos1 < pos3);
}

#[test]
fn test_board_place_and_get() {
    let mut board = Board::new();
    assert!(board.is_board_empty());

    let pos = Pos::new(7, 7);
    board.place_stone(pos, Stone::Black);
    assert_eq!(board.get(pos), Stone::Black);
    assert!(!board.is_empty(pos));
    assert_eq!(board.stone_count(), 1);
}

#[test]
fn test_board_remove_restores_empty() {
    let mut board = Board::new();
    let pos = Pos::new(3, 11);

    board.place_stone(pos, Stone::White);
    board.remove_stone(pos);

    assert!(board.is_empty(pos));
    assert_eq!(board.stone_count(), 0);
    assert_eq!(board, Board::new(), "board should be byte-equal after undo");
}

#[test]
fn test_board_place_empty_is_noop() {
    let mut board = Board::new();
    board.place_stone(Pos::new(0, 0), Stone::Empty);
    assert!(board.is_board_empty());
}

#[test]
fn test_board_full() {
    let mut board = Board::new();
    for idx in 0..TOTAL_CELLS {
        let stone = if idx % 2 == 0 { Stone::Black } else { Stone::White };
        board.place_stone(Pos::from_index(idx), stone);
    }
    assert!(board.is_full());
    assert_eq!(board.stone_count() as usize, TOTAL_CELLS);
}

#[test]
fn test_board_positions_iterator() {
    let mut board = Board::new();
    board.place_stone(Pos::new(0, 0), Stone::Black);
    board.place_stone(Pos::new(14, 14), Stone::White);
    board.place_stone(Pos::new(7, 7), Stone::Black);

    let occupied: Vec<Pos> = board.positions().collect();
    assert_eq!(
        occupied,
        vec![Pos::new(0, 0), Pos::new(7, 7), Pos::new(14, 14)],
        "positions() should yield occupied cells in row-major order"
    );
}

/// Every possible five-in-a-row line must be generated by exactly one
/// (start cell, direction) pair where the start cell has no same-line
/// predecessor. This is the property the evaluation and win-check code
/// rely on to count each line once, and it must hold at the board
/// boundaries for the (1, -1) anti-diagonal as well.
#[test]
fn test_directions_cover_each_line_once() {
    let mut seen: HashSet<Vec<(i32, i32)>> = HashSet::new();
    let mut generated = 0usize;

    for row in 0..BOARD_SIZE as i32 {
        for col in 0..BOARD_SIZE as i32 {
            for &(dx, dy) in &DIRECTIONS {
                // Line of 5 starting at (row, col): cells (col + i*dx, row + i*dy),
                // canonicalized by sorting so orientation does not matter.
                let mut cells: Vec<(i32, i32)> =
                    (0..5).map(|i| (col + i * dx, row + i * dy)).collect();
                if cells.iter().all(|&(x, y)| Pos::is_valid(y, x)) {
                    cells.sort_unstable();
                    generated += 1;
                    assert!(
                        seen.insert(cells.clone()),
                        "line {:?} generated twice",
                        cells
                    );
                }
            }
        }
    }

    // 15x15: 11*15 horizontal + 15*11 vertical + 11*11 per diagonal.
    let expected = 11 * 15 * 2 + 11 * 11 * 2;
    assert_eq!(generated, expected, "direction set must cover all lines");

    // Spot-check: the anti-diagonal five touching the top-right corner exists.
    let mut boundary: Vec<(i32, i32)> = (0..5).map(|i| (10 + i, 4 - i)).collect();
    boundary.sort_unstable();
    assert!(
        seen.contains(&boundary),
        "anti-diagonal line at boundary {:?} must be covered",
        boundary
    );
}
