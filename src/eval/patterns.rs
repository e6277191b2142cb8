//! Pattern scores for Gomoku evaluation
//!
//! These constants define the scoring weights for line patterns made of
//! consecutive same-colored stones, classified by run length and by how
//! many ends of the run border an empty cell.

/// Pattern scores for evaluation
pub struct PatternScore;

impl PatternScore {
    /// Five in a row - immediate win
    pub const FIVE: i32 = 1_000_000;

    /// Open four: _OOOO_ (two winning extensions, unstoppable)
    pub const OPEN_FOUR: i32 = 100_000;
    /// Closed four: XOOOO_ or _OOOOX (one way to extend)
    pub const FOUR: i32 = 15_000;

    /// Open three: _OOO_ (becomes an open four if not blocked)
    pub const OPEN_THREE: i32 = 5_000;
    /// Closed three: XOOO_ or _OOOX (one side blocked)
    pub const THREE: i32 = 800;

    /// Open two: _OO_ (potential to grow)
    pub const OPEN_TWO: i32 = 300;
    /// Closed two: XOO_ or _OOX (one side blocked)
    pub const TWO: i32 = 50;

    /// Lone stone with room to grow; doubled when both sides are open
    pub const ONE: i32 = 10;

    /// Decisive-placement threshold for the tactical layers.
    ///
    /// Every combination that forces a win within two plies clears this:
    /// an open four scores >= OPEN_FOUR, a double four adds the OPEN_FOUR
    /// bonus on top of two FOURs, and a four-three adds OPEN_FOUR / 2 on
    /// top of FOUR + OPEN_THREE (70_000 total). No placement short of one
    /// of those combinations reaches 50_000: two closed fours already
    /// trigger the double-four bonus, and the remaining patterns sum well
    /// below it.
    pub const WINNING_THREAT: i32 = Self::OPEN_FOUR / 2;
}
