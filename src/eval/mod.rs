//! Position evaluation for the Gomoku AI
//!
//! Contains:
//! - Pattern score constants
//! - Placement scoring (`evaluate_position`) for move selection
//! - Whole-board scoring (`evaluate_board`) used at search leaves

pub mod heuristic;
pub mod patterns;

pub use heuristic::{analyze_line, evaluate_board, evaluate_position, position_weight};
pub use patterns::PatternScore;
