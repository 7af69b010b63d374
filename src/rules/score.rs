//! Board-end scoring

use crate::config::RulesConfig;
use crate::sim::body::{PieceColor, RigidBody};

/// Board-end value of one remaining piece
pub fn piece_value(rules: &RulesConfig, color: PieceColor) -> u32 {
    match color {
        PieceColor::White => rules.white_value,
        PieceColor::Black => rules.black_value,
    }
}

/// Points for the board winner: the value of every `counted` piece still on
/// the board, plus the queen bonus if the winner banked it
pub fn board_points(
    rules: &RulesConfig,
    bodies: &[RigidBody],
    counted: PieceColor,
    winner_has_queen: bool,
) -> u32 {
    let remaining = bodies
        .iter()
        .filter(|b| b.kind.color() == Some(counted))
        .count() as u32;
    let bonus = if winner_has_queen { rules.queen_bonus } else { 0 };
    remaining * piece_value(rules, counted) + bonus
}
