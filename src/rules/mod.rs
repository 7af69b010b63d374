//! Carrom rules: players, fouls, queen cover, scoring and turn flow

pub mod foul;
pub mod player;
pub mod queen;
pub mod score;
pub mod turn;

pub use player::{Player, PlayerId};
pub use queen::{CoverOutcome, QueenState};
pub use turn::{ShotOutcome, TurnManager};
