//! Carrom Core - board simulation for the game of carrom
//!
//! Core modules:
//! - `sim`: Deterministic simulation (disk physics, pockets, shot prediction, match phases)
//! - `rules`: Turn/rule engine (fouls, dues, queen cover, scoring, board/match end)
//! - `aiming`: Pointer-driven aim and striker positioning
//! - `ai`: Heuristic computer opponent
//! - `config`: Board geometry and tuning, overridable from JSON
//! - `settings`: Player preferences

pub mod ai;
pub mod aiming;
pub mod config;
pub mod error;
pub mod rules;
pub mod settings;
pub mod sim;

pub use config::GameConfig;
pub use error::Error;
pub use settings::{Difficulty, Settings};

use glam::DVec2;

/// Default tuning constants for the classic 900-unit board
pub mod consts {
    /// Fixed simulation rate (120 Hz)
    pub const SIM_RATE_HZ: f64 = 120.0;
    /// Fixed simulation timestep
    pub const SIM_DT: f64 = 1.0 / SIM_RATE_HZ;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 10;
    /// Longest real frame time fed into the accumulator (seconds)
    pub const MAX_FRAME_TIME: f64 = 0.25;

    /// Board virtual size and its center
    pub const BOARD_SIZE: f64 = 900.0;
    pub const BOARD_CENTER: f64 = BOARD_SIZE / 2.0;
    /// Playing surface edges
    pub const BOUNDS_MIN: f64 = 90.0;
    pub const BOUNDS_MAX: f64 = 810.0;
    /// Pocket centers sit this far from the board center on each axis
    pub const POCKET_OFFSET: f64 = 345.0;
    pub const POCKET_TRIGGER_RADIUS: f64 = 32.0;
    /// Baseline rails (inner and outer line distance from center)
    pub const INNER_BASE: f64 = 235.0;
    pub const OUTER_BASE: f64 = 265.0;

    /// Carrom men and queen
    pub const PIECE_RADIUS: f64 = 18.0;
    pub const PIECE_MASS: f64 = 1.0;
    pub const PIECE_RESTITUTION: f64 = 0.88;
    /// Striker
    pub const STRIKER_RADIUS: f64 = 24.0;
    pub const STRIKER_MASS: f64 = 2.85;
    pub const STRIKER_RESTITUTION: f64 = 0.85;
    /// Cushion bounce
    pub const WALL_RESTITUTION: f64 = 0.80;

    /// Per-tick velocity retention at the 120 Hz reference rate
    pub const FRICTION_BASE: f64 = 0.985;
    /// Bodies slower than this (squared, units²/s²) are put to sleep
    pub const SLEEP_SPEED_SQ: f64 = 0.09;
    pub const SOLVER_ITERATIONS: u32 = 20;
    pub const POSITION_CORRECTION: f64 = 0.8;
    pub const PENETRATION_SLOP: f64 = 0.01;
    /// Minimum impulse reported as a collision event
    pub const COLLISION_EVENT_THRESHOLD: f64 = 0.5;

    /// Match ends when any player reaches this score
    pub const WINNING_SCORE: u32 = 150;
}

/// Point on the segment `a..b` closest to `p`
#[inline]
pub fn closest_point_on_segment(p: DVec2, a: DVec2, b: DVec2) -> DVec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-12 {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Heading of a vector in degrees, normalized to [0, 360)
#[inline]
pub fn heading_degrees(v: DVec2) -> f64 {
    let deg = v.y.atan2(v.x).to_degrees();
    if deg < 0.0 { deg + 360.0 } else { deg }
}
