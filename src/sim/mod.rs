//! Deterministic simulation module
//!
//! Board physics and match flow. This module must stay deterministic:
//! - Fixed timestep only
//! - Stable iteration order (insertion order of the body list)
//! - No rendering, audio or platform dependencies

pub mod body;
pub mod collision;
pub mod events;
pub mod pocket;
pub mod predictor;
pub mod setup;
pub mod state;
pub mod tick;
pub mod world;

pub use body::{BodyId, BodyKind, PieceColor, PocketedPiece, RigidBody};
pub use collision::{Contact, circle_contact, reflect_velocity, resolve_pair};
pub use events::{CollisionKind, EventQueue, GameEvent};
pub use pocket::PocketDetector;
pub use predictor::{Prediction, ShotPredictor};
pub use setup::{PIECES_PER_COLOR, arrange_standard};
pub use state::{Game, GamePhase};
pub use tick::{FrameClock, tick};
pub use world::PhysicsWorld;
