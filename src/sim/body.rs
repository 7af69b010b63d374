//! Rigid disk bodies
//!
//! Every piece on the board is the same concrete type; what differs per kind
//! (radius, mass, restitution) comes from the attribute table in
//! [`PhysicsConfig`](crate::config::PhysicsConfig).

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::config::KindAttributes;

/// Stable body handle, unique for the lifetime of a [`PhysicsWorld`](super::PhysicsWorld)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// Piece colour a player plays for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceColor {
    White,
    Black,
}

impl PieceColor {
    pub fn opposite(self) -> Self {
        match self {
            PieceColor::White => PieceColor::Black,
            PieceColor::Black => PieceColor::White,
        }
    }

    pub fn kind(self) -> BodyKind {
        match self {
            PieceColor::White => BodyKind::White,
            PieceColor::Black => BodyKind::Black,
        }
    }
}

/// What a body is on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyKind {
    White,
    Black,
    Queen,
    Striker,
}

impl BodyKind {
    /// Colour of a carrom man; `None` for the queen and striker
    pub fn color(self) -> Option<PieceColor> {
        match self {
            BodyKind::White => Some(PieceColor::White),
            BodyKind::Black => Some(PieceColor::Black),
            BodyKind::Queen | BodyKind::Striker => None,
        }
    }
}

/// A movable disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigidBody {
    pub id: BodyId,
    pub kind: BodyKind,
    pub pos: DVec2,
    pub vel: DVec2,
    pub radius: f64,
    /// 0 means static (infinite mass)
    pub mass: f64,
    pub inv_mass: f64,
    pub restitution: f64,
    pub sleeping: bool,
    /// Cleared when pocketed
    pub active: bool,
}

impl RigidBody {
    pub fn new(id: BodyId, kind: BodyKind, pos: DVec2, attrs: KindAttributes) -> Self {
        Self {
            id,
            kind,
            pos,
            vel: DVec2::ZERO,
            radius: attrs.radius,
            mass: attrs.mass,
            inv_mass: if attrs.mass == 0.0 { 0.0 } else { 1.0 / attrs.mass },
            restitution: attrs.restitution,
            sleeping: true,
            active: true,
        }
    }

    pub fn is_static(&self) -> bool {
        self.inv_mass == 0.0
    }

    /// Give the body a velocity and wake it
    pub fn launch(&mut self, vel: DVec2) {
        self.vel = vel;
        self.sleeping = false;
    }

    /// Stop the body dead at `pos`
    pub fn place(&mut self, pos: DVec2) {
        self.pos = pos;
        self.vel = DVec2::ZERO;
        self.sleeping = true;
    }

    /// Apply friction, settle slow bodies, then advance position
    ///
    /// Friction is a per-tick retention factor defined at `ref_hz`, scaled so
    /// the decay per second is independent of `dt`.
    pub fn integrate(&mut self, dt: f64, friction_base: f64, ref_hz: f64, sleep_speed_sq: f64) {
        self.vel *= friction_base.powf(dt * ref_hz);

        if self.vel.length_squared() < sleep_speed_sq {
            self.vel = DVec2::ZERO;
            self.sleeping = true;
        } else {
            self.sleeping = false;
        }

        self.pos += self.vel * dt;
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.vel.length_squared()
    }

    pub fn momentum(&self) -> DVec2 {
        self.vel * self.mass
    }

    pub fn snapshot(&self) -> PocketedPiece {
        PocketedPiece {
            id: self.id,
            kind: self.kind,
            pos: self.pos,
        }
    }
}

/// By-value record of a body at the moment it dropped into a pocket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PocketedPiece {
    pub id: BodyId,
    pub kind: BodyKind,
    pub pos: DVec2,
}
