//! Standard board arrangement
//!
//! Queen in the center, an alternating inner ring of six, and an outer ring
//! of six black "points" with six white "flats" wedged between them.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_6};

use glam::DVec2;

use super::body::{BodyId, BodyKind};
use super::world::PhysicsWorld;
use crate::config::{Baseline, BoardGeometry};

/// Carrom men of each colour in a full set
pub const PIECES_PER_COLOR: usize = 9;

/// Center spacing factor: tight packing with a hair of clearance
const PACKING: f64 = 2.02;

/// Place the 19 pieces and the striker; returns the striker id
pub fn arrange_standard(
    world: &mut PhysicsWorld,
    geometry: &BoardGeometry,
    striker_at: Baseline,
) -> BodyId {
    let center = geometry.center;
    let offset = world.config().piece.radius * PACKING;

    world.spawn(BodyKind::Queen, center);

    // Hexagon directions starting at 12 o'clock
    let dirs: Vec<DVec2> = (0..6)
        .map(|i| DVec2::from_angle(-FRAC_PI_2 + i as f64 * FRAC_PI_3))
        .collect();

    for (i, dir) in dirs.iter().enumerate() {
        let kind = if i % 2 == 0 { BodyKind::White } else { BodyKind::Black };
        world.spawn(kind, center + *dir * offset);
    }

    let flat_dist = offset * 3f64.sqrt();
    for (i, dir) in dirs.iter().enumerate() {
        world.spawn(BodyKind::Black, center + *dir * offset * 2.0);
        let flat = DVec2::from_angle(-FRAC_PI_2 + i as f64 * FRAC_PI_3 + FRAC_PI_6);
        world.spawn(BodyKind::White, center + flat * flat_dist);
    }

    world.spawn(BodyKind::Striker, geometry.baseline(striker_at).midpoint())
}
