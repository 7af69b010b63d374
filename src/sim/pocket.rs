//! Pocket capture
//!
//! Runs once per physics sub-step. A body whose center enters a pocket's
//! trigger circle leaves the world immediately.

use glam::DVec2;

use super::body::PocketedPiece;
use super::world::PhysicsWorld;
use crate::config::BoardGeometry;

#[derive(Debug, Clone)]
pub struct PocketDetector {
    pockets: [DVec2; 4],
    trigger_radius_sq: f64,
}

impl PocketDetector {
    pub fn new(geometry: &BoardGeometry) -> Self {
        Self {
            pockets: geometry.pockets,
            trigger_radius_sq: geometry.pocket_trigger_radius * geometry.pocket_trigger_radius,
        }
    }

    pub fn pockets(&self) -> &[DVec2; 4] {
        &self.pockets
    }

    /// Index of the pocket capturing `pos`, if any
    pub fn pocket_at(&self, pos: DVec2) -> Option<usize> {
        self.pockets
            .iter()
            .position(|p| pos.distance_squared(*p) < self.trigger_radius_sq)
    }

    /// Remove every captured body from the world and return their snapshots
    ///
    /// Walks the body list from the back so removals never shift a body that
    /// has not been examined yet. Snapshots come out in that same order.
    pub fn update(&self, world: &mut PhysicsWorld) -> Vec<PocketedPiece> {
        let mut captured = Vec::new();
        for index in (0..world.len()).rev() {
            let pos = world.bodies()[index].pos;
            if self.pocket_at(pos).is_some() {
                let mut body = world.remove_at(index);
                body.active = false;
                log::debug!(
                    "{:?} #{} pocketed at ({:.1}, {:.1})",
                    body.kind,
                    body.id.0,
                    pos.x,
                    pos.y
                );
                captured.push(body.snapshot());
            }
        }
        captured
    }
}
