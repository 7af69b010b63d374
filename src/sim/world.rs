//! Physics world: owns the live bodies and advances them

use glam::DVec2;

use super::body::{BodyId, BodyKind, RigidBody};
use super::collision::{clamp_to_bounds, resolve_pair};
use super::events::{CollisionKind, EventQueue, GameEvent};
use crate::config::{Bounds, PhysicsConfig};
use crate::consts::SIM_RATE_HZ;

/// The live body set plus solver settings
#[derive(Debug, Clone)]
pub struct PhysicsWorld {
    bodies: Vec<RigidBody>,
    bounds: Bounds,
    config: PhysicsConfig,
    next_id: u32,
}

impl PhysicsWorld {
    pub fn new(bounds: Bounds, config: PhysicsConfig) -> Self {
        Self {
            bodies: Vec::new(),
            bounds,
            config,
            next_id: 1,
        }
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Live bodies in insertion order
    pub fn bodies(&self) -> &[RigidBody] {
        &self.bodies
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Create a body of `kind` at rest using the kind's attribute table entry
    pub fn spawn(&mut self, kind: BodyKind, pos: DVec2) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        let body = RigidBody::new(id, kind, pos, self.config.attributes(kind));
        self.bodies.push(body);
        id
    }

    /// Add an existing body (e.g. a striker coming back from a pocket)
    pub fn add_body(&mut self, mut body: RigidBody) {
        body.active = true;
        self.next_id = self.next_id.max(body.id.0 + 1);
        self.bodies.push(body);
    }

    pub fn remove_body(&mut self, id: BodyId) -> Option<RigidBody> {
        let index = self.bodies.iter().position(|b| b.id == id)?;
        Some(self.bodies.remove(index))
    }

    /// Remove by index, preserving the order of the remaining bodies
    pub(crate) fn remove_at(&mut self, index: usize) -> RigidBody {
        self.bodies.remove(index)
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
    }

    pub fn get(&self, id: BodyId) -> Option<&RigidBody> {
        self.bodies.iter().find(|b| b.id == id)
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.bodies.iter_mut().find(|b| b.id == id)
    }

    pub fn find_kind(&self, kind: BodyKind) -> Option<&RigidBody> {
        self.bodies.iter().find(|b| b.kind == kind)
    }

    pub fn count_kind(&self, kind: BodyKind) -> usize {
        self.bodies.iter().filter(|b| b.kind == kind).count()
    }

    pub fn contains_kind(&self, kind: BodyKind) -> bool {
        self.bodies.iter().any(|b| b.kind == kind)
    }

    /// True once every live body has come to rest
    pub fn is_settled(&self) -> bool {
        self.bodies.iter().all(|b| b.sleeping)
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.bodies.iter().map(RigidBody::kinetic_energy).sum()
    }

    /// Advance every body by one fixed sub-step and resolve contacts
    pub fn step(&mut self, dt: f64, events: &mut EventQueue) {
        let friction = self.config.friction_base;
        let sleep_speed_sq = self.config.sleep_speed_sq;

        // 1. Integrate
        for body in &mut self.bodies {
            body.integrate(dt, friction, SIM_RATE_HZ, sleep_speed_sq);
        }

        // 2. Iterative contact solver
        for _ in 0..self.config.solver_iterations {
            self.resolve_bodies(events);
            self.resolve_walls(events);
        }
    }

    fn resolve_bodies(&mut self, events: &mut EventQueue) {
        let percent = self.config.position_correction;
        let slop = self.config.penetration_slop;
        let threshold = self.config.collision_event_threshold;

        let n = self.bodies.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (head, tail) = self.bodies.split_at_mut(j);
                let a = &mut head[i];
                let b = &mut tail[0];

                if let Some(impulse) = resolve_pair(a, b, percent, slop) {
                    // A struck body is moving again until the next integrate says otherwise
                    a.sleeping &= a.vel == DVec2::ZERO;
                    b.sleeping &= b.vel == DVec2::ZERO;
                    if impulse > threshold {
                        events.push(GameEvent::Collision {
                            kind: CollisionKind::Body,
                            point: (a.pos + b.pos) * 0.5,
                            impulse,
                        });
                    }
                }
            }
        }
    }

    fn resolve_walls(&mut self, events: &mut EventQueue) {
        let threshold = self.config.collision_event_threshold;
        for body in &mut self.bodies {
            if let Some(impulse) =
                clamp_to_bounds(body, &self.bounds, self.config.wall_restitution)
            {
                if impulse > threshold {
                    events.push(GameEvent::Collision {
                        kind: CollisionKind::Wall,
                        point: body.pos,
                        impulse,
                    });
                }
            }
        }
    }
}
