//! Analytic shot prediction for aim assist
//!
//! Sweeps the striker as a ray against the rails and every other live disk
//! instead of stepping the simulation. The walk stops at the first disk
//! contact, after the reflection budget runs out, or when the
//! friction-limited travel distance is used up.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::body::{BodyId, RigidBody};
use super::collision::{impulse_magnitude, reflect_velocity};
use crate::config::{AimConfig, Bounds};

/// Parametric distances at or below this are treated as "already touching"
const MIN_T: f64 = 1e-3;

/// Forecast striker path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Start point, each impact point, then the end of travel
    pub path: Vec<DVec2>,
    pub first_hit: Option<BodyId>,
    /// Striker center at the moment of first contact
    pub hit_position: Option<DVec2>,
    /// Approximate velocity handed to the struck piece
    pub transferred_velocity: Option<DVec2>,
    /// Rail bounces along the path
    pub reflections: u32,
}

impl Prediction {
    fn start(pos: DVec2) -> Self {
        Self {
            path: vec![pos],
            first_hit: None,
            hit_position: None,
            transferred_velocity: None,
            reflections: 0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Impact {
    Wall { normal: DVec2 },
    Body { index: usize, normal: DVec2 },
}

#[derive(Debug, Clone)]
pub struct ShotPredictor {
    max_reflections: u32,
    travel_factor: f64,
    min_travel: f64,
}

impl ShotPredictor {
    pub fn new(aim: &AimConfig) -> Self {
        Self {
            max_reflections: aim.max_reflections,
            travel_factor: aim.travel_factor,
            min_travel: aim.min_travel,
        }
    }

    /// Predict where `striker` goes if launched with `launch_vel`
    ///
    /// `bodies` is the live body list; the striker itself is skipped by id.
    pub fn predict(
        &self,
        striker: &RigidBody,
        launch_vel: DVec2,
        bodies: &[RigidBody],
        bounds: &Bounds,
    ) -> Prediction {
        let mut prediction = Prediction::start(striker.pos);

        let mut remaining = launch_vel.length() * self.travel_factor;
        if remaining < self.min_travel || launch_vel == DVec2::ZERO {
            return prediction;
        }

        let mut pos = striker.pos;
        let mut vel = launch_vel;

        loop {
            let next = next_impact(pos, vel, striker, bodies, bounds);
            let speed = vel.length();

            let Some((t, impact)) = next.filter(|(t, _)| t * speed <= remaining) else {
                // Nothing within reach: run straight out to the travel limit
                pos += vel / speed * remaining;
                prediction.path.push(pos);
                break;
            };

            pos += vel * t;
            remaining -= t * speed;
            prediction.path.push(pos);

            match impact {
                Impact::Body { index, normal } => {
                    let piece = &bodies[index];
                    let restitution = striker.restitution.min(piece.restitution);
                    let transferred = impulse_magnitude(
                        -vel,
                        normal,
                        restitution,
                        striker.inv_mass + piece.inv_mass,
                    )
                    .map_or(DVec2::ZERO, |j| normal * j * piece.inv_mass);

                    prediction.first_hit = Some(piece.id);
                    prediction.hit_position = Some(pos);
                    prediction.transferred_velocity = Some(transferred);
                    break;
                }
                Impact::Wall { normal } => {
                    vel = reflect_velocity(vel, normal);
                    prediction.reflections += 1;
                    if prediction.reflections >= self.max_reflections {
                        break;
                    }
                }
            }
        }

        prediction
    }
}

/// Nearest future impact along `pos + t * vel`
fn next_impact(
    pos: DVec2,
    vel: DVec2,
    striker: &RigidBody,
    bodies: &[RigidBody],
    bounds: &Bounds,
) -> Option<(f64, Impact)> {
    let mut best: Option<(f64, Impact)> = None;
    let mut consider = |t: f64, impact: Impact| {
        if t > MIN_T && best.is_none_or(|(best_t, _)| t < best_t) {
            best = Some((t, impact));
        }
    };

    // Rails, offset inward by the striker radius
    let r = striker.radius;
    if vel.x > 0.0 {
        consider((bounds.max_x - r - pos.x) / vel.x, Impact::Wall { normal: DVec2::NEG_X });
    } else if vel.x < 0.0 {
        consider((bounds.min_x + r - pos.x) / vel.x, Impact::Wall { normal: DVec2::X });
    }
    if vel.y > 0.0 {
        consider((bounds.max_y - r - pos.y) / vel.y, Impact::Wall { normal: DVec2::NEG_Y });
    } else if vel.y < 0.0 {
        consider((bounds.min_y + r - pos.y) / vel.y, Impact::Wall { normal: DVec2::Y });
    }

    // Disks: smallest root of |pos + t·vel - c|² = (r + r_other)²
    let a = vel.length_squared();
    for (index, body) in bodies.iter().enumerate() {
        if body.id == striker.id {
            continue;
        }
        let diff = pos - body.pos;
        let b = 2.0 * diff.dot(vel);
        let sum_r = r + body.radius;
        let c = diff.length_squared() - sum_r * sum_r;
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            continue;
        }
        let t = (-b - disc.sqrt()) / (2.0 * a);
        let contact = pos + vel * t;
        // Normal from the striker toward the struck disk
        let normal = (body.pos - contact).normalize_or_zero();
        consider(t, Impact::Body { index, normal });
    }

    best
}
