//! Collision detection and response for disks on a rectangular board
//!
//! Body-body contacts use Baumgarte-style positional correction followed by
//! a restitution impulse along the contact normal. Rails clamp and reflect.

use glam::DVec2;

use super::body::RigidBody;
use crate::config::Bounds;

/// Separation substituted when two centers coincide exactly
const COINCIDENT_DISTANCE: f64 = 0.1;

/// Result of a disk-disk overlap test
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    /// Unit normal pointing from the first body toward the second
    pub normal: DVec2,
    /// Overlap depth along the normal
    pub penetration: f64,
}

/// Test two disks for overlap
///
/// Uses squared distance for the rejection test; the square root is only
/// taken once overlap is confirmed.
pub fn circle_contact(a_pos: DVec2, a_radius: f64, b_pos: DVec2, b_radius: f64) -> Option<Contact> {
    let diff = b_pos - a_pos;
    let dist_sq = diff.length_squared();
    let radius_sum = a_radius + b_radius;

    if dist_sq >= radius_sum * radius_sum {
        return None;
    }

    let dist = dist_sq.sqrt();
    let (normal, dist) = if dist == 0.0 {
        (DVec2::X, COINCIDENT_DISTANCE)
    } else {
        (diff / dist, dist)
    };

    Some(Contact {
        normal,
        penetration: radius_sum - dist,
    })
}

/// Push overlapping bodies apart in proportion to their inverse masses
pub fn correct_positions(
    a: &mut RigidBody,
    b: &mut RigidBody,
    contact: &Contact,
    percent: f64,
    slop: f64,
) {
    let inv_sum = a.inv_mass + b.inv_mass;
    if inv_sum == 0.0 {
        return;
    }
    let magnitude = (contact.penetration - slop).max(0.0) / inv_sum * percent;
    let correction = contact.normal * magnitude;
    a.pos -= correction * a.inv_mass;
    b.pos += correction * b.inv_mass;
}

/// Scalar impulse for a contact, or `None` if the bodies are separating
/// or both static
///
/// `rel_vel` is the velocity of the second body relative to the first.
#[inline]
pub fn impulse_magnitude(
    rel_vel: DVec2,
    normal: DVec2,
    restitution: f64,
    inv_mass_sum: f64,
) -> Option<f64> {
    if inv_mass_sum == 0.0 {
        return None;
    }
    let vel_along_normal = rel_vel.dot(normal);
    if vel_along_normal > 0.0 {
        return None;
    }
    Some(-(1.0 + restitution) * vel_along_normal / inv_mass_sum)
}

/// Exchange momentum along the contact normal
///
/// Restitution is the lesser of the two bodies'. Returns the impulse applied.
pub fn apply_impulse(a: &mut RigidBody, b: &mut RigidBody, normal: DVec2) -> Option<f64> {
    let restitution = a.restitution.min(b.restitution);
    let j = impulse_magnitude(b.vel - a.vel, normal, restitution, a.inv_mass + b.inv_mass)?;

    let impulse = normal * j;
    a.vel -= impulse * a.inv_mass;
    b.vel += impulse * b.inv_mass;
    Some(j)
}

/// Full contact response for one body pair
///
/// Returns the impulse when one was applied.
pub fn resolve_pair(a: &mut RigidBody, b: &mut RigidBody, percent: f64, slop: f64) -> Option<f64> {
    let contact = circle_contact(a.pos, a.radius, b.pos, b.radius)?;
    correct_positions(a, b, &contact, percent, slop);
    apply_impulse(a, b, contact.normal)
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: DVec2, normal: DVec2) -> DVec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Clamp a body inside the rails and bounce it off any rail it is moving into
///
/// Returns the largest normal speed removed by a bounce, scaled by mass, so
/// callers can report hard cushion hits.
pub fn clamp_to_bounds(
    body: &mut RigidBody,
    bounds: &Bounds,
    wall_restitution: f64,
) -> Option<f64> {
    let mut hit: Option<f64> = None;
    let mut record = |speed: f64, mass: f64| {
        let impulse = (1.0 + wall_restitution) * speed.abs() * mass;
        hit = Some(hit.map_or(impulse, |h| h.max(impulse)));
    };

    if body.pos.x - body.radius < bounds.min_x {
        body.pos.x = bounds.min_x + body.radius;
        if body.vel.x < 0.0 {
            record(body.vel.x, body.mass);
            body.vel.x *= -wall_restitution;
        }
    } else if body.pos.x + body.radius > bounds.max_x {
        body.pos.x = bounds.max_x - body.radius;
        if body.vel.x > 0.0 {
            record(body.vel.x, body.mass);
            body.vel.x *= -wall_restitution;
        }
    }

    if body.pos.y - body.radius < bounds.min_y {
        body.pos.y = bounds.min_y + body.radius;
        if body.vel.y < 0.0 {
            record(body.vel.y, body.mass);
            body.vel.y *= -wall_restitution;
        }
    } else if body.pos.y + body.radius > bounds.max_y {
        body.pos.y = bounds.max_y - body.radius;
        if body.vel.y > 0.0 {
            record(body.vel.y, body.mass);
            body.vel.y *= -wall_restitution;
        }
    }

    hit
}
