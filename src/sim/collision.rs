//! Collision detection and response against the planet and moon
//!
//! Runs after integration. A particle inside the moon is pushed onto the
//! moon's surface and dragged along with it; a particle below the fluid
//! shell is lifted back onto the shell and keeps most of its tangential
//! motion. Penetration tests are strict (`<`): a particle exactly on a
//! surface is not touching it.

use glam::DVec3;

use super::body::Bodies;
use crate::consts::{MOON_CONTACT_DAMPING, MOON_DRAG, MOON_REPULSION, TANGENTIAL_RETENTION};
use crate::params::SimulationParameters;

/// Result of a sphere penetration check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether the point is strictly inside the sphere
    pub hit: bool,
    /// Distance from the sphere center
    pub distance: f64,
    /// Outward surface normal at the closest surface point
    pub normal: DVec3,
    /// Depth below the surface (for position correction)
    pub penetration: f64,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            distance: f64::MAX,
            normal: DVec3::ZERO,
            penetration: 0.0,
        }
    }
}

/// Which body (if any) corrected a particle this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    None,
    Moon,
    Planet,
}

/// Corrected particle state
#[derive(Debug, Clone, Copy)]
pub struct Resolved {
    pub position: DVec3,
    pub velocity: DVec3,
    pub contact: Contact,
}

/// Check whether `point` lies strictly inside a sphere.
///
/// A point at the exact center gets `fallback` as its normal.
pub fn sphere_penetration(point: DVec3, center: DVec3, radius: f64, fallback: DVec3) -> CollisionResult {
    let offset = point - center;
    let distance = offset.length();

    if distance < radius {
        let normal = if distance > f64::EPSILON {
            offset / distance
        } else {
            fallback
        };
        return CollisionResult {
            hit: true,
            distance,
            normal,
            penetration: radius - distance,
        };
    }

    CollisionResult {
        distance,
        ..CollisionResult::miss()
    }
}

/// Split a velocity into (normal, tangential) parts
#[inline]
pub fn decompose(velocity: DVec3, normal: DVec3) -> (DVec3, DVec3) {
    let normal_part = normal * velocity.dot(normal);
    (normal_part, velocity - normal_part)
}

/// Resolve penetration against both bodies.
///
/// When a particle is inside both collision shells the body whose center is
/// closer wins; on an exact tie the moon is resolved. A particle lifted onto
/// the fluid shell that lands inside the moon is then pushed out of the moon.
pub fn resolve(
    position: DVec3,
    velocity: DVec3,
    bodies: &Bodies,
    params: &SimulationParameters,
    dt: f64,
) -> Resolved {
    let planet = &bodies.planet;

    let moon_hit = moon_penetration(position, bodies);
    let shell_hit = sphere_penetration(
        position,
        planet.position,
        params.fluid_shell_radius(),
        DVec3::Y,
    );

    let use_moon = moon_hit.hit && (!shell_hit.hit || moon_hit.distance <= shell_hit.distance);

    if use_moon {
        resolve_moon(velocity, &moon_hit, bodies)
    } else if shell_hit.hit {
        let lifted = resolve_planet(velocity, &shell_hit, bodies, params, dt);
        let moon_hit = moon_penetration(lifted.position, bodies);
        if moon_hit.hit {
            resolve_moon(lifted.velocity, &moon_hit, bodies)
        } else {
            lifted
        }
    } else {
        Resolved {
            position,
            velocity,
            contact: Contact::None,
        }
    }
}

fn moon_penetration(point: DVec3, bodies: &Bodies) -> CollisionResult {
    let moon = &bodies.moon.body;
    let outward = (moon.position - bodies.planet.position).normalize_or(DVec3::Y);
    sphere_penetration(point, moon.position, moon.radius, outward)
}

/// Clamp onto the moon's surface and hand the particle the moon's surface motion
fn resolve_moon(velocity: DVec3, hit: &CollisionResult, bodies: &Bodies) -> Resolved {
    let moon = &bodies.moon;
    let position = moon.body.position + hit.normal * moon.body.radius;

    let (_, tangential) = decompose(velocity, hit.normal);
    let (_, surface_tangential) = decompose(moon.surface_velocity_at(position), hit.normal);

    let velocity =
        (tangential + surface_tangential * MOON_DRAG + hit.normal * MOON_REPULSION) * MOON_CONTACT_DAMPING;

    Resolved {
        position,
        velocity,
        contact: Contact::Moon,
    }
}

/// Clamp onto the fluid shell, kill inward motion and couple to planet spin
fn resolve_planet(
    velocity: DVec3,
    hit: &CollisionResult,
    bodies: &Bodies,
    params: &SimulationParameters,
    dt: f64,
) -> Resolved {
    let planet = &bodies.planet;
    let position = planet.position + hit.normal * params.fluid_shell_radius();

    let (normal_part, tangential) = decompose(velocity, hit.normal);
    let normal_part = if velocity.dot(hit.normal) < 0.0 {
        DVec3::ZERO
    } else {
        normal_part * (1.0 - params.boundary_damping)
    };

    let mut tangential = tangential * TANGENTIAL_RETENTION;

    // Circulating current around the spin axis (vanishes at the poles)
    let current_dir = planet.angular_velocity().normalize_or(DVec3::Y).cross(hit.normal);
    tangential += current_dir * (params.current_strength * dt);

    // Drag toward co-rotation with the surface
    let surface = planet.spin_velocity_at(position);
    let (_, surface_tangential) = decompose(surface, hit.normal);
    tangential += (surface_tangential - tangential) * params.surface_friction;

    Resolved {
        position,
        velocity: normal_part + tangential,
        contact: Contact::Planet,
    }
}
