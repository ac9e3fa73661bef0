//! Semi-implicit Euler with global velocity damping
//!
//! v += F·dt; v *= damping; x += v·dt

use glam::DVec3;

use super::state::Particle;
use crate::consts::{MAX_PARTICLE_SPEED, STABILITY_SCALE};

/// Effective physics timestep for one host tick
#[inline]
pub fn effective_dt(dt_tick: f64, time_scale: f64) -> f64 {
    dt_tick * time_scale * STABILITY_SCALE
}

/// Advance one particle. Returns `(new_velocity, new_position)`.
///
/// Speed is capped at `MAX_PARTICLE_SPEED` after damping.
#[inline]
pub fn step(particle: &Particle, force: DVec3, dt: f64, damping: f64) -> (DVec3, DVec3) {
    let mut velocity = (particle.velocity + force * dt) * damping;
    let speed_sq = velocity.length_squared();
    if speed_sq > MAX_PARTICLE_SPEED * MAX_PARTICLE_SPEED {
        velocity *= MAX_PARTICLE_SPEED / speed_sq.sqrt();
    }
    let position = particle.position + velocity * dt;
    (velocity, position)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_dt_freezes_position() {
        let p = Particle {
            position: DVec3::new(1.0, 2.0, 3.0),
            velocity: DVec3::new(5.0, 0.0, 0.0),
            ..Default::default()
        };
        let (_, x) = step(&p, DVec3::new(100.0, 0.0, 0.0), 0.0, 0.99);
        assert_eq!(x, p.position);
    }

    #[test]
    fn test_semi_implicit_order() {
        let p = Particle::default();
        let (v, x) = step(&p, DVec3::new(2.0, 0.0, 0.0), 0.5, 1.0);
        // Velocity is updated first, then used for position
        assert!((v.x - 1.0).abs() < 1e-12);
        assert!((x.x - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_damping_applies() {
        let p = Particle {
            velocity: DVec3::new(1.0, 0.0, 0.0),
            ..Default::default()
        };
        let (v, _) = step(&p, DVec3::ZERO, 0.1, 0.9);
        assert!((v.x - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_speed_cap() {
        let p = Particle::default();
        let (v, _) = step(&p, DVec3::new(1.0e9, 0.0, 0.0), 1.0, 1.0);
        assert!((v.length() - MAX_PARTICLE_SPEED).abs() < 1e-9);
    }

    #[test]
    fn test_effective_dt_scales() {
        assert_eq!(effective_dt(1.0 / 60.0, 0.0), 0.0);
        assert!((effective_dt(1.0, 2.0) - 2.0 * STABILITY_SCALE).abs() < 1e-12);
    }
}
