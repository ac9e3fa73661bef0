//! Force model: gravity, SPH pressure/viscosity, surface tension and cohesion
//!
//! Everything here reads a frozen particle snapshot and returns values; no
//! function mutates particle state. Forces are per unit mass (the integrator
//! adds `force * dt` straight to velocity).

use glam::DVec3;

use super::body::RigidBody;
use super::kernels;
use super::spatial::SpatialIndex;
use super::state::Particle;
use crate::consts::{MIN_GRAVITY_DISTANCE, TENSION_STRETCH_START};
use crate::params::SimulationParameters;

/// Per-family contributions to a particle's net force
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ForceBreakdown {
    pub gravity: DVec3,
    pub pressure: DVec3,
    pub viscosity: DVec3,
    pub tension: DVec3,
    pub cohesion: DVec3,
}

impl ForceBreakdown {
    #[inline]
    pub fn total(&self) -> DVec3 {
        self.gravity + self.pressure + self.viscosity + self.tension + self.cohesion
    }
}

/// Inverse-square attraction toward every body.
///
/// Separation is floored at `MIN_GRAVITY_DISTANCE`; a particle sitting
/// exactly on a body's center has no direction and receives nothing from it.
pub fn gravity_force(position: DVec3, bodies: &[&RigidBody], g_scaled: f64) -> DVec3 {
    let mut force = DVec3::ZERO;
    for body in bodies {
        let offset = body.position - position;
        let dist = offset.length();
        if dist <= f64::EPSILON {
            continue;
        }
        let clamped = dist.max(MIN_GRAVITY_DISTANCE);
        force += offset / dist * (g_scaled * body.mass / (clamped * clamped));
    }
    force
}

/// SPH density at particle `i`: self term plus poly6-weighted neighbor mass
pub fn density_at(i: usize, particles: &[Particle], index: &SpatialIndex, params: &SimulationParameters) -> f64 {
    let h = params.smoothing_length;
    let mass = params.particle_mass;
    let pos = particles[i].position;

    let mut density = mass * kernels::poly6(0.0, h);
    index.for_each_candidate(pos, h, |j| {
        if j == i {
            return;
        }
        let r = pos.distance(particles[j].position);
        if r < h {
            density += mass * kernels::poly6(r, h);
        }
    });
    density
}

/// Equation of state. Negative below rest density.
#[inline]
pub fn pressure_from_density(density: f64, params: &SimulationParameters) -> f64 {
    params.gas_constant * (density - params.rest_density)
}

/// Compute `density` and `pressure` for every particle in place.
///
/// Positions are read, never written, so the result does not depend on
/// iteration order.
pub fn update_densities(particles: &mut [Particle], index: &SpatialIndex, params: &SimulationParameters) {
    let densities: Vec<f64> = (0..particles.len())
        .map(|i| density_at(i, particles, index, params))
        .collect();
    for (p, density) in particles.iter_mut().zip(densities) {
        p.density = density;
        p.pressure = pressure_from_density(density, params);
    }
}

/// All neighbor-driven and body-driven forces acting on particle `i`.
///
/// A single grid walk at the larger of the SPH and tension radii feeds every
/// family. Coincident neighbors (r = 0) are skipped for the directional terms.
pub fn force_breakdown(
    i: usize,
    particles: &[Particle],
    index: &SpatialIndex,
    bodies: &[&RigidBody],
    params: &SimulationParameters,
) -> ForceBreakdown {
    let me = &particles[i];
    let h = params.smoothing_length;
    let tension_radius = params.surface_tension_radius;
    let stretch_start = tension_radius * TENSION_STRETCH_START;
    let stretch_span = tension_radius - stretch_start;
    let mass = params.particle_mass;

    let mut out = ForceBreakdown {
        gravity: gravity_force(me.position, bodies, params.scaled_gravity()),
        ..Default::default()
    };

    let mut centroid = DVec3::ZERO;
    let mut cohesion_count = 0usize;

    index.for_each_candidate(me.position, params.interaction_radius(), |j| {
        if j == i {
            return;
        }
        let other = &particles[j];
        let offset = other.position - me.position;
        let r = offset.length();

        if r < tension_radius {
            centroid += other.position;
            cohesion_count += 1;
        }
        if r <= f64::EPSILON {
            return;
        }
        let dir = offset / r;

        if r < h && other.density > 0.0 {
            let grad = kernels::spiky_gradient(r, h);
            out.pressure += dir * (mass * grad * (me.pressure + other.pressure) / (2.0 * other.density));

            let lap = kernels::viscosity_laplacian(r, h);
            out.viscosity += (other.velocity - me.velocity) * (lap * params.viscosity * mass / other.density);
        }

        if r < tension_radius {
            out.tension += dir * ((1.0 - r / tension_radius) * params.surface_tension_strength);
            if r > stretch_start && stretch_span > 0.0 {
                out.tension += dir * (params.tension_resistance * (r - stretch_start) / stretch_span);
            }
        }
    });

    if cohesion_count > 0 {
        let centroid = centroid / cohesion_count as f64;
        out.cohesion = (centroid - me.position) * params.cohesion_strength;
    }

    out
}

/// Net force on particle `i`
#[inline]
pub fn net_force(
    i: usize,
    particles: &[Particle],
    index: &SpatialIndex,
    bodies: &[&RigidBody],
    params: &SimulationParameters,
) -> DVec3 {
    force_breakdown(i, particles, index, bodies, params).total()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle_at(position: DVec3) -> Particle {
        Particle {
            position,
            ..Default::default()
        }
    }

    fn no_gravity() -> SimulationParameters {
        SimulationParameters {
            gravitational_constant: 0.0,
            ..Default::default()
        }
    }

    fn setup(positions: &[DVec3], params: &SimulationParameters) -> (Vec<Particle>, SpatialIndex) {
        let mut particles: Vec<Particle> = positions.iter().copied().map(particle_at).collect();
        let index = SpatialIndex::build(positions, params.interaction_radius());
        update_densities(&mut particles, &index, params);
        (particles, index)
    }

    #[test]
    fn test_gravity_points_at_body() {
        let body = RigidBody::new(DVec3::ZERO, 1.0, 100.0, 0.0);
        let f = gravity_force(DVec3::new(4.0, 0.0, 0.0), &[&body], 0.1);
        assert!(f.x < 0.0);
        assert!(f.y.abs() < 1e-12 && f.z.abs() < 1e-12);
        assert!((f.length() - 0.1 * 100.0 / 16.0).abs() < 1e-12);
    }

    #[test]
    fn test_gravity_distance_floor() {
        let body = RigidBody::new(DVec3::ZERO, 1.0, 100.0, 0.0);
        let near = gravity_force(DVec3::new(0.01, 0.0, 0.0), &[&body], 1.0);
        let floor = gravity_force(DVec3::new(MIN_GRAVITY_DISTANCE, 0.0, 0.0), &[&body], 1.0);
        assert!((near.length() - floor.length()).abs() < 1e-9);
        assert_eq!(gravity_force(DVec3::ZERO, &[&body], 1.0), DVec3::ZERO);
    }

    #[test]
    fn test_isolated_density_is_self_term() {
        let params = no_gravity();
        let (particles, _) = setup(&[DVec3::ZERO], &params);
        let expected = params.particle_mass * kernels::poly6(0.0, params.smoothing_length);
        assert!((particles[0].density - expected).abs() < 1e-12);
        assert!(
            (particles[0].pressure - params.gas_constant * (expected - params.rest_density)).abs()
                < 1e-12
        );
    }

    #[test]
    fn test_density_grows_with_neighbors() {
        let params = no_gravity();
        let (alone, _) = setup(&[DVec3::ZERO], &params);
        let (crowd, _) = setup(
            &[DVec3::ZERO, DVec3::new(0.3, 0.0, 0.0), DVec3::new(0.0, 0.3, 0.0)],
            &params,
        );
        assert!(crowd[0].density > alone[0].density);
    }

    #[test]
    fn test_compressed_pair_repels() {
        let params = SimulationParameters {
            surface_tension_strength: 0.0,
            cohesion_strength: 0.0,
            tension_resistance: 0.0,
            rest_density: 0.01,
            ..no_gravity()
        };
        let (particles, index) = setup(&[DVec3::ZERO, DVec3::new(0.2, 0.0, 0.0)], &params);
        let f = force_breakdown(0, &particles, &index, &[], &params);
        assert!(f.pressure.x < 0.0, "pressure should push away: {:?}", f.pressure);
        let g = force_breakdown(1, &particles, &index, &[], &params);
        assert!((f.pressure + g.pressure).length() < 1e-9);
    }

    #[test]
    fn test_viscosity_pulls_velocities_together() {
        let params = no_gravity();
        let (mut particles, index) = setup(&[DVec3::ZERO, DVec3::new(0.4, 0.0, 0.0)], &params);
        particles[1].velocity = DVec3::new(0.0, 1.0, 0.0);
        let f = force_breakdown(0, &particles, &index, &[], &params);
        assert!(f.viscosity.y > 0.0);
    }

    #[test]
    fn test_tension_and_cohesion_attract() {
        let params = SimulationParameters {
            gas_constant: 0.0,
            viscosity: 0.0,
            ..no_gravity()
        };
        let (particles, index) = setup(&[DVec3::ZERO, DVec3::new(1.1, 0.0, 0.0)], &params);
        let f = force_breakdown(0, &particles, &index, &[], &params);
        assert!(f.tension.x > 0.0);
        assert!(f.cohesion.x > 0.0);
        assert_eq!(f.pressure, DVec3::ZERO);
    }

    #[test]
    fn test_stretch_resistance_kicks_in() {
        let base = SimulationParameters {
            gas_constant: 0.0,
            viscosity: 0.0,
            tension_resistance: 0.0,
            ..no_gravity()
        };
        let resisting = SimulationParameters {
            tension_resistance: 2.0,
            ..base.clone()
        };
        // Beyond 80% of the tension radius
        let far = DVec3::new(base.surface_tension_radius * 0.9, 0.0, 0.0);
        let (particles, index) = setup(&[DVec3::ZERO, far], &base);
        let loose = force_breakdown(0, &particles, &index, &[], &base);
        let tight = force_breakdown(0, &particles, &index, &[], &resisting);
        assert!(tight.tension.x > loose.tension.x);

        // Inside 80% the resistance term is absent
        let near = DVec3::new(base.surface_tension_radius * 0.5, 0.0, 0.0);
        let (particles, index) = setup(&[DVec3::ZERO, near], &base);
        let loose = force_breakdown(0, &particles, &index, &[], &base);
        let tight = force_breakdown(0, &particles, &index, &[], &resisting);
        assert_eq!(tight.tension, loose.tension);
    }

    #[test]
    fn test_coincident_particles_stay_finite() {
        let params = no_gravity();
        let (particles, index) = setup(&[DVec3::ONE, DVec3::ONE, DVec3::ONE], &params);
        for i in 0..3 {
            let f = net_force(i, &particles, &index, &[], &params);
            assert!(f.is_finite());
        }
    }

    #[test]
    fn test_out_of_range_neighbors_ignored() {
        let params = no_gravity();
        let (particles, index) = setup(&[DVec3::ZERO, DVec3::new(3.0, 0.0, 0.0)], &params);
        let f = force_breakdown(0, &particles, &index, &[], &params);
        assert_eq!(f.total(), DVec3::ZERO);
    }
}
