//! Rigid spherical bodies: the planet and its moon
//!
//! Bodies are created once and mutated in place. The moon's position is not
//! integrated; it is derived from its orbit angle every tick.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::normalize_angle;
use crate::params::SimulationParameters;

/// A rigid sphere that attracts particles and repels them on contact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigidBody {
    pub position: DVec3,
    pub radius: f64,
    pub mass: f64,
    /// Spin about +Y (radians, normalized)
    pub rotation_angle: f64,
    /// Spin rate (radians per second)
    pub rotation_speed: f64,
    /// Bumped whenever the radius changes so the renderer rebuilds its mesh
    #[serde(skip)]
    pub geometry_revision: u32,
}

impl RigidBody {
    pub fn new(position: DVec3, radius: f64, mass: f64, rotation_speed: f64) -> Self {
        Self {
            position,
            radius,
            mass,
            rotation_angle: 0.0,
            rotation_speed,
            geometry_revision: 0,
        }
    }

    /// Spin the body by its rotation speed * dt
    pub fn rotate(&mut self, dt: f64) {
        if self.rotation_speed != 0.0 {
            self.rotation_angle = normalize_angle(self.rotation_angle + self.rotation_speed * dt);
        }
    }

    /// Change the radius, flagging the display geometry as stale
    pub fn set_radius(&mut self, radius: f64) {
        if radius != self.radius {
            self.radius = radius;
            self.geometry_revision = self.geometry_revision.wrapping_add(1);
        }
    }

    /// Angular velocity vector (spin is always about +Y)
    #[inline]
    pub fn angular_velocity(&self) -> DVec3 {
        DVec3::new(0.0, self.rotation_speed, 0.0)
    }

    /// Velocity of a point rigidly attached to the spinning body
    #[inline]
    pub fn spin_velocity_at(&self, point: DVec3) -> DVec3 {
        self.angular_velocity().cross(point - self.position)
    }
}

/// A body on a circular orbit in the XZ plane around the planet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Moon {
    pub body: RigidBody,
    pub orbit_radius: f64,
    /// Radians per second
    pub orbital_speed: f64,
    pub orbit_angle: f64,
}

impl Moon {
    pub fn new(center: DVec3, orbit_radius: f64, orbital_speed: f64, body: RigidBody) -> Self {
        let mut moon = Self {
            body,
            orbit_radius,
            orbital_speed,
            orbit_angle: 0.0,
        };
        moon.place(center);
        moon
    }

    /// Derive position from the current orbit angle
    pub fn place(&mut self, center: DVec3) {
        let (sin, cos) = self.orbit_angle.sin_cos();
        self.body.position = center + DVec3::new(cos, 0.0, sin) * self.orbit_radius;
    }

    /// Advance along the orbit and spin
    pub fn advance(&mut self, center: DVec3, dt: f64) {
        self.orbit_angle = normalize_angle(self.orbit_angle + self.orbital_speed * dt);
        self.place(center);
        self.body.rotate(dt);
    }

    /// Linear velocity of the moon's center along its orbit
    pub fn orbital_velocity(&self) -> DVec3 {
        let (sin, cos) = self.orbit_angle.sin_cos();
        DVec3::new(-sin, 0.0, cos) * self.orbit_radius * self.orbital_speed
    }

    /// Velocity of a point on the moon's surface (orbit + spin)
    pub fn surface_velocity_at(&self, point: DVec3) -> DVec3 {
        self.orbital_velocity() + self.body.spin_velocity_at(point)
    }
}

/// The two bodies of the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bodies {
    pub planet: RigidBody,
    pub moon: Moon,
}

impl Bodies {
    /// Build the planet at the origin and the moon at orbit angle zero
    pub fn from_params(params: &SimulationParameters) -> Self {
        let planet = RigidBody::new(
            DVec3::ZERO,
            params.planet_radius,
            params.planet_mass,
            params.planet_rotation_speed,
        );
        let moon_body = RigidBody::new(
            DVec3::ZERO,
            params.moon_radius,
            params.moon_mass,
            params.moon_rotation_speed,
        );
        let moon = Moon::new(
            planet.position,
            params.moon_orbit_radius,
            params.moon_orbital_speed,
            moon_body,
        );
        Self { planet, moon }
    }

    /// Copy live parameters into the bodies without disturbing orbit phase
    pub fn sync(&mut self, params: &SimulationParameters) {
        self.planet.set_radius(params.planet_radius);
        self.planet.mass = params.planet_mass;
        self.planet.rotation_speed = params.planet_rotation_speed;

        self.moon.body.set_radius(params.moon_radius);
        self.moon.body.mass = params.moon_mass;
        self.moon.body.rotation_speed = params.moon_rotation_speed;
        self.moon.orbital_speed = params.moon_orbital_speed;
        if self.moon.orbit_radius != params.moon_orbit_radius {
            self.moon.orbit_radius = params.moon_orbit_radius;
            self.moon.place(self.planet.position);
        }
    }

    /// Advance body rotations and the moon's orbit
    pub fn advance(&mut self, dt: f64) {
        self.planet.rotate(dt);
        self.moon.advance(self.planet.position, dt);
    }

    /// Attracting bodies, in a fixed order
    pub fn attractors(&self) -> [&RigidBody; 2] {
        [&self.planet, &self.moon.body]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_moon_position_is_derived_from_angle() {
        let params = SimulationParameters::default();
        let mut bodies = Bodies::from_params(&params);
        assert!((bodies.moon.body.position - DVec3::new(12.0, 0.0, 0.0)).length() < 1e-12);

        bodies.moon.orbit_angle = FRAC_PI_2;
        bodies.moon.place(bodies.planet.position);
        assert!((bodies.moon.body.position - DVec3::new(0.0, 0.0, 12.0)).length() < 1e-9);
    }

    #[test]
    fn test_moon_stays_on_orbit() {
        let params = SimulationParameters::default();
        let mut bodies = Bodies::from_params(&params);
        for _ in 0..1000 {
            bodies.advance(0.05);
            let r = bodies.moon.body.position.distance(bodies.planet.position);
            assert!((r - params.moon_orbit_radius).abs() < 1e-9);
        }
    }

    #[test]
    fn test_orbital_velocity_is_tangent() {
        let params = SimulationParameters::default();
        let mut bodies = Bodies::from_params(&params);
        bodies.advance(1.3);
        let radial = bodies.moon.body.position - bodies.planet.position;
        let v = bodies.moon.orbital_velocity();
        assert!(v.dot(radial).abs() < 1e-9);
        assert!((v.length() - params.moon_orbit_radius * params.moon_orbital_speed).abs() < 1e-9);
    }

    #[test]
    fn test_radius_change_bumps_revision() {
        let params = SimulationParameters::default();
        let mut bodies = Bodies::from_params(&params);
        let mut changed = params.clone();
        changed.moon_radius = 2.0;
        bodies.sync(&changed);
        assert_eq!(bodies.moon.body.geometry_revision, 1);
        assert_eq!(bodies.planet.geometry_revision, 0);
        bodies.sync(&changed);
        assert_eq!(bodies.moon.body.geometry_revision, 1);
    }

    #[test]
    fn test_spin_velocity() {
        let body = RigidBody::new(DVec3::ZERO, 1.0, 1.0, 2.0);
        let v = body.spin_velocity_at(DVec3::new(1.0, 0.0, 0.0));
        // ω = +Y, r = +X  =>  ω × r = -Z
        assert!((v - DVec3::new(0.0, 0.0, -2.0)).length() < 1e-12);
    }
}
