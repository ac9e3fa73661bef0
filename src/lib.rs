//! Planet SPH - an interactive particle fluid sandbox around a planet and moon
//!
//! Core modules:
//! - `sim`: Per-frame physics (neighbor grid, forces, integration, collisions)
//! - `params`: Enumerated live-tunable parameter schema
//! - `render`: Committed position/color buffer for the external renderer
//! - `scenario`: Shareable scenario tokens
//! - `wasm`: Browser binding (wasm32 only)

pub mod error;
pub mod params;
pub mod render;
pub mod scenario;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use error::SimError;
pub use params::{ParamKey, ParamOutcome, Preset, SimulationParameters};
pub use scenario::Scenario;
pub use sim::{ParticleSystemState, tick};

use glam::DVec3;

/// Simulation configuration constants
pub mod consts {
    /// Host display tick (60 Hz)
    pub const TICK_DT: f64 = 1.0 / 60.0;
    /// Largest host tick accepted by `update`; longer frames are truncated
    pub const MAX_TICK_DT: f64 = 0.1;

    /// Inner timestep scale, co-tuned with the default force magnitudes.
    /// Raw gravity/pressure values are too stiff for a unit step.
    pub const STABILITY_SCALE: f64 = 0.1;

    /// Multiplier taking the physical gravitational constant to simulation scale
    pub const GRAVITY_VISUAL_SCALE: f64 = 1.5e9;
    /// Floor on body separation used in the inverse-square law
    pub const MIN_GRAVITY_DISTANCE: f64 = 0.5;

    /// Velocity retained per tick after integration
    pub const GLOBAL_DAMPING: f64 = 0.995;
    /// Hard cap on particle speed (simulation units per second)
    pub const MAX_PARTICLE_SPEED: f64 = 50.0;

    /// Velocity retained after a particle is pushed out of the moon
    pub const MOON_CONTACT_DAMPING: f64 = 0.92;
    /// Outward kick applied on moon contact
    pub const MOON_REPULSION: f64 = 0.05;
    /// Share of the moon's surface velocity handed to a contacting particle
    pub const MOON_DRAG: f64 = 0.5;

    /// Tangential velocity kept on planet contact
    pub const TANGENTIAL_RETENTION: f64 = 0.98;

    /// Fraction of the tension radius beyond which stretching is resisted
    pub const TENSION_STRETCH_START: f64 = 0.8;

    /// Default seed for headless runs
    pub const DEFAULT_SEED: u64 = 0x5EED_F1D0;
}

/// Convert spherical (r, polar angle from +Y, azimuth around Y) to cartesian
#[inline]
pub fn spherical_to_cartesian(r: f64, polar: f64, azimuth: f64) -> DVec3 {
    let (sin_p, cos_p) = polar.sin_cos();
    let (sin_a, cos_a) = azimuth.sin_cos();
    DVec3::new(r * sin_p * cos_a, r * cos_p, r * sin_p * sin_a)
}

/// Convert cartesian to spherical (r, polar angle from +Y, azimuth around Y)
#[inline]
pub fn cartesian_to_spherical(pos: DVec3) -> (f64, f64, f64) {
    let r = pos.length();
    if r == 0.0 {
        return (0.0, 0.0, 0.0);
    }
    let polar = (pos.y / r).clamp(-1.0, 1.0).acos();
    let azimuth = pos.z.atan2(pos.x);
    (r, polar, azimuth)
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    if !angle.is_finite() {
        return 0.0;
    }
    angle = angle.rem_euclid(TAU);
    if angle >= PI {
        angle -= TAU;
    }
    angle
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_spherical_round_trip() {
        let p = spherical_to_cartesian(5.5, 1.1, -2.0);
        let (r, polar, azimuth) = cartesian_to_spherical(p);
        assert!((r - 5.5).abs() < 1e-12);
        assert!((polar - 1.1).abs() < 1e-12);
        assert!((azimuth + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_pole_is_plus_y() {
        let p = spherical_to_cartesian(2.0, 0.0, 1.0);
        assert!((p - DVec3::new(0.0, 2.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(2.5 * PI) - 0.5 * PI).abs() < 1e-9);
        assert!((normalize_angle(0.5) - 0.5).abs() < 1e-12);
        assert!((normalize_angle(-PI - 0.1) - (PI - 0.1)).abs() < 1e-9);
        assert_eq!(normalize_angle(f64::NAN), 0.0);
    }
}
