//! Live-tunable simulation parameters
//!
//! Every name the UI may send through `set_parameter` is enumerated in
//! [`ParamKey`]. Values are clamped into their declared range on the way in,
//! so a slider can never push the simulation into a non-finite state.

use serde::{Deserialize, Serialize};

use crate::consts::GLOBAL_DAMPING;
use crate::error::SimError;

/// Named, jointly-tuned parameter sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Preset {
    #[default]
    Water,
    Honey,
    Mist,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Water => "Water",
            Preset::Honey => "Honey",
            Preset::Mist => "Mist",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "water" => Some(Preset::Water),
            "honey" => Some(Preset::Honey),
            "mist" | "gas" => Some(Preset::Mist),
            _ => None,
        }
    }
}

/// Every recognized parameter name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKey {
    PlanetRadius,
    PlanetMass,
    PlanetRotationSpeed,
    MoonRadius,
    MoonMass,
    MoonOrbitRadius,
    MoonOrbitalSpeed,
    MoonRotationSpeed,
    Viscosity,
    SmoothingLength,
    GasConstant,
    RestDensity,
    ParticleMass,
    SurfaceTensionStrength,
    SurfaceTensionRadius,
    CohesionStrength,
    TensionResistance,
    BoundaryDamping,
    SurfaceFriction,
    CurrentStrength,
    FluidHeight,
    FluidSpread,
    TimeScale,
    ParticleCount,
    GravitationalConstant,
    GlobalDamping,
}

/// What the owning state must do after a parameter changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamEffect {
    None,
    /// Planet or fluid shell moved; particles keep their relative height
    ReprojectFluid,
    /// Particle array is rebuilt from scratch
    Reinitialize,
}

impl ParamKey {
    pub const ALL: [ParamKey; 26] = [
        ParamKey::PlanetRadius,
        ParamKey::PlanetMass,
        ParamKey::PlanetRotationSpeed,
        ParamKey::MoonRadius,
        ParamKey::MoonMass,
        ParamKey::MoonOrbitRadius,
        ParamKey::MoonOrbitalSpeed,
        ParamKey::MoonRotationSpeed,
        ParamKey::Viscosity,
        ParamKey::SmoothingLength,
        ParamKey::GasConstant,
        ParamKey::RestDensity,
        ParamKey::ParticleMass,
        ParamKey::SurfaceTensionStrength,
        ParamKey::SurfaceTensionRadius,
        ParamKey::CohesionStrength,
        ParamKey::TensionResistance,
        ParamKey::BoundaryDamping,
        ParamKey::SurfaceFriction,
        ParamKey::CurrentStrength,
        ParamKey::FluidHeight,
        ParamKey::FluidSpread,
        ParamKey::TimeScale,
        ParamKey::ParticleCount,
        ParamKey::GravitationalConstant,
        ParamKey::GlobalDamping,
    ];

    /// Wire name used by the UI and scenario tokens
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKey::PlanetRadius => "planetRadius",
            ParamKey::PlanetMass => "planetMass",
            ParamKey::PlanetRotationSpeed => "planetRotationSpeed",
            ParamKey::MoonRadius => "moonRadius",
            ParamKey::MoonMass => "moonMass",
            ParamKey::MoonOrbitRadius => "moonOrbitRadius",
            ParamKey::MoonOrbitalSpeed => "moonOrbitalSpeed",
            ParamKey::MoonRotationSpeed => "moonRotationSpeed",
            ParamKey::Viscosity => "viscosity",
            ParamKey::SmoothingLength => "smoothingLength",
            ParamKey::GasConstant => "gasConstant",
            ParamKey::RestDensity => "restDensity",
            ParamKey::ParticleMass => "particleMass",
            ParamKey::SurfaceTensionStrength => "surfaceTensionStrength",
            ParamKey::SurfaceTensionRadius => "surfaceTensionRadius",
            ParamKey::CohesionStrength => "cohesionStrength",
            ParamKey::TensionResistance => "tensionResistance",
            ParamKey::BoundaryDamping => "boundaryDamping",
            ParamKey::SurfaceFriction => "surfaceFriction",
            ParamKey::CurrentStrength => "currentStrength",
            ParamKey::FluidHeight => "fluidHeight",
            ParamKey::FluidSpread => "fluidSpread",
            ParamKey::TimeScale => "timeScale",
            ParamKey::ParticleCount => "particleCount",
            ParamKey::GravitationalConstant => "gravitationalConstant",
            ParamKey::GlobalDamping => "globalDamping",
        }
    }

    /// Look up a wire name. `gravity` is accepted for older scenario tokens.
    pub fn from_name(name: &str) -> Option<Self> {
        if name == "gravity" {
            return Some(ParamKey::GravitationalConstant);
        }
        Self::ALL.iter().copied().find(|k| k.as_str() == name)
    }

    /// Declared inclusive range
    pub fn range(&self) -> (f64, f64) {
        use std::f64::consts::PI;
        match self {
            ParamKey::PlanetRadius => (0.5, 50.0),
            ParamKey::PlanetMass => (0.0, 1.0e5),
            ParamKey::PlanetRotationSpeed => (-5.0, 5.0),
            ParamKey::MoonRadius => (0.1, 10.0),
            ParamKey::MoonMass => (0.0, 1.0e5),
            ParamKey::MoonOrbitRadius => (1.0, 200.0),
            ParamKey::MoonOrbitalSpeed => (-5.0, 5.0),
            ParamKey::MoonRotationSpeed => (-5.0, 5.0),
            ParamKey::Viscosity => (0.0, 20.0),
            ParamKey::SmoothingLength => (0.05, 10.0),
            ParamKey::GasConstant => (0.0, 100.0),
            ParamKey::RestDensity => (0.01, 1000.0),
            ParamKey::ParticleMass => (0.01, 100.0),
            ParamKey::SurfaceTensionStrength => (0.0, 20.0),
            ParamKey::SurfaceTensionRadius => (0.05, 10.0),
            ParamKey::CohesionStrength => (0.0, 20.0),
            ParamKey::TensionResistance => (0.0, 20.0),
            ParamKey::BoundaryDamping => (0.0, 1.0),
            ParamKey::SurfaceFriction => (0.0, 1.0),
            ParamKey::CurrentStrength => (0.0, 10.0),
            ParamKey::FluidHeight => (0.0, 10.0),
            ParamKey::FluidSpread => (0.0, PI),
            ParamKey::TimeScale => (0.0, 10.0),
            ParamKey::ParticleCount => (0.0, 20_000.0),
            ParamKey::GravitationalConstant => (0.0, 1.0e-8),
            ParamKey::GlobalDamping => (0.5, 1.0),
        }
    }

    pub fn effect(&self) -> ParamEffect {
        match self {
            ParamKey::PlanetRadius | ParamKey::FluidHeight => ParamEffect::ReprojectFluid,
            ParamKey::ParticleCount => ParamEffect::Reinitialize,
            _ => ParamEffect::None,
        }
    }
}

/// Result of a single `set_parameter` call
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamOutcome {
    /// Value was in range and stored as given
    Applied(f64),
    /// Value was out of range (or infinite) and the nearest bound was stored
    Clamped { requested: f64, applied: f64 },
    /// NaN; the previous value is kept
    Rejected,
    /// Name not recognized; nothing changed
    Unknown,
}

impl ParamOutcome {
    /// Whether the stored value may have changed
    pub fn changed(&self) -> bool {
        matches!(self, ParamOutcome::Applied(_) | ParamOutcome::Clamped { .. })
    }
}

/// The complete, typed parameter set read by the physics step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulationParameters {
    // === Planet ===
    pub planet_radius: f64,
    pub planet_mass: f64,
    /// Spin around +Y (radians per second)
    pub planet_rotation_speed: f64,

    // === Moon ===
    pub moon_radius: f64,
    pub moon_mass: f64,
    pub moon_orbit_radius: f64,
    pub moon_orbital_speed: f64,
    pub moon_rotation_speed: f64,

    // === Fluid (SPH) ===
    pub viscosity: f64,
    /// SPH support radius h
    pub smoothing_length: f64,
    pub gas_constant: f64,
    pub rest_density: f64,
    pub particle_mass: f64,

    // === Surface tension / cohesion ===
    pub surface_tension_strength: f64,
    pub surface_tension_radius: f64,
    pub cohesion_strength: f64,
    pub tension_resistance: f64,

    // === Boundary ===
    /// Share of outward normal velocity removed on planet contact
    pub boundary_damping: f64,
    /// Coupling of surface fluid to planet spin (0 = none, 1 = locked)
    pub surface_friction: f64,
    /// Circulating current around the spin axis
    pub current_strength: f64,

    // === Placement ===
    /// Height of the fluid shell above the planet surface
    pub fluid_height: f64,
    /// Angular half-width of the initial fluid cap, measured from +Y
    pub fluid_spread: f64,

    // === Global ===
    pub time_scale: f64,
    pub particle_count: usize,
    pub gravitational_constant: f64,
    pub global_damping: f64,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            planet_radius: 5.0,
            planet_mass: 1000.0,
            planet_rotation_speed: 0.1,

            moon_radius: 1.0,
            moon_mass: 120.0,
            moon_orbit_radius: 12.0,
            moon_orbital_speed: 0.3,
            moon_rotation_speed: 0.2,

            viscosity: 0.8,
            smoothing_length: 1.0,
            gas_constant: 2.0,
            rest_density: 3.0,
            particle_mass: 1.0,

            surface_tension_strength: 0.4,
            surface_tension_radius: 1.2,
            cohesion_strength: 0.2,
            tension_resistance: 0.5,

            boundary_damping: 0.3,
            surface_friction: 0.05,
            current_strength: 0.2,

            fluid_height: 0.5,
            fluid_spread: std::f64::consts::PI,

            time_scale: 1.0,
            particle_count: 1000,
            gravitational_constant: 6.674e-11,
            global_damping: GLOBAL_DAMPING,
        }
    }
}

impl SimulationParameters {
    /// Create parameters from a preset
    pub fn from_preset(preset: Preset) -> Self {
        let mut params = Self::default();
        params.apply_preset(preset);
        params
    }

    /// Apply a preset's fluid constants, leaving geometry and counts alone
    pub fn apply_preset(&mut self, preset: Preset) {
        let base = Self::default();
        match preset {
            Preset::Water => {
                self.viscosity = base.viscosity;
                self.gas_constant = base.gas_constant;
                self.rest_density = base.rest_density;
                self.surface_tension_strength = base.surface_tension_strength;
                self.cohesion_strength = base.cohesion_strength;
                self.tension_resistance = base.tension_resistance;
            }
            Preset::Honey => {
                self.viscosity = 6.0;
                self.gas_constant = 1.0;
                self.rest_density = 3.0;
                self.surface_tension_strength = 1.5;
                self.cohesion_strength = 1.0;
                self.tension_resistance = 2.0;
            }
            Preset::Mist => {
                self.viscosity = 0.05;
                self.gas_constant = 6.0;
                self.rest_density = 1.0;
                self.surface_tension_strength = 0.0;
                self.cohesion_strength = 0.0;
                self.tension_resistance = 0.0;
            }
        }
    }

    /// Parse a (possibly partial) JSON parameter object over the defaults
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let mut params: Self = serde_json::from_str(json)?;
        let adjusted = params.sanitize();
        if adjusted > 0 {
            log::warn!("{} parameter(s) were out of range and have been clamped", adjusted);
        }
        Ok(params)
    }

    /// Current value of a parameter
    pub fn get(&self, key: ParamKey) -> f64 {
        match key {
            ParamKey::PlanetRadius => self.planet_radius,
            ParamKey::PlanetMass => self.planet_mass,
            ParamKey::PlanetRotationSpeed => self.planet_rotation_speed,
            ParamKey::MoonRadius => self.moon_radius,
            ParamKey::MoonMass => self.moon_mass,
            ParamKey::MoonOrbitRadius => self.moon_orbit_radius,
            ParamKey::MoonOrbitalSpeed => self.moon_orbital_speed,
            ParamKey::MoonRotationSpeed => self.moon_rotation_speed,
            ParamKey::Viscosity => self.viscosity,
            ParamKey::SmoothingLength => self.smoothing_length,
            ParamKey::GasConstant => self.gas_constant,
            ParamKey::RestDensity => self.rest_density,
            ParamKey::ParticleMass => self.particle_mass,
            ParamKey::SurfaceTensionStrength => self.surface_tension_strength,
            ParamKey::SurfaceTensionRadius => self.surface_tension_radius,
            ParamKey::CohesionStrength => self.cohesion_strength,
            ParamKey::TensionResistance => self.tension_resistance,
            ParamKey::BoundaryDamping => self.boundary_damping,
            ParamKey::SurfaceFriction => self.surface_friction,
            ParamKey::CurrentStrength => self.current_strength,
            ParamKey::FluidHeight => self.fluid_height,
            ParamKey::FluidSpread => self.fluid_spread,
            ParamKey::TimeScale => self.time_scale,
            ParamKey::ParticleCount => self.particle_count as f64,
            ParamKey::GravitationalConstant => self.gravitational_constant,
            ParamKey::GlobalDamping => self.global_damping,
        }
    }

    /// Store a value, clamping it into the key's declared range
    pub fn set(&mut self, key: ParamKey, value: f64) -> ParamOutcome {
        if value.is_nan() {
            log::warn!("Rejected NaN for '{}', keeping {}", key.as_str(), self.get(key));
            return ParamOutcome::Rejected;
        }

        let (min, max) = key.range();
        let clamped = value.clamp(min, max);
        // Counts are whole; rounding an in-range value is not a clamp
        let applied = if key == ParamKey::ParticleCount {
            clamped.round()
        } else {
            clamped
        };
        self.store(key, applied);

        if clamped != value {
            log::warn!(
                "'{}' = {} is outside [{}, {}], clamped to {}",
                key.as_str(),
                value,
                min,
                max,
                applied
            );
            ParamOutcome::Clamped {
                requested: value,
                applied,
            }
        } else {
            ParamOutcome::Applied(applied)
        }
    }

    /// Store a value by wire name. Unknown names are a no-op.
    pub fn set_by_name(&mut self, name: &str, value: f64) -> ParamOutcome {
        match ParamKey::from_name(name) {
            Some(key) => self.set(key, value),
            None => {
                log::debug!("Ignoring unknown parameter '{}'", name);
                ParamOutcome::Unknown
            }
        }
    }

    /// Clamp every field into range. Returns how many fields changed.
    pub fn sanitize(&mut self) -> usize {
        let mut adjusted = 0;
        for key in ParamKey::ALL {
            let value = self.get(key);
            let (min, max) = key.range();
            let fixed = if value.is_nan() {
                Self::default().get(key)
            } else {
                value.clamp(min, max)
            };
            if fixed != value {
                self.store(key, fixed);
                adjusted += 1;
            }
        }
        adjusted
    }

    fn store(&mut self, key: ParamKey, value: f64) {
        match key {
            ParamKey::PlanetRadius => self.planet_radius = value,
            ParamKey::PlanetMass => self.planet_mass = value,
            ParamKey::PlanetRotationSpeed => self.planet_rotation_speed = value,
            ParamKey::MoonRadius => self.moon_radius = value,
            ParamKey::MoonMass => self.moon_mass = value,
            ParamKey::MoonOrbitRadius => self.moon_orbit_radius = value,
            ParamKey::MoonOrbitalSpeed => self.moon_orbital_speed = value,
            ParamKey::MoonRotationSpeed => self.moon_rotation_speed = value,
            ParamKey::Viscosity => self.viscosity = value,
            ParamKey::SmoothingLength => self.smoothing_length = value,
            ParamKey::GasConstant => self.gas_constant = value,
            ParamKey::RestDensity => self.rest_density = value,
            ParamKey::ParticleMass => self.particle_mass = value,
            ParamKey::SurfaceTensionStrength => self.surface_tension_strength = value,
            ParamKey::SurfaceTensionRadius => self.surface_tension_radius = value,
            ParamKey::CohesionStrength => self.cohesion_strength = value,
            ParamKey::TensionResistance => self.tension_resistance = value,
            ParamKey::BoundaryDamping => self.boundary_damping = value,
            ParamKey::SurfaceFriction => self.surface_friction = value,
            ParamKey::CurrentStrength => self.current_strength = value,
            ParamKey::FluidHeight => self.fluid_height = value,
            ParamKey::FluidSpread => self.fluid_spread = value,
            ParamKey::TimeScale => self.time_scale = value,
            ParamKey::ParticleCount => self.particle_count = value as usize,
            ParamKey::GravitationalConstant => self.gravitational_constant = value,
            ParamKey::GlobalDamping => self.global_damping = value,
        }
    }

    /// Radius of the fluid shell measured from the planet center
    #[inline]
    pub fn fluid_shell_radius(&self) -> f64 {
        self.planet_radius + self.fluid_height
    }

    /// Gravitational constant at simulation scale
    #[inline]
    pub fn scaled_gravity(&self) -> f64 {
        self.gravitational_constant * crate::consts::GRAVITY_VISUAL_SCALE
    }

    /// Grid cell size covering both SPH and cohesion support
    #[inline]
    pub fn interaction_radius(&self) -> f64 {
        self.smoothing_length.max(self.surface_tension_radius)
    }
}
