//! Particle system state
//!
//! Owns the particle array, both rigid bodies, the live parameter set and
//! the committed render buffer. Nothing outside this module mutates
//! particles; the renderer only ever sees the committed buffer.

use std::sync::mpsc::{self, Receiver, Sender};

use glam::DVec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::body::Bodies;
use super::spatial::SpatialIndex;
use crate::params::{ParamEffect, ParamKey, ParamOutcome, SimulationParameters};
use crate::render::RenderBuffer;
use crate::spherical_to_cartesian;

/// A fluid particle. `density` and `pressure` are recomputed every tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub position: DVec3,
    pub velocity: DVec3,
    pub density: f64,
    pub pressure: f64,
}

/// How many particles each body corrected on the last tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactCounts {
    pub moon: usize,
    pub planet: usize,
}

/// Summary numbers for HUD/logging
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimStats {
    pub time_ticks: u64,
    pub particle_count: usize,
    pub mean_density: f64,
    pub max_speed: f64,
    /// Mean distance above (+) or below (-) the fluid shell
    pub mean_shell_height: f64,
    pub contacts: ContactCounts,
}

/// Cloneable handle for queueing parameter changes from another thread.
///
/// Queued changes are applied in order at the start of the next tick.
#[derive(Debug, Clone)]
pub struct ParameterSender {
    tx: Sender<(String, f64)>,
}

impl ParameterSender {
    /// Queue a change. Returns false if the simulation has been dropped.
    pub fn set(&self, name: &str, value: f64) -> bool {
        self.tx.send((name.to_string(), value)).is_ok()
    }
}

/// The complete simulation
#[derive(Debug)]
pub struct ParticleSystemState {
    /// Seed the RNG was created from
    pub seed: u64,
    rng: Pcg32,
    pub(crate) params: SimulationParameters,
    pub(crate) bodies: Bodies,
    /// Stable order; indices are the particle identity for one tick
    pub(crate) particles: Vec<Particle>,
    pub(crate) index: SpatialIndex,
    pub(crate) render: RenderBuffer,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub paused: bool,
    pub(crate) step_requested: bool,
    pub(crate) last_contacts: ContactCounts,
    pending_tx: Sender<(String, f64)>,
    pending_rx: Receiver<(String, f64)>,
}

impl ParticleSystemState {
    /// Create a simulation with default parameters
    pub fn new(seed: u64) -> Self {
        Self::with_params(seed, SimulationParameters::default())
    }

    /// Create a simulation with the given parameters (clamped into range)
    pub fn with_params(seed: u64, mut params: SimulationParameters) -> Self {
        params.sanitize();
        let (pending_tx, pending_rx) = mpsc::channel();
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            bodies: Bodies::from_params(&params),
            params,
            particles: Vec::new(),
            index: SpatialIndex::default(),
            render: RenderBuffer::default(),
            time_ticks: 0,
            paused: false,
            step_requested: false,
            last_contacts: ContactCounts::default(),
            pending_tx,
            pending_rx,
        };
        state.initialize_particles(None);
        state
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    pub fn bodies(&self) -> &Bodies {
        &self.bodies
    }

    /// Committed buffer for the renderer
    pub fn render(&self) -> &RenderBuffer {
        &self.render
    }

    /// Committed positions as flat `[x, y, z, x, y, z, ...]`
    pub fn positions(&self) -> &[f32] {
        self.render.positions()
    }

    /// Committed colors as flat `[r, g, b, r, g, b, ...]`
    pub fn colors(&self) -> &[f32] {
        self.render.colors()
    }

    /// Handle for queueing parameter changes from a UI thread
    pub fn parameter_sender(&self) -> ParameterSender {
        ParameterSender {
            tx: self.pending_tx.clone(),
        }
    }

    /// Update a parameter by wire name. Unknown names are a no-op.
    pub fn set_parameter(&mut self, name: &str, value: f64) -> ParamOutcome {
        match ParamKey::from_name(name) {
            Some(key) => self.set_param(key, value),
            None => {
                log::debug!("Ignoring unknown parameter '{}'", name);
                ParamOutcome::Unknown
            }
        }
    }

    /// Update a parameter and run whatever recomputation it requires
    pub fn set_param(&mut self, key: ParamKey, value: f64) -> ParamOutcome {
        let old_shell = self.params.fluid_shell_radius();
        let old_value = self.params.get(key);
        let outcome = self.params.set(key, value);

        if outcome.changed() && self.params.get(key) != old_value {
            self.bodies.sync(&self.params);
            match key.effect() {
                ParamEffect::ReprojectFluid => self.reproject_fluid(old_shell),
                ParamEffect::Reinitialize => self.initialize_particles(None),
                // Body geometry and moon placement were updated by `sync`
                ParamEffect::None => {}
            }
        }
        outcome
    }

    /// Apply every queued cross-thread change, in arrival order
    pub(crate) fn drain_pending(&mut self) {
        while let Ok((name, value)) = self.pending_rx.try_recv() {
            self.set_parameter(&name, value);
        }
    }

    /// (Re)populate the particle array on the fluid shell.
    ///
    /// Directions are uniform over the spherical cap within `fluid_spread`
    /// of +Y. All particles start at rest exactly on the shell.
    pub fn initialize_particles(&mut self, count: Option<usize>) {
        if let Some(count) = count {
            // An explicit count is honored even beyond the slider range
            let (_, max) = ParamKey::ParticleCount.range();
            if count as f64 > max {
                log::info!("Requested {} particles, above the usual maximum of {}", count, max);
            }
            self.params.particle_count = count;
        }
        let count = self.params.particle_count;
        let shell = self.params.fluid_shell_radius();
        let center = self.bodies.planet.position;
        let min_cos = self.params.fluid_spread.cos();

        self.particles.clear();
        self.particles.reserve(count);
        for _ in 0..count {
            let cos_polar = self.rng.random_range(min_cos..=1.0);
            let polar = cos_polar.clamp(-1.0, 1.0).acos();
            let azimuth = self.rng.random_range(0.0..std::f64::consts::TAU);
            self.particles.push(Particle {
                position: center + spherical_to_cartesian(shell, polar, azimuth),
                ..Default::default()
            });
        }

        self.last_contacts = ContactCounts::default();
        self.commit_render();
        log::info!(
            "Initialized {} particles on shell r={:.3} (spread {:.3} rad)",
            count,
            shell,
            self.params.fluid_spread
        );
    }

    /// Restore every parameter to its default and reinitialize particles.
    ///
    /// The RNG is not reseeded, so successive resets give new placements
    /// drawn from the same distribution.
    pub fn reset_to_default(&mut self) {
        self.params = SimulationParameters::default();
        // Sync rather than rebuild so geometry revisions keep counting up
        self.bodies.sync(&self.params);
        self.bodies.planet.rotation_angle = 0.0;
        self.bodies.moon.body.rotation_angle = 0.0;
        self.bodies.moon.orbit_angle = 0.0;
        self.bodies.moon.place(self.bodies.planet.position);
        self.time_ticks = 0;
        self.initialize_particles(None);
        log::info!("Simulation reset to defaults");
    }

    /// Keep each particle's height above the fluid shell when the shell moves
    fn reproject_fluid(&mut self, old_shell: f64) {
        let new_shell = self.params.fluid_shell_radius();
        let center = self.bodies.planet.position;
        for p in &mut self.particles {
            let offset = p.position - center;
            let dist = offset.length();
            let dir = offset.normalize_or(DVec3::Y);
            let height = dist - old_shell;
            p.position = center + dir * (new_shell + height).max(new_shell);
        }
        self.commit_render();
        log::debug!("Reprojected fluid shell {:.3} -> {:.3}", old_shell, new_shell);
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Advance exactly one tick on the next update while paused
    pub fn request_step(&mut self) {
        self.step_requested = true;
    }

    /// Publish particle positions/colors for the renderer
    pub(crate) fn commit_render(&mut self) {
        self.render.commit(&self.particles);
    }

    pub fn stats(&self) -> SimStats {
        let n = self.particles.len();
        let shell = self.params.fluid_shell_radius();
        let center = self.bodies.planet.position;

        let (density_sum, height_sum, max_speed) = self.particles.iter().fold(
            (0.0, 0.0, 0.0_f64),
            |(density, height, speed), p| {
                (
                    density + p.density,
                    height + (p.position.distance(center) - shell),
                    speed.max(p.velocity.length()),
                )
            },
        );
        let denom = n.max(1) as f64;

        SimStats {
            time_ticks: self.time_ticks,
            particle_count: n,
            mean_density: density_sum / denom,
            max_speed,
            mean_shell_height: height_sum / denom,
            contacts: self.last_contacts,
        }
    }
}
