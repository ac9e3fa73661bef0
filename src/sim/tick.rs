//! Per-frame simulation tick
//!
//! Order of work each tick:
//! 1. apply queued parameter changes
//! 2. advance the bodies (moon orbit, spin)
//! 3. rebuild the neighbor grid from the current positions
//! 4. density/pressure pass
//! 5. force, integrate and collide every particle against the frozen snapshot
//! 6. write the new particle state and commit the render buffer

use glam::DVec3;

use super::body::Bodies;
use super::collision::{self, Contact};
use super::forces;
use super::integrator;
use super::spatial::SpatialIndex;
use super::state::{ContactCounts, Particle, ParticleSystemState};
use crate::consts::MAX_TICK_DT;
use crate::params::SimulationParameters;

/// New state for one particle, computed from the snapshot
#[derive(Debug, Clone, Copy)]
struct ParticleUpdate {
    position: DVec3,
    velocity: DVec3,
    contact: Contact,
}

/// Advance the simulation by one host tick.
///
/// A paused simulation only applies queued parameter changes, unless a
/// single step was requested.
pub fn tick(state: &mut ParticleSystemState, dt_tick: f64) {
    state.drain_pending();

    if state.paused && !state.step_requested {
        return;
    }
    state.step_requested = false;

    advance(state, dt_tick);
}

/// Advance exactly one tick regardless of pause state
pub fn step_once(state: &mut ParticleSystemState, dt_tick: f64) {
    state.drain_pending();
    advance(state, dt_tick);
}

fn advance(state: &mut ParticleSystemState, dt_tick: f64) {
    let dt_tick = if dt_tick.is_finite() {
        dt_tick.clamp(0.0, MAX_TICK_DT)
    } else {
        0.0
    };
    let dt = integrator::effective_dt(dt_tick, state.params.time_scale);

    state.time_ticks += 1;
    state.bodies.advance(dt);

    // Snapshot phase: everything below reads `state.particles` immutably
    state.index.rebuild(
        state.particles.iter().map(|p| p.position),
        state.params.interaction_radius(),
    );
    forces::update_densities(&mut state.particles, &state.index, &state.params);
    let updates = compute_updates(
        &state.particles,
        &state.index,
        &state.bodies,
        &state.params,
        dt,
    );

    // Write phase
    let mut contacts = ContactCounts::default();
    let mut recovered = 0usize;
    for (particle, update) in state.particles.iter_mut().zip(updates) {
        if update.position.is_finite() && update.velocity.is_finite() {
            particle.position = update.position;
            particle.velocity = update.velocity;
            match update.contact {
                Contact::Moon => contacts.moon += 1,
                Contact::Planet => contacts.planet += 1,
                Contact::None => {}
            }
        } else {
            particle.velocity = DVec3::ZERO;
            recovered += 1;
        }
    }
    if recovered > 0 {
        log::warn!(
            "Tick {}: {} particle(s) produced non-finite state and were held in place",
            state.time_ticks,
            recovered
        );
    }

    state.last_contacts = contacts;
    state.commit_render();

    if log::log_enabled!(log::Level::Debug) && state.time_ticks % 60 == 0 {
        let stats = state.stats();
        log::debug!(
            "Tick {}: mean density {:.3}, max speed {:.3}, shell height {:+.4}, contacts {}/{}",
            stats.time_ticks,
            stats.mean_density,
            stats.max_speed,
            stats.mean_shell_height,
            stats.contacts.planet,
            stats.contacts.moon
        );
    }
}

/// Force, integrate and collide one particle
fn update_particle(
    i: usize,
    particles: &[Particle],
    index: &SpatialIndex,
    bodies: &Bodies,
    params: &SimulationParameters,
    dt: f64,
) -> ParticleUpdate {
    let force = forces::net_force(i, particles, index, &bodies.attractors(), params);
    let (velocity, position) = integrator::step(&particles[i], force, dt, params.global_damping);
    let resolved = collision::resolve(position, velocity, bodies, params, dt);
    ParticleUpdate {
        position: resolved.position,
        velocity: resolved.velocity,
        contact: resolved.contact,
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn compute_updates(
    particles: &[Particle],
    index: &SpatialIndex,
    bodies: &Bodies,
    params: &SimulationParameters,
    dt: f64,
) -> Vec<ParticleUpdate> {
    use rayon::prelude::*;

    (0..particles.len())
        .into_par_iter()
        .map(|i| update_particle(i, particles, index, bodies, params, dt))
        .collect()
}

#[cfg(target_arch = "wasm32")]
fn compute_updates(
    particles: &[Particle],
    index: &SpatialIndex,
    bodies: &Bodies,
    params: &SimulationParameters,
    dt: f64,
) -> Vec<ParticleUpdate> {
    (0..particles.len())
        .map(|i| update_particle(i, particles, index, bodies, params, dt))
        .collect()
}
