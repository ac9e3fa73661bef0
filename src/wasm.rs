//! Browser binding
//!
//! The page owns the render loop: it calls `update` once per animation frame
//! and then copies the committed position/color buffers into its own
//! geometry. Parameter sliders call `set_parameter` directly.

use std::sync::Once;

use wasm_bindgen::prelude::*;

use crate::params::ParamOutcome;
use crate::sim::{ParticleSystemState, tick};

static INIT: Once = Once::new();

fn init_logging() {
    INIT.call_once(|| {
        console_error_panic_hook::set_once();
        // Another module on the page may have installed a logger first
        let _ = console_log::init_with_level(log::Level::Info);
    });
}

#[wasm_bindgen]
pub struct SimulationEngine {
    state: ParticleSystemState,
}

#[wasm_bindgen]
impl SimulationEngine {
    /// Create an engine. Without a seed, one is drawn from `Math.random`.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: Option<f64>) -> SimulationEngine {
        init_logging();
        let seed = match seed {
            Some(seed) if seed.is_finite() => seed.abs() as u64,
            _ => (js_sys::Math::random() * u32::MAX as f64) as u64,
        };
        log::info!("Planet SPH engine starting (seed {})", seed);
        SimulationEngine {
            state: ParticleSystemState::new(seed),
        }
    }

    /// Returns false for unrecognized names
    pub fn set_parameter(&mut self, name: &str, value: f64) -> bool {
        self.state.set_parameter(name, value) != ParamOutcome::Unknown
    }

    pub fn initialize_particles(&mut self, count: Option<u32>) {
        self.state.initialize_particles(count.map(|c| c as usize));
    }

    pub fn reset_to_default(&mut self) {
        self.state.reset_to_default();
    }

    /// Advance one frame; `dt` is the frame time in seconds (capped at 0.1)
    pub fn update(&mut self, dt: f64) {
        tick(&mut self.state, dt);
    }

    pub fn toggle_pause(&mut self) {
        self.state.toggle_pause();
    }

    pub fn step(&mut self) {
        self.state.request_step();
    }

    pub fn get_particle_positions(&self) -> Vec<f32> {
        self.state.positions().to_vec()
    }

    pub fn get_particle_colors(&self) -> Vec<f32> {
        self.state.colors().to_vec()
    }

    pub fn particle_count(&self) -> usize {
        self.state.particle_count()
    }

    /// Apply a shared scenario. Returns false (and keeps the current
    /// parameters) if the token is malformed.
    pub fn load_scenario(&mut self, token: &str) -> bool {
        self.state.load_scenario_token(token).is_ok()
    }

    /// Token for the current parameters, or an empty string if encoding fails
    pub fn scenario_token(&self) -> String {
        match self.state.to_scenario().encode() {
            Ok(token) => token,
            Err(err) => {
                log::warn!("Failed to encode scenario: {}", err);
                String::new()
            }
        }
    }
}
