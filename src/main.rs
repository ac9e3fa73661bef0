//! Planet SPH headless runner
//!
//! Runs the simulation natively without a window and logs statistics once
//! per simulated second. The browser build drives the engine through
//! `planet_sph::wasm::SimulationEngine` instead.
//!
//! Usage: `planet-sph [ticks] [--seed N] [--preset water|honey|mist]
//! [--params FILE.json] [--scenario TOKEN]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = match native::Options::parse(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(message) => {
            log::error!("{}", message);
            std::process::exit(2);
        }
    };
    if let Err(err) = native::run(&options) {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser entry point is SimulationEngine in the library
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::time::Instant;

    use planet_sph::consts::{DEFAULT_SEED, TICK_DT};
    use planet_sph::{ParticleSystemState, Preset, SimError, SimulationParameters, tick};

    #[derive(Debug)]
    pub struct Options {
        pub ticks: u64,
        pub seed: u64,
        pub preset: Preset,
        pub params_file: Option<String>,
        pub scenario: Option<String>,
    }

    impl Options {
        pub fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, String> {
            let mut options = Options {
                ticks: 600,
                seed: DEFAULT_SEED,
                preset: Preset::default(),
                params_file: None,
                scenario: None,
            };

            while let Some(arg) = args.next() {
                let mut value = |flag: &str| {
                    args.next()
                        .ok_or_else(|| format!("{} needs a value", flag))
                };
                match arg.as_str() {
                    "--seed" => {
                        let v = value("--seed")?;
                        options.seed = v.parse().map_err(|_| format!("bad seed '{}'", v))?;
                    }
                    "--preset" => {
                        let v = value("--preset")?;
                        options.preset =
                            Preset::from_str(&v).ok_or_else(|| format!("unknown preset '{}'", v))?;
                    }
                    "--params" => options.params_file = Some(value("--params")?),
                    "--scenario" => options.scenario = Some(value("--scenario")?),
                    other => {
                        options.ticks = other
                            .parse()
                            .map_err(|_| format!("unexpected argument '{}'", other))?;
                    }
                }
            }
            Ok(options)
        }
    }

    pub fn run(options: &Options) -> Result<(), SimError> {
        let mut params = SimulationParameters::from_preset(options.preset);
        if let Some(path) = &options.params_file {
            let json = std::fs::read_to_string(path)?;
            params = SimulationParameters::from_json(&json)?;
        }

        let mut state = ParticleSystemState::with_params(options.seed, params);
        if let Some(token) = &options.scenario {
            state.load_scenario_token(token)?;
        }

        log::info!(
            "Running {} ticks with {} particles (seed {}, preset {})",
            options.ticks,
            state.particle_count(),
            options.seed,
            options.preset.as_str()
        );

        let started = Instant::now();
        for _ in 0..options.ticks {
            tick(&mut state, TICK_DT);
            if state.time_ticks % 60 == 0 {
                let stats = state.stats();
                log::info!(
                    "t={:>5} density {:.3} max speed {:.3} shell height {:+.4} contacts planet {} moon {}",
                    stats.time_ticks,
                    stats.mean_density,
                    stats.max_speed,
                    stats.mean_shell_height,
                    stats.contacts.planet,
                    stats.contacts.moon
                );
            }
        }

        let elapsed = started.elapsed().as_secs_f64();
        log::info!(
            "Done: {} ticks in {:.2}s ({:.1} ticks/s)",
            options.ticks,
            elapsed,
            options.ticks as f64 / elapsed.max(1e-9)
        );
        log::info!("Scenario token: {}", state.to_scenario().encode()?);
        Ok(())
    }
}
