//! Deterministic particle simulation
//!
//! Everything the per-frame physics step needs lives here. The module is
//! pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (by particle index)
//! - Each tick reads a frozen snapshot before anything is written
//! - No rendering or platform dependencies

pub mod body;
pub mod collision;
pub mod forces;
pub mod integrator;
pub mod kernels;
pub mod spatial;
pub mod state;
pub mod tick;

pub use body::{Bodies, Moon, RigidBody};
pub use collision::{CollisionResult, Contact, resolve};
pub use forces::{ForceBreakdown, net_force};
pub use spatial::SpatialIndex;
pub use state::{ContactCounts, ParameterSender, Particle, ParticleSystemState, SimStats};
pub use tick::{step_once, tick};
