//! # driftfield - decorative particle backdrop
//!
//! A few hundred points drift around their home positions in a slow,
//! phase-shifted flow and lean toward the pointer when it moves. The crate
//! splits that into pieces that can be used on their own:
//!
//! - [`ParticleField`] - the simulation. Pure arithmetic over a fixed set of
//!   particles, deterministic for a given seed and input sequence, exposing
//!   positions as one flat `[x, y, z, ...]` buffer.
//! - [`PointerTracker`] - spring-smoothed pointer, sampled on its own thread
//!   and shared through a lock-free [`PointerCell`].
//! - [`Backdrop`] - a `winit` window with a `wgpu` point renderer wiring the
//!   two together.
//!
//! ## Quick Start
//!
//! ```ignore
//! use driftfield::prelude::*;
//!
//! fn main() -> Result<(), RunError> {
//!     Backdrop::new().with_seed(42).run()
//! }
//! ```
//!
//! ## Headless
//!
//! ```ignore
//! use driftfield::prelude::*;
//!
//! let mut field = ParticleField::new(FieldConfig::default(), 42)?;
//! for _ in 0..60 {
//!     field.step(1.0 / 60.0, Vec2::ZERO);
//! }
//! let xyz: &[f32] = field.positions();
//! ```
//!
//! ## Tuning
//!
//! | Concern | [`FieldConfig`] keys |
//! |---------|----------------------|
//! | Spawn | `particle_count`, `home_extent`, `initial_velocity`, `speed_range` |
//! | Drift | `flow_amplitude`, `depth_flow_amplitude`, `time_rate` |
//! | Pointer | `pointer_force`, `pointer_falloff`, `pointer_trail`, `pointer_scale` |
//! | Motion | `planar_damping`, `depth_damping`, `integration_scale`, `home_strength` |
//! | Containment | `bound`, `softness` |

mod backdrop;
pub mod config;
pub mod error;
pub mod field;
mod gpu;
pub mod input;
mod particle;
pub mod pointer;
pub mod spawn;
pub mod time;

pub use backdrop::Backdrop;
pub use config::{BackdropConfig, FieldConfig, PointerConfig, VisualsConfig};
pub use error::{ConfigError, GpuError, RunError, TrackerError};
pub use field::ParticleField;
pub use glam::{Vec2, Vec3};
pub use gpu::Camera;
pub use particle::Particle;
pub use pointer::{PointerCell, PointerTracker, Spring};
pub use spawn::SpawnContext;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use driftfield::prelude::*;
/// ```
pub mod prelude {
    pub use crate::backdrop::Backdrop;
    pub use crate::config::{BackdropConfig, FieldConfig, PointerConfig, VisualsConfig};
    pub use crate::error::{ConfigError, RunError};
    pub use crate::field::ParticleField;
    pub use crate::particle::Particle;
    pub use crate::pointer::{PointerCell, PointerTracker};
    pub use crate::time::Time;
    pub use crate::{Vec2, Vec3};
}
