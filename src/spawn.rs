//! Spawn context for particle initialization.
//!
//! One seeded RNG is shared across the whole spawn so a field built twice
//! from the same seed places every particle identically.

use crate::config::FieldConfig;
use crate::particle::Particle;
use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Random helpers used while populating a field.
pub struct SpawnContext {
    /// Index of the particle being spawned (0 to count-1).
    pub index: u32,
    /// Total number of particles being spawned.
    pub count: u32,
    rng: SmallRng,
}

impl SpawnContext {
    /// Create a context whose RNG is seeded with `seed`.
    pub fn new(count: u32, seed: u64) -> Self {
        Self {
            index: 0,
            count,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// A seed that differs between program runs.
    pub fn clock_seed() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42)
    }

    /// Random f32 in `[min, max]`. Returns `min` when the range is empty.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    /// Random point in the axis-aligned box `[-half, half]` per axis.
    pub fn random_in_box(&mut self, half: Vec3) -> Vec3 {
        Vec3::new(
            self.random_range(-half.x, half.x),
            self.random_range(-half.y, half.y),
            self.random_range(-half.z, half.z),
        )
    }

    /// Random angle in `[0, TAU)`.
    #[inline]
    pub fn random_phase(&mut self) -> f32 {
        self.rng.gen_range(0.0..TAU)
    }

    /// Draw the next particle according to `config`.
    pub fn spawn(&mut self, config: &FieldConfig) -> Particle {
        let home = self.random_in_box(Vec3::from_array(config.home_extent));
        let velocity = self.random_in_box(Vec3::from_array(config.initial_velocity));
        let phase = self.random_phase();
        let (lo, hi) = config.speed_range;
        let speed = self.random_range(lo, hi);
        self.index += 1;
        Particle::at_home(home, velocity, phase, speed)
    }

    /// Draw `config.particle_count` particles.
    pub fn spawn_all(&mut self, config: &FieldConfig) -> Vec<Particle> {
        (0..config.particle_count).map(|_| self.spawn(config)).collect()
    }
}
