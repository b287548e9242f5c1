//! The particle field animator.
//!
//! A fixed set of points drifts around their home positions and is drawn
//! toward the pointer when it moves. Each call to [`ParticleField::step`]
//! advances one rendered frame:
//!
//! ```ignore
//! let mut field = ParticleField::new(FieldConfig::default(), 42)?;
//! loop {
//!     field.step(time.delta(), tracker.smoothed());
//!     if field.take_changed() {
//!         renderer.upload(field.positions());
//!     }
//! }
//! ```
//!
//! Per particle and frame, with `d = pointer - position.xy`:
//!
//! - home pull `(home - position) * home_strength`
//! - pointer attraction `d * force / (|d| * falloff + 1)`, where `force`
//!   grows with pointer speed and saturates at `pointer_force`
//! - drift: phase-shifted sines on each axis, scaled by the particle's speed
//!
//! Velocities are exponentially smoothed (`planar_damping` on x/y,
//! `depth_damping` on z) and integrated into position. Particles beyond
//! `bound` get their velocity nudged back by `softness`; positions are never
//! clamped.

use crate::config::FieldConfig;
use crate::error::ConfigError;
use crate::particle::{Motion, Particle};
use crate::spawn::SpawnContext;
use glam::{Vec2, Vec3};

/// A fixed-size field of drifting particles.
#[derive(Debug, Clone)]
pub struct ParticleField {
    config: FieldConfig,
    motion: Vec<Motion>,
    /// Flat `x, y, z` buffer read by the renderer.
    positions: Vec<f32>,
    /// Animation clock, advanced by `delta * time_rate`.
    time: f32,
    last_pointer: Vec2,
    pointer_velocity: Vec2,
    changed: bool,
}

impl ParticleField {
    /// Spawn `config.particle_count` particles from `seed`.
    pub fn new(config: FieldConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut ctx = SpawnContext::new(config.particle_count, seed);
        let particles = ctx.spawn_all(&config);
        Ok(Self::build(config, &particles))
    }

    /// Build a field from explicit particles. `config.particle_count` is
    /// overwritten with `particles.len()`.
    pub fn from_particles(mut config: FieldConfig, particles: &[Particle]) -> Self {
        config.particle_count = particles.len() as u32;
        Self::build(config, particles)
    }

    fn build(config: FieldConfig, particles: &[Particle]) -> Self {
        let motion = particles.iter().map(Motion::from_particle).collect();
        let positions = particles
            .iter()
            .flat_map(|p| p.position.to_array())
            .collect();

        Self {
            config,
            motion,
            positions,
            time: 0.0,
            last_pointer: Vec2::ZERO,
            pointer_velocity: Vec2::ZERO,
            changed: true,
        }
    }

    /// Advance the field by one frame.
    ///
    /// `pointer` is the smoothed pointer in normalized coordinates; it is
    /// scaled by `pointer_scale` into field units.
    pub fn step(&mut self, delta: f32, pointer: Vec2) {
        let c = &self.config;
        self.time += delta * c.time_rate;
        let t = self.time;

        let pointer = pointer * c.pointer_scale;
        self.pointer_velocity = (pointer - self.last_pointer) * c.pointer_velocity_scale;
        self.last_pointer = pointer;
        let pointer_velocity = self.pointer_velocity;

        // Identical for every particle this frame.
        let move_factor = pointer_velocity.length();
        let mouse_force = c.pointer_force * (move_factor * c.pointer_move_gain).min(1.0);
        let trail = pointer_velocity * c.pointer_trail;
        let planar_gain = 1.0 - c.planar_damping;
        let depth_gain = 1.0 - c.depth_damping;
        let advance = delta * c.integration_scale;

        for (m, chunk) in self.motion.iter_mut().zip(self.positions.chunks_exact_mut(3)) {
            let position = Vec3::new(chunk[0], chunk[1], chunk[2]);

            let d = pointer - position.truncate();
            let influence = mouse_force / (d.length() * c.pointer_falloff + 1.0);
            let home = (m.home() - position) * c.home_strength;

            let (phase, speed) = (m.phase(), m.speed());
            let flow = Vec3::new(
                (t + phase).sin() * speed * c.flow_amplitude,
                (t * 0.8 + phase).cos() * speed * c.flow_amplitude,
                (t * 0.5 + phase * 2.0).sin() * speed * c.depth_flow_amplitude,
            );

            let mut v = m.velocity;
            v.x = v.x * c.planar_damping + (d.x * influence + home.x + flow.x + trail.x) * planar_gain;
            v.y = v.y * c.planar_damping + (d.y * influence + home.y + flow.y + trail.y) * planar_gain;
            v.z = v.z * c.depth_damping + (home.z + flow.z) * depth_gain;

            let next = position + v * advance;
            chunk.copy_from_slice(&next.to_array());

            // Tested against the position this frame started from, so the
            // correction shapes the next frame's motion.
            for axis in 0..3 {
                if position[axis].abs() > c.bound {
                    v[axis] -= position[axis].signum() * c.softness;
                }
            }

            m.velocity = v;
        }

        self.changed = true;
    }

    /// Whether positions changed since the last call. Clears the flag.
    pub fn take_changed(&mut self) -> bool {
        std::mem::replace(&mut self.changed, false)
    }

    /// Whether positions changed since the flag was last taken.
    #[inline]
    pub fn needs_update(&self) -> bool {
        self.changed
    }

    /// Flat `[x0, y0, z0, x1, ...]` position buffer, `3 * len()` long.
    #[inline]
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn position(&self, index: usize) -> Option<Vec3> {
        let start = index.checked_mul(3)?;
        self.positions
            .get(start..start.checked_add(3)?)
            .map(Vec3::from_slice)
    }

    pub fn velocity(&self, index: usize) -> Option<Vec3> {
        self.motion.get(index).map(|m| m.velocity)
    }

    /// Snapshot of one particle.
    pub fn particle(&self, index: usize) -> Option<Particle> {
        let position = self.position(index)?;
        self.motion.get(index).map(|m| m.to_particle(position))
    }

    /// Snapshot of every particle.
    pub fn particles(&self) -> impl Iterator<Item = Particle> + '_ {
        self.motion
            .iter()
            .zip(self.positions.chunks_exact(3))
            .map(|(m, p)| m.to_particle(Vec3::from_slice(p)))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.motion.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.motion.is_empty()
    }

    /// Accumulated animation time.
    #[inline]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Pointer displacement of the last step, already scaled.
    #[inline]
    pub fn pointer_velocity(&self) -> Vec2 {
        self.pointer_velocity
    }

    #[inline]
    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Restart the drift cycle without touching particle state.
    pub fn reset_time(&mut self) {
        self.time = 0.0;
    }
}
