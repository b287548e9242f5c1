//! Particle state.

use glam::Vec3;

/// A single point of the field.
///
/// `home`, `phase` and `speed` are fixed once a particle is part of a
/// [`ParticleField`](crate::ParticleField); only position and velocity move.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Origin the particle is weakly pulled back toward.
    pub home: Vec3,
    /// Offset into the drift cycle, in `[0, TAU)`.
    pub phase: f32,
    /// Drift amplitude multiplier.
    pub speed: f32,
}

impl Particle {
    /// A particle resting at its home position.
    pub fn at_home(home: Vec3, velocity: Vec3, phase: f32, speed: f32) -> Self {
        Self {
            position: home,
            velocity,
            home,
            phase,
            speed,
        }
    }
}

/// The mutable half of a particle as stored by the field. Position lives in
/// the field's flat render buffer.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Motion {
    pub velocity: Vec3,
    home: Vec3,
    phase: f32,
    speed: f32,
}

impl Motion {
    pub fn from_particle(p: &Particle) -> Self {
        Self {
            velocity: p.velocity,
            home: p.home,
            phase: p.phase,
            speed: p.speed,
        }
    }

    #[inline]
    pub fn home(&self) -> Vec3 {
        self.home
    }

    #[inline]
    pub fn phase(&self) -> f32 {
        self.phase
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn to_particle(self, position: Vec3) -> Particle {
        Particle {
            position,
            velocity: self.velocity,
            home: self.home,
            phase: self.phase,
            speed: self.speed,
        }
    }
}
