//! Decorative background particles of the hero section.
//!
//! Each particle sits at a random spot of the section and drifts up and
//! down on its own period. The intro sequence additionally flashes every
//! particle through the animation system, addressed by
//! [`ParticleField::targets`].

use std::f32::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::animation::TargetId;

/// Family name of particle animation targets.
pub const PARTICLE: &str = "particle";

/// Peak upward drift of the idle float, in CSS pixels.
const DRIFT_PX: f32 = 20.0;

/// One decorative dot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Distance from the section top, percent of its height.
    pub top_pct: f32,
    /// Distance from the section left edge, percent of its width.
    pub left_pct: f32,
    /// Period of the idle float, seconds (10 to 20).
    pub duration: f32,
    /// Seconds before the idle float starts (0 to 5).
    pub delay: f32,
}

impl Particle {
    /// Vertical drift in px, `t` seconds after mount.
    #[must_use]
    pub fn offset_at(&self, t: f32) -> f32 {
        if t < self.delay || self.duration <= 0.0 {
            return 0.0;
        }
        let phase = ((t - self.delay) / self.duration).fract();
        -DRIFT_PX * (PI * phase).sin()
    }
}

/// Seeded set of particles.
#[derive(Debug, Clone)]
pub struct ParticleField {
    particles: Vec<Particle>,
}

impl ParticleField {
    /// `count` particles drawn from `seed`.
    #[must_use]
    pub fn new(count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let particles = (0..count)
            .map(|_| Particle {
                top_pct: rng.random::<f32>() * 100.0,
                left_pct: rng.random::<f32>() * 100.0,
                duration: rng.random::<f32>() * 10.0 + 10.0,
                delay: rng.random::<f32>() * 5.0,
            })
            .collect();
        Self { particles }
    }

    /// All particles.
    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Number of particles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether the field is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Animation targets, one per particle, in order.
    pub fn targets(&self) -> impl Iterator<Item = TargetId> + '_ {
        (0..self.particles.len()).map(|i| TargetId::indexed(PARTICLE, i as u32))
    }
}
