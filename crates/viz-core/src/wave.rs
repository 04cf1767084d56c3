//! Wave-style instances whose spatial extent is what animates (ripples,
//! wavefronts).

use crate::integrate::DecayLaw;
use crate::pool::Instance;
use glam::{Vec2, Vec3};
use rand::Rng;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Wave {
    pub active: bool,
    pub origin: Vec2,
    pub radius: f32,
    /// Radius growth in uv units per second.
    pub speed: f32,
    pub strength: f32,
    /// Exponential strength decay rate per second.
    pub decay: f32,
    pub width: f32,
    pub color: Vec3,
    pub birth_ms: f64,
}

impl Wave {
    pub fn spawn(origin: Vec2, speed: f32, strength: f32, decay: f32, birth_ms: f64) -> Self {
        Self {
            active: true,
            origin,
            radius: 0.0,
            speed,
            strength,
            decay,
            width: 0.0,
            color: Vec3::ONE,
            birth_ms,
        }
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }
}

impl Instance for Wave {
    fn is_active(&self) -> bool {
        self.active
    }

    fn birth_ms(&self) -> f64 {
        self.birth_ms
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveLaw {
    /// Width approaches this cap asymptotically.
    pub width_cap: f32,
    /// Rate (per second) of the width approach.
    pub width_rate: f32,
    /// Waves weaker than this expire.
    pub min_strength: f32,
    /// Waves whose radius grows past this expire.
    pub max_radius: f32,
}

impl DecayLaw<Wave> for WaveLaw {
    fn step<R: Rng + ?Sized>(&self, w: &mut Wave, dt: f32, _rng: &mut R) -> bool {
        w.radius += w.speed * dt;
        w.width += (self.width_cap - w.width) * (1.0 - (-self.width_rate * dt).exp());
        w.strength *= (-w.decay * dt).exp();
        w.strength >= self.min_strength && w.radius <= self.max_radius
    }
}
