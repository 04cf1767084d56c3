//! Particle-style instances: things that move and fade (bubbles, plasma
//! seeds, tree seeds, leaves, flares, embers).

use crate::constants::{MIN_LIFE_SEC, REFERENCE_FPS};
use crate::integrate::DecayLaw;
use crate::pool::Instance;
use crate::spawn::jitter;
use glam::{Vec2, Vec3};
use rand::Rng;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Particle {
    pub active: bool,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub life_sec: f32,
    pub inv_life: f32,
    /// Elapsed lifetime over total lifespan; expires once above 1.
    pub age: f32,
    pub color: Vec3,
    /// Pitch-class hue (0..1) of the spawning note.
    pub hue: f32,
    /// Flash channel, decays independently of `age` when the law has a flash.
    pub intensity: f32,
    pub flash_age: f32,
    pub birth_ms: f64,
}

impl Particle {
    pub fn spawn(pos: Vec2, vel: Vec2, size: f32, life_sec: f32, birth_ms: f64) -> Self {
        let life_sec = life_sec.max(MIN_LIFE_SEC);
        Self {
            active: true,
            pos,
            vel,
            size,
            life_sec,
            inv_life: 1.0 / life_sec,
            age: 0.0,
            color: Vec3::ONE,
            hue: 0.0,
            intensity: 1.0,
            flash_age: 0.0,
            birth_ms,
        }
    }

    pub fn with_color(mut self, color: Vec3, hue: f32) -> Self {
        self.color = color;
        self.hue = hue;
        self
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    /// Age ratio clamped into 0..=1 for consumers.
    #[inline]
    pub fn age_ratio(&self) -> f32 {
        self.age.clamp(0.0, 1.0)
    }
}

impl Instance for Particle {
    fn is_active(&self) -> bool {
        self.active
    }

    fn birth_ms(&self) -> f64 {
        self.birth_ms
    }
}

/// How a flash channel fades.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FlashDecay {
    None,
    /// `intensity -= per_sec * dt`
    Linear { per_sec: f32 },
    /// `intensity = initial * (1 - t)^exponent`, `t += per_sec * dt`
    Power { per_sec: f32, exponent: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleLaw {
    /// Constant acceleration, usually on a single axis.
    pub gravity: Vec2,
    /// Multiplicative velocity damping per reference frame.
    pub friction: f32,
    /// Random acceleration amplitude (uv units per second squared).
    pub jitter: f32,
    pub flash: FlashDecay,
}

impl ParticleLaw {
    pub const fn drifting(gravity: Vec2, friction: f32, jitter: f32) -> Self {
        Self {
            gravity,
            friction,
            jitter,
            flash: FlashDecay::None,
        }
    }

    pub const fn with_flash(mut self, flash: FlashDecay) -> Self {
        self.flash = flash;
        self
    }
}

impl DecayLaw<Particle> for ParticleLaw {
    fn step<R: Rng + ?Sized>(&self, p: &mut Particle, dt: f32, rng: &mut R) -> bool {
        p.vel += self.gravity * dt;
        if self.jitter > 0.0 {
            p.vel += jitter(rng, self.jitter) * dt;
        }
        p.vel *= self.friction.powf(dt * REFERENCE_FPS);
        p.pos += p.vel * dt;
        p.age += dt * p.inv_life;

        let flash_alive = match self.flash {
            FlashDecay::None => true,
            FlashDecay::Linear { per_sec } => {
                p.intensity -= per_sec * dt;
                p.intensity > 0.0
            }
            FlashDecay::Power { per_sec, exponent } => {
                let before = (1.0 - p.flash_age).max(0.0).powf(exponent);
                p.flash_age += per_sec * dt;
                let after = (1.0 - p.flash_age).max(0.0).powf(exponent);
                if before > 0.0 {
                    p.intensity *= after / before;
                }
                p.flash_age < 1.0
            }
        };

        p.age <= 1.0 && flash_alive
    }
}
