//! Presentation-side state shared by the layers.
//!
//! These types avoid platform-specific APIs; frontends read them to fill
//! their uniform blocks.

use crate::constants::{
    GLOW_ENERGY_DECAY_PER_SEC, GLOW_ENERGY_MAX, GLOW_FALL_TAU_SEC, GLOW_RISE_TAU_SEC,
};

/// Output resolution and the last clock value a layer was updated with.
///
/// Only presentation metadata lives here; resizing never touches pools.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub now_ms: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            now_ms: 0.0,
        }
    }
}

impl Viewport {
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    pub fn resolution(&self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }

    pub fn time_sec(&self) -> f32 {
        (self.now_ms / 1000.0) as f32
    }
}

/// Note-driven ambient glow with asymmetric smoothing.
///
/// Notes add to an internal energy that decays exponentially; the visible
/// `level` chases that energy quickly on the way up and slowly on the way
/// down. `level` sits in 0..=GLOW_ENERGY_MAX.
#[derive(Clone, Debug, Default)]
pub struct GlowEnvelope {
    energy: f32,
    level: f32,
}

impl GlowEnvelope {
    pub fn kick(&mut self, amount: f32) {
        self.energy = (self.energy + amount.max(0.0)).min(GLOW_ENERGY_MAX);
    }

    pub fn step(&mut self, dt_sec: f32) {
        if dt_sec <= 0.0 {
            return;
        }
        self.energy *= (-dt_sec * GLOW_ENERGY_DECAY_PER_SEC).exp();
        let alpha_up = 1.0 - (-dt_sec / GLOW_RISE_TAU_SEC).exp();
        let alpha_down = 1.0 - (-dt_sec / GLOW_FALL_TAU_SEC).exp();
        let target = self.energy.clamp(0.0, GLOW_ENERGY_MAX);
        let alpha = if target > self.level {
            alpha_up
        } else {
            alpha_down
        };
        self.level += (target - self.level) * alpha;
    }

    pub fn level(&self) -> f32 {
        self.level
    }
}
