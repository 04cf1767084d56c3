//! Helpers shared by the layers' spawn rules.

use crate::constants::{BURST_LIFE_MIN_SEC, BURST_LIFE_SPAN_SEC, HELD_MS_PER_VELOCITY};
use crate::note::MIDI_MAX;
use glam::Vec2;
use rand::Rng;

/// Velocity used for a note-off flourish: the release velocity boosted by how
/// long the note was held, capped at 127.
pub fn boosted_velocity(velocity: u8, held_ms: f64) -> f32 {
    let held_ms = if held_ms.is_finite() { held_ms.max(0.0) } else { 0.0 };
    (velocity as f64 + held_ms / HELD_MS_PER_VELOCITY).min(MIDI_MAX as f64) as f32
}

/// Number of instances in a velocity-scaled burst: `1 + floor(v/127 * k)`.
pub fn burst_count(velocity: f32, k: f32) -> usize {
    let v01 = (velocity / MIDI_MAX as f32).clamp(0.0, 1.0);
    1 + (v01 * k).floor() as usize
}

/// Randomized burst lifespan in seconds.
pub fn burst_life<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    BURST_LIFE_MIN_SEC + rng.gen::<f32>() * BURST_LIFE_SPAN_SEC
}

/// Uniform random vector in the square [-amount, amount]^2.
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, amount: f32) -> Vec2 {
    if amount <= 0.0 {
        return Vec2::ZERO;
    }
    Vec2::new(
        rng.gen_range(-amount..=amount),
        rng.gen_range(-amount..=amount),
    )
}

/// Random unit vector.
pub fn unit_direction<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    let angle = rng.gen::<f32>() * std::f32::consts::TAU;
    Vec2::new(angle.cos(), angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boost_grows_with_hold_and_caps() {
        assert_eq!(boosted_velocity(80, 0.0), 80.0);
        assert_eq!(boosted_velocity(80, 250.0), 90.0);
        assert_eq!(boosted_velocity(80, 60_000.0), 127.0);
        assert_eq!(boosted_velocity(80, -100.0), 80.0);
    }

    #[test]
    fn burst_count_scales_with_velocity() {
        assert_eq!(burst_count(0.0, 2.0), 1);
        assert_eq!(burst_count(100.0, 1.0), 1);
        assert_eq!(burst_count(100.0, 2.0), 2);
        assert_eq!(burst_count(127.0, 2.0), 3);
        assert_eq!(burst_count(500.0, 3.0), 4);
    }
}
