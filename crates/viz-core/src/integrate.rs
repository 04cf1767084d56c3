//! Per-frame integration of pools.

use crate::constants::MAX_FRAME_DT_MS;
use crate::pool::{Instance, SlotPool};
use rand::Rng;

/// Update law applied to every active instance of a pool once per frame.
///
/// Returns `false` when the instance has expired; the pool then resets the
/// slot to its zeroed default.
pub trait DecayLaw<T> {
    fn step<R: Rng + ?Sized>(&self, instance: &mut T, dt: f32, rng: &mut R) -> bool;
}

/// Convert a frame delta to seconds, truncated to the maximum step.
///
/// Negative, NaN and infinite deltas collapse to zero.
pub fn clamp_delta_sec(delta_ms: f64) -> f32 {
    if !delta_ms.is_finite() || delta_ms <= 0.0 {
        return 0.0;
    }
    (delta_ms.min(MAX_FRAME_DT_MS) / 1000.0) as f32
}

/// Advance every active instance of `pool` by `dt` seconds.
pub fn integrate<T, L, R>(pool: &mut SlotPool<T>, law: &L, dt: f32, rng: &mut R)
where
    T: Instance,
    L: DecayLaw<T>,
    R: Rng + ?Sized,
{
    if dt <= 0.0 {
        return;
    }
    pool.retain_active(|instance| law.step(instance, dt, rng));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_is_clamped() {
        assert_eq!(clamp_delta_sec(0.0), 0.0);
        assert_eq!(clamp_delta_sec(-16.0), 0.0);
        assert_eq!(clamp_delta_sec(f64::NAN), 0.0);
        assert!((clamp_delta_sec(16.0) - 0.016).abs() < 1e-7);
        assert_eq!(clamp_delta_sec(10_000.0), clamp_delta_sec(50.0));
    }
}
