//! Per-note hold tracking for the solar layer.
//!
//! Each held note emits wavefronts on a repeat interval that shrinks as the
//! hold goes on, so sustained notes build into a crescendo. Releasing emits
//! one last burst scaled by the total hold and forgets the note.
//!
//! The tracker produces [`WaveSpawn`] requests; the owning layer decides how
//! they land in its pool.

use crate::constants::{
    HOLD_BASE_INTERVAL_MS, HOLD_MIN_INTERVAL_FRACTION, HOLD_RAMP_MS, HOLD_RELEASE_FULL_MS,
    SOLAR_WAVE_STRENGTH_MAX,
};
use crate::note::NoteEvent;
use fnv::FnvHashMap;
use glam::{Vec2, Vec3};
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoldPhase {
    Idle,
    Held,
    /// Reported by [`HoldTracker::release`]; the note is already forgotten.
    Released,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Hold {
    pub note: u8,
    pub velocity01: f32,
    pub start_ms: f64,
    pub last_spawn_ms: f64,
    pub origin: Vec2,
    pub color: Vec3,
}

/// Parameters for one wavefront emitted by the tracker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveSpawn {
    pub note: u8,
    pub origin: Vec2,
    pub color: Vec3,
    pub strength: f32,
    pub speed: f32,
    pub width: f32,
    pub decay: f32,
    pub at_ms: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoldConfig {
    pub base_interval_ms: f64,
    pub min_interval_fraction: f64,
    pub ramp_ms: f64,
    pub release_full_ms: f64,
    pub max_strength: f32,
}

impl Default for HoldConfig {
    fn default() -> Self {
        Self {
            base_interval_ms: HOLD_BASE_INTERVAL_MS,
            min_interval_fraction: HOLD_MIN_INTERVAL_FRACTION,
            ramp_ms: HOLD_RAMP_MS,
            release_full_ms: HOLD_RELEASE_FULL_MS,
            max_strength: SOLAR_WAVE_STRENGTH_MAX,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct HoldTracker {
    config: HoldConfig,
    holds: FnvHashMap<u8, Hold>,
}

impl HoldTracker {
    pub fn new(config: HoldConfig) -> Self {
        Self {
            config,
            holds: FnvHashMap::default(),
        }
    }

    pub fn config(&self) -> &HoldConfig {
        &self.config
    }

    /// Hold progress in 0..=1.
    fn progress(&self, held_ms: f64) -> f32 {
        if !held_ms.is_finite() || self.config.ramp_ms <= 0.0 {
            return 0.0;
        }
        (held_ms / self.config.ramp_ms).clamp(0.0, 1.0) as f32
    }

    /// Repeat interval after holding for `held_ms`; shrinks linearly from the
    /// base interval down to `min_interval_fraction` of it.
    pub fn repeat_interval_ms(&self, held_ms: f64) -> f64 {
        let p = self.progress(held_ms) as f64;
        let c = &self.config;
        c.base_interval_ms * (1.0 - (1.0 - c.min_interval_fraction) * p)
    }

    fn sustain_wave(&self, hold: &Hold, held_ms: f64, at_ms: f64) -> WaveSpawn {
        let p = self.progress(held_ms);
        WaveSpawn {
            note: hold.note,
            origin: hold.origin,
            color: hold.color,
            strength: ((0.45 + 0.45 * p) * (0.6 + 0.4 * hold.velocity01))
                .min(self.config.max_strength),
            speed: 0.25 + 0.35 * p,
            width: 0.02 + 0.04 * p,
            decay: 1.2 - 0.4 * p,
            at_ms,
        }
    }

    /// `idle -> held`: start tracking and return the immediate wavefront.
    /// Re-pressing a held note restarts its hold.
    pub fn press(&mut self, ev: &NoteEvent, origin: Vec2, color: Vec3) -> WaveSpawn {
        let hold = Hold {
            note: ev.note,
            velocity01: ev.velocity01(),
            start_ms: ev.timestamp_ms,
            last_spawn_ms: ev.timestamp_ms,
            origin,
            color,
        };
        let spawn = self.sustain_wave(&hold, 0.0, ev.timestamp_ms);
        if self.holds.insert(ev.note, hold).is_some() {
            log::debug!("[hold] note {} re-pressed while held", ev.note);
        }
        spawn
    }

    /// Emit wavefronts for every hold whose repeat interval has elapsed.
    pub fn poll(&mut self, now_ms: f64) -> SmallVec<[WaveSpawn; 4]> {
        let mut out = SmallVec::new();
        let mut notes: SmallVec<[u8; 16]> = self.holds.keys().copied().collect();
        notes.sort_unstable();
        for note in notes {
            let Some(hold) = self.holds.get(&note) else {
                continue;
            };
            let held_ms = now_ms - hold.start_ms;
            if now_ms - hold.last_spawn_ms >= self.repeat_interval_ms(held_ms) {
                out.push(self.sustain_wave(hold, held_ms, now_ms));
                if let Some(hold) = self.holds.get_mut(&note) {
                    hold.last_spawn_ms = now_ms;
                }
            }
        }
        out
    }

    /// `held -> released`: emit the final burst and forget the note.
    /// Releasing an untracked note does nothing.
    pub fn release(&mut self, note: u8, held_ms: f64, now_ms: f64) -> Option<(HoldPhase, WaveSpawn)> {
        let hold = self.holds.remove(&note)?;
        let held_ms = if held_ms.is_finite() && held_ms >= 0.0 {
            held_ms
        } else {
            (now_ms - hold.start_ms).max(0.0)
        };
        let boost = (held_ms / self.config.release_full_ms).clamp(0.0, 1.0) as f32;
        let spawn = WaveSpawn {
            note,
            origin: hold.origin,
            color: hold.color,
            strength: (0.5 + boost * 0.8).min(self.config.max_strength),
            speed: 0.35 + 0.4 * boost,
            width: 0.03 + 0.06 * boost,
            decay: 0.9,
            at_ms: now_ms,
        };
        log::debug!("[hold] note {note} released after {held_ms:.0} ms (boost {boost:.2})");
        Some((HoldPhase::Released, spawn))
    }

    pub fn phase(&self, note: u8) -> HoldPhase {
        if self.holds.contains_key(&note) {
            HoldPhase::Held
        } else {
            HoldPhase::Idle
        }
    }

    pub fn get(&self, note: u8) -> Option<&Hold> {
        self.holds.get(&note)
    }

    pub fn is_held(&self, note: u8) -> bool {
        self.holds.contains_key(&note)
    }

    pub fn held_count(&self) -> usize {
        self.holds.len()
    }

    /// Currently held notes in ascending order.
    pub fn active_notes(&self) -> SmallVec<[u8; 16]> {
        let mut notes: SmallVec<[u8; 16]> = self.holds.keys().copied().collect();
        notes.sort_unstable();
        notes
    }
}
