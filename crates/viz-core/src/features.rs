//! Streaming musical features for the solar layer.
//!
//! The extractor keeps exponential moving averages of note energy and pitch,
//! plus an EMA-weighted pitch variance updated in a single pass, so no note
//! history is ever stored. Per frame the statistics are turned into a block
//! of clamped shader parameters ([`SolarParams`]).

use crate::constants::{
    DEFAULT_PITCH, EMA_ENERGY_ALPHA, EMA_PITCH_ALPHA, ENERGY_DECAY_PER_SEC, ENERGY_MAX,
    RATE_BOOST_MAX, RATE_BOOST_REF_MS,
};
use crate::marshal::Record;
use crate::note::{NoteEvent, MIDI_MAX};

/// Clamp that maps NaN to the lower bound.
#[inline]
pub(crate) fn saturate(v: f32, lo: f32, hi: f32) -> f32 {
    if v.is_nan() {
        lo
    } else {
        v.clamp(lo, hi)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FeatureExtractor {
    ema_energy: f32,
    ema_pitch: f32,
    ema_pitch_var: f32,
    last_note_ms: Option<f64>,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self {
            ema_energy: 0.0,
            ema_pitch: DEFAULT_PITCH,
            ema_pitch_var: 0.0,
            last_note_ms: None,
        }
    }
}

impl FeatureExtractor {
    /// Rate boost for the interval since the previous note: `300ms / interval`
    /// clamped to 0..=2. The first note gets no boost; simultaneous notes get
    /// the full boost.
    pub fn rate_boost(&self, timestamp_ms: f64) -> f32 {
        let Some(last) = self.last_note_ms else {
            return 0.0;
        };
        let interval = timestamp_ms - last;
        if !interval.is_finite() {
            return 0.0;
        }
        if interval <= 0.0 {
            return RATE_BOOST_MAX;
        }
        saturate((RATE_BOOST_REF_MS / interval) as f32, 0.0, RATE_BOOST_MAX)
    }

    pub fn observe_note_on(&mut self, ev: &NoteEvent) {
        let boost = self.rate_boost(ev.timestamp_ms);
        let sample = ev.velocity01() * (1.0 + boost);
        self.ema_energy += (sample - self.ema_energy) * EMA_ENERGY_ALPHA;
        self.ema_energy = saturate(self.ema_energy, 0.0, ENERGY_MAX);

        let a = EMA_PITCH_ALPHA;
        let note = ev.note as f32;
        let mean = self.ema_pitch;
        let new_mean = mean + a * (note - mean);
        let new_var = (1.0 - a) * (self.ema_pitch_var + a * (note - mean) * (note - new_mean));
        self.ema_pitch = saturate(new_mean, 0.0, MIDI_MAX as f32);
        self.ema_pitch_var = saturate(new_var, 0.0, f32::MAX);

        self.last_note_ms = Some(ev.timestamp_ms);
    }

    /// Let energy relax toward zero between notes.
    pub fn relax(&mut self, dt_sec: f32) {
        if dt_sec > 0.0 {
            self.ema_energy *= (-ENERGY_DECAY_PER_SEC * dt_sec).exp();
        }
    }

    pub fn energy(&self) -> f32 {
        self.ema_energy
    }

    pub fn pitch_mean(&self) -> f32 {
        self.ema_pitch
    }

    pub fn pitch_variance(&self) -> f32 {
        self.ema_pitch_var
    }

    /// Pitch spread in semitones (standard deviation).
    pub fn pitch_spread(&self) -> f32 {
        self.ema_pitch_var.sqrt()
    }

    pub fn last_note_ms(&self) -> Option<f64> {
        self.last_note_ms
    }

    pub fn derive(&self, held_notes: usize) -> SolarParams {
        SolarParams::derive(self, held_notes)
    }
}

/// Continuous shader parameters for the solar layer.
///
/// Ranges: `noise_scale` in 0.5..=4, `rotation_speed` in 0..=1.5,
/// `rotation_dir` is -1 or 1, everything else in 0..=1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolarParams {
    pub brightness: f32,
    pub noise_scale: f32,
    pub turbulence: f32,
    pub corona: f32,
    pub rotation_dir: f32,
    pub rotation_speed: f32,
    pub warm: f32,
    pub cool: f32,
}

impl Default for SolarParams {
    fn default() -> Self {
        FeatureExtractor::default().derive(0)
    }
}

impl SolarParams {
    pub fn derive(features: &FeatureExtractor, held_notes: usize) -> Self {
        let energy = saturate(features.energy() / 1.5, 0.0, 1.0);
        let spread = saturate(features.pitch_spread() / 12.0, 0.0, 1.0);
        let held = saturate(held_notes as f32 / 6.0, 0.0, 1.0);
        let pitch = saturate(features.pitch_mean(), 0.0, MIDI_MAX as f32);
        let offset = (pitch - DEFAULT_PITCH) / 24.0;

        let warm = saturate((84.0 - pitch) / 48.0, 0.0, 1.0);
        Self {
            brightness: saturate(0.25 + 0.6 * energy + 0.15 * held, 0.0, 1.0),
            noise_scale: saturate(1.0 + 2.5 * spread + 0.5 * energy, 0.5, 4.0),
            turbulence: saturate(0.1 + 0.6 * energy + 0.3 * spread, 0.0, 1.0),
            corona: saturate(0.2 + 0.5 * energy + 0.3 * held, 0.0, 1.0),
            rotation_dir: if pitch >= DEFAULT_PITCH { 1.0 } else { -1.0 },
            rotation_speed: saturate(0.1 + 0.9 * energy + 0.2 * offset.abs(), 0.0, 1.5),
            warm,
            cool: 1.0 - warm,
        }
    }

    /// Pack into the two parameter records uploaded with the layer frame.
    pub fn to_records(&self, energy: f32) -> [Record; 2] {
        [
            [self.brightness, self.noise_scale, self.turbulence, self.corona],
            [
                self.rotation_dir * self.rotation_speed,
                self.warm,
                self.cool,
                energy,
            ],
        ]
    }
}
