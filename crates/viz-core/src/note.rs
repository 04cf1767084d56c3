//! Note events as seen by the layers, plus the values derived from them.
//!
//! Raw values are clamped into the MIDI domain when an event is built, so
//! every derivation below (position, hue, tint) stays in range.

use crate::constants::{
    HUE_STEP_DEG, TINT_LIGHTNESS_BASE, TINT_LIGHTNESS_SPAN, TINT_SATURATION,
};
use glam::Vec3;

pub const MIDI_MAX: u8 = 127;

/// A single note-on or note-off as delivered by a MIDI source.
///
/// Fields:
/// - `note`: MIDI note number 0..=127
/// - `velocity`: MIDI velocity 0..=127
/// - `timestamp_ms`: monotonic timestamp of the event in milliseconds
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoteEvent {
    pub note: u8,
    pub velocity: u8,
    pub timestamp_ms: f64,
}

impl NoteEvent {
    /// Build an event, clamping note and velocity into 0..=127.
    pub fn new(note: i32, velocity: i32, timestamp_ms: f64) -> Self {
        Self {
            note: clamp_midi(note),
            velocity: clamp_midi(velocity),
            timestamp_ms,
        }
    }

    #[inline]
    pub fn velocity01(&self) -> f32 {
        self.velocity as f32 / MIDI_MAX as f32
    }

    /// Linear note-to-x mapping in 0..=1.
    #[inline]
    pub fn x_norm(&self) -> f32 {
        self.note as f32 / MIDI_MAX as f32
    }

    #[inline]
    pub fn pitch_class(&self) -> u8 {
        self.note % 12
    }

    /// Pitch-class hue in degrees (0, 30, ... 330).
    #[inline]
    pub fn hue_deg(&self) -> f32 {
        self.pitch_class() as f32 * HUE_STEP_DEG
    }

    /// Pitch-class hue normalized to 0..1.
    #[inline]
    pub fn hue01(&self) -> f32 {
        self.hue_deg() / 360.0
    }

    /// Octave number with middle C (60) in octave 4.
    #[inline]
    pub fn octave(&self) -> i32 {
        self.note as i32 / 12 - 1
    }

    /// RGB tint from the color wheel: hue by pitch class, lightness by velocity.
    pub fn tint(&self) -> Vec3 {
        let lightness = TINT_LIGHTNESS_BASE + TINT_LIGHTNESS_SPAN * self.velocity01();
        hsl_to_rgb(self.hue01(), TINT_SATURATION, lightness)
    }
}

/// Note input queued for the next frame. Note-off carries its own velocity;
/// the hold duration is resolved by whoever tracks presses.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NoteInput {
    On(NoteEvent),
    Off(NoteEvent),
}

impl NoteInput {
    pub fn event(&self) -> &NoteEvent {
        match self {
            NoteInput::On(ev) | NoteInput::Off(ev) => ev,
        }
    }
}

#[inline]
pub fn clamp_midi(v: i32) -> u8 {
    v.clamp(0, MIDI_MAX as i32) as u8
}

/// Convert HSL (all components 0..1) to linear RGB.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Vec3 {
    let h = h.rem_euclid(1.0);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);
    if s <= 0.0 {
        return Vec3::splat(l);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    Vec3::new(
        hue_channel(p, q, h + 1.0 / 3.0),
        hue_channel(p, q, h),
        hue_channel(p, q, h - 1.0 / 3.0),
    )
}

fn hue_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}
