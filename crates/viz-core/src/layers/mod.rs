//! The six visual layers and the interface they share.
//!
//! Every layer follows the same pattern: note events spawn instances into
//! fixed-capacity pools, `update` integrates those pools with a clamped frame
//! delta, and `frame` marshals them into record sets for the renderer.

mod bubbles;
mod plasma;
mod solar;
mod trees;
mod water;
mod waves;

pub use bubbles::BubblesLayer;
pub use plasma::PlasmaLayer;
pub use solar::SolarLayer;
pub use trees::TreesLayer;
pub use water::WaterLayer;
pub use waves::WavesLayer;

use crate::error::VizError;
use crate::marshal::{Record, ZERO_RECORD};
use crate::note::NoteEvent;
use rand::prelude::*;
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Bubbles,
    Waves,
    Plasma,
    Trees,
    Solar,
    Water,
}

impl LayerKind {
    pub const ALL: [LayerKind; 6] = [
        LayerKind::Bubbles,
        LayerKind::Waves,
        LayerKind::Plasma,
        LayerKind::Trees,
        LayerKind::Solar,
        LayerKind::Water,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LayerKind::Bubbles => "bubbles",
            LayerKind::Waves => "waves",
            LayerKind::Plasma => "plasma",
            LayerKind::Trees => "trees",
            LayerKind::Solar => "solar",
            LayerKind::Water => "water",
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayerKind {
    type Err = VizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        LayerKind::ALL
            .into_iter()
            .find(|k| k.name() == wanted)
            .ok_or_else(|| VizError::UnknownLayer(s.to_string()))
    }
}

/// Which note events a layer reacts to. The stack skips dispatch for a
/// `false` entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Handles {
    pub note_on: bool,
    pub note_off: bool,
}

/// How the renderer should draw a record set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum SetKind {
    /// geometry = [x, y, size, fade]
    Discs = 1,
    /// geometry = [x, y, radius, strength]
    Rings = 2,
}

/// One marshalled pool: a geometry array and a tint array, both exactly
/// `capacity` records long and in slot order.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordSet {
    pub name: &'static str,
    pub kind: SetKind,
    pub geometry: Vec<Record>,
    pub tint: Vec<Record>,
}

/// Everything a renderer needs for one frame of a layer.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerFrame {
    pub kind: LayerKind,
    pub resolution: [f32; 2],
    pub time_sec: f32,
    pub params: [Record; 2],
    pub sets: SmallVec<[RecordSet; 3]>,
}

impl LayerFrame {
    pub fn new(kind: LayerKind, resolution: [f32; 2], time_sec: f32) -> Self {
        Self {
            kind,
            resolution,
            time_sec,
            params: [ZERO_RECORD; 2],
            sets: SmallVec::new(),
        }
    }

    pub fn set(&self, name: &str) -> Option<&RecordSet> {
        self.sets.iter().find(|s| s.name == name)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct LayerOptions {
    pub seed: u64,
}

impl Default for LayerOptions {
    fn default() -> Self {
        Self {
            seed: rand::thread_rng().gen(),
        }
    }
}

impl LayerOptions {
    pub fn seeded(seed: u64) -> Self {
        Self { seed }
    }

    /// Per-layer RNG derived from the base seed so layers stay independent.
    pub(crate) fn rng_for(&self, kind: LayerKind) -> StdRng {
        let mix = self.seed ^ (kind.index() as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        StdRng::seed_from_u64(mix)
    }
}

pub trait Layer {
    fn kind(&self) -> LayerKind;

    fn handles(&self) -> Handles;

    fn note_on(&mut self, ev: &NoteEvent);

    /// `held_ms` is how long the note was down; 0 is a valid tap.
    fn note_off(&mut self, _ev: &NoteEvent, _held_ms: f64) {}

    /// Advance by `delta_ms` (clamped internally) with `now_ms` as the
    /// current clock. A zero delta changes nothing.
    fn update(&mut self, delta_ms: f64, now_ms: f64);

    /// Update output resolution; never touches pool contents.
    fn resize(&mut self, width: u32, height: u32);

    /// Marshal the current state. Pure: calling it repeatedly yields the
    /// same frame.
    fn frame(&self) -> LayerFrame;
}

/// Build a layer of the given kind.
pub fn create_layer(kind: LayerKind, options: &LayerOptions) -> Result<Box<dyn Layer>, VizError> {
    let layer: Box<dyn Layer> = match kind {
        LayerKind::Bubbles => Box::new(BubblesLayer::new(options)?),
        LayerKind::Waves => Box::new(WavesLayer::new(options)?),
        LayerKind::Plasma => Box::new(PlasmaLayer::new(options)?),
        LayerKind::Trees => Box::new(TreesLayer::new(options)?),
        LayerKind::Solar => Box::new(SolarLayer::new(options)?),
        LayerKind::Water => Box::new(WaterLayer::new(options)?),
    };
    Ok(layer)
}
