//! All six layers driven from one note stream.
//!
//! Notes are queued as they arrive and applied at the top of the next
//! `advance`, before any layer integrates, so a frame always sees every note
//! received since the previous one. Every layer receives every note and every
//! update; selecting a layer only changes which one is presented, so
//! switching back shows its pools mid-decay.

use crate::error::VizError;
use crate::layers::{create_layer, Layer, LayerFrame, LayerKind, LayerOptions};
use crate::note::NoteInput;
use fnv::FnvHashMap;

pub struct LayerStack {
    layers: Vec<Box<dyn Layer>>,
    active: LayerKind,
    pending: Vec<NoteInput>,
    pressed_at: FnvHashMap<u8, f64>,
}

impl LayerStack {
    pub fn new(active: LayerKind, options: &LayerOptions) -> Result<Self, VizError> {
        let layers = LayerKind::ALL
            .into_iter()
            .map(|kind| create_layer(kind, options))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            layers,
            active,
            pending: Vec::new(),
            pressed_at: FnvHashMap::default(),
        })
    }

    pub fn active_kind(&self) -> LayerKind {
        self.active
    }

    pub fn select(&mut self, kind: LayerKind) {
        if kind != self.active {
            log::info!("[layers] {} -> {}", self.active, kind);
            self.active = kind;
        }
    }

    pub fn layer(&self, kind: LayerKind) -> &dyn Layer {
        self.layers[kind.index()].as_ref()
    }

    pub fn active(&self) -> &dyn Layer {
        self.layer(self.active)
    }

    pub fn queue(&mut self, input: NoteInput) {
        self.pending.push(input);
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Apply queued notes, then update every layer.
    pub fn advance(&mut self, delta_ms: f64, now_ms: f64) {
        let pending = std::mem::take(&mut self.pending);
        for input in &pending {
            self.dispatch(input);
        }
        self.pending = pending;
        self.pending.clear();

        for layer in self.layers.iter_mut() {
            layer.update(delta_ms, now_ms);
        }
    }

    fn dispatch(&mut self, input: &NoteInput) {
        match *input {
            NoteInput::On(ev) => {
                self.pressed_at.insert(ev.note, ev.timestamp_ms);
                for layer in self.layers.iter_mut().filter(|l| l.handles().note_on) {
                    layer.note_on(&ev);
                }
            }
            NoteInput::Off(ev) => {
                let held_ms = self
                    .pressed_at
                    .remove(&ev.note)
                    .map(|t| (ev.timestamp_ms - t).max(0.0))
                    .unwrap_or(0.0);
                for layer in self.layers.iter_mut().filter(|l| l.handles().note_off) {
                    layer.note_off(&ev, held_ms);
                }
            }
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        for layer in self.layers.iter_mut() {
            layer.resize(width, height);
        }
    }

    pub fn frame(&self) -> LayerFrame {
        self.active().frame()
    }
}
