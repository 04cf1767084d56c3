use super::{Handles, Layer, LayerFrame, LayerKind, LayerOptions, RecordSet, SetKind};
use crate::constants::{
    RIPPLE_CAPACITY, RIPPLE_MAX_RADIUS, RIPPLE_RELEASE_BURST_K, RIPPLE_WIDTH_CAP,
};
use crate::error::VizError;
use crate::integrate::{clamp_delta_sec, integrate};
use crate::marshal::marshal;
use crate::note::{NoteEvent, MIDI_MAX};
use crate::pool::{FullPolicy, PoolConfig, SlotPool};
use crate::spawn::{boosted_velocity, burst_count, jitter};
use crate::state::{GlowEnvelope, Viewport};
use crate::wave::{Wave, WaveLaw};
use glam::Vec2;
use rand::prelude::*;

const LAW: WaveLaw = WaveLaw {
    width_cap: RIPPLE_WIDTH_CAP,
    width_rate: 2.0,
    min_strength: 0.01,
    max_radius: RIPPLE_MAX_RADIUS,
};

/// Ripples on a water surface. A full pool overwrites slot 0; releases drop
/// a cluster of ripples around the note's position.
pub struct WaterLayer {
    ripples: SlotPool<Ripple>,
    caustics: GlowEnvelope,
    viewport: Viewport,
    rng: StdRng,
}

type Ripple = Wave;

impl WaterLayer {
    pub const POOL: PoolConfig = PoolConfig::new(RIPPLE_CAPACITY, FullPolicy::OverwriteFirst);

    pub fn new(options: &LayerOptions) -> Result<Self, VizError> {
        Ok(Self {
            ripples: SlotPool::new("ripples", Self::POOL)?,
            caustics: GlowEnvelope::default(),
            viewport: Viewport::default(),
            rng: options.rng_for(LayerKind::Water),
        })
    }

    pub fn pool(&self) -> &SlotPool<Wave> {
        &self.ripples
    }

    fn drop_ripple(&mut self, ev: &NoteEvent, origin: Vec2, v01: f32) {
        let ripple = Ripple::spawn(origin, 0.35, 0.4 + 0.6 * v01, 1.4, ev.timestamp_ms)
            .with_width(0.015)
            .with_color(ev.tint());
        self.ripples.spawn(ripple);
    }
}

impl Layer for WaterLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::Water
    }

    fn handles(&self) -> Handles {
        Handles {
            note_on: true,
            note_off: true,
        }
    }

    fn note_on(&mut self, ev: &NoteEvent) {
        let origin = Vec2::new(ev.x_norm(), 0.3 + self.rng.gen::<f32>() * 0.4);
        self.drop_ripple(ev, origin, ev.velocity01());
        self.caustics.kick(ev.velocity01() * 0.5);
    }

    fn note_off(&mut self, ev: &NoteEvent, held_ms: f64) {
        let boosted = boosted_velocity(ev.velocity, held_ms);
        let v01 = (boosted / MIDI_MAX as f32).clamp(0.0, 1.0);
        let center = Vec2::new(ev.x_norm(), 0.5);
        for _ in 0..burst_count(boosted, RIPPLE_RELEASE_BURST_K) {
            let origin = (center + jitter(&mut self.rng, 0.08)).clamp(Vec2::ZERO, Vec2::ONE);
            self.drop_ripple(ev, origin, v01);
        }
        self.caustics.kick(v01);
    }

    fn update(&mut self, delta_ms: f64, now_ms: f64) {
        self.viewport.now_ms = now_ms;
        let dt = clamp_delta_sec(delta_ms);
        self.caustics.step(dt);
        integrate(&mut self.ripples, &LAW, dt, &mut self.rng);
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.viewport.resize(width, height);
    }

    fn frame(&self) -> LayerFrame {
        let mut frame = LayerFrame::new(
            LayerKind::Water,
            self.viewport.resolution(),
            self.viewport.time_sec(),
        );
        frame.params[0] = [self.viewport.aspect(), self.caustics.level(), 0.0, 0.0];
        frame.sets.push(RecordSet {
            name: "ripples",
            kind: SetKind::Rings,
            geometry: marshal(&self.ripples, |r| [r.origin.x, r.origin.y, r.radius, r.strength]),
            tint: marshal(&self.ripples, |r| [r.color.x, r.color.y, r.color.z, r.width]),
        });
        frame
    }
}
