use super::{Handles, Layer, LayerFrame, LayerKind, LayerOptions, RecordSet, SetKind};
use crate::constants::{WAVES_CAPACITY, WAVES_MAX_RADIUS, WAVES_RELEASE_BURST_K, WAVES_WIDTH_CAP};
use crate::error::VizError;
use crate::integrate::{clamp_delta_sec, integrate};
use crate::marshal::marshal;
use crate::note::{NoteEvent, MIDI_MAX};
use crate::pool::{FullPolicy, PoolConfig, SlotPool};
use crate::spawn::{boosted_velocity, burst_count};
use crate::state::Viewport;
use crate::wave::{Wave, WaveLaw};
use glam::Vec2;
use rand::prelude::*;

const LAW: WaveLaw = WaveLaw {
    width_cap: WAVES_WIDTH_CAP,
    width_rate: 1.5,
    min_strength: 0.01,
    max_radius: WAVES_MAX_RADIUS,
};

/// Wavefronts rising from the bottom edge at the note's x position. Releases
/// send a staggered train of waves whose size grows with the hold time.
pub struct WavesLayer {
    waves: SlotPool<Wave>,
    viewport: Viewport,
    rng: StdRng,
}

impl WavesLayer {
    pub const POOL: PoolConfig = PoolConfig::new(WAVES_CAPACITY, FullPolicy::OverwriteOldest);

    pub fn new(options: &LayerOptions) -> Result<Self, VizError> {
        Ok(Self {
            waves: SlotPool::new("waves", Self::POOL)?,
            viewport: Viewport::default(),
            rng: options.rng_for(LayerKind::Waves),
        })
    }

    pub fn pool(&self) -> &SlotPool<Wave> {
        &self.waves
    }

    fn launch(&mut self, ev: &NoteEvent, velocity: f32, speed_scale: f32) {
        let v01 = (velocity / MIDI_MAX as f32).clamp(0.0, 1.0);
        let origin = Vec2::new(ev.x_norm(), 0.0);
        let speed = (0.25 + v01 * 0.35) * speed_scale * (0.9 + 0.2 * self.rng.gen::<f32>());
        let wave = Wave::spawn(origin, speed, 0.3 + v01 * 0.7, 0.8, ev.timestamp_ms)
            .with_width(0.01)
            .with_color(ev.tint());
        self.waves.spawn(wave);
    }
}

impl Layer for WavesLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::Waves
    }

    fn handles(&self) -> Handles {
        Handles {
            note_on: true,
            note_off: true,
        }
    }

    fn note_on(&mut self, ev: &NoteEvent) {
        self.launch(ev, ev.velocity as f32, 1.0);
    }

    fn note_off(&mut self, ev: &NoteEvent, held_ms: f64) {
        let boosted = boosted_velocity(ev.velocity, held_ms);
        for i in 0..burst_count(boosted, WAVES_RELEASE_BURST_K) {
            self.launch(ev, boosted, 1.0 + i as f32 * 0.25);
        }
    }

    fn update(&mut self, delta_ms: f64, now_ms: f64) {
        self.viewport.now_ms = now_ms;
        let dt = clamp_delta_sec(delta_ms);
        integrate(&mut self.waves, &LAW, dt, &mut self.rng);
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.viewport.resize(width, height);
    }

    fn frame(&self) -> LayerFrame {
        let mut frame = LayerFrame::new(
            LayerKind::Waves,
            self.viewport.resolution(),
            self.viewport.time_sec(),
        );
        frame.params[0] = [self.viewport.aspect(), 0.0, 0.0, 0.0];
        frame.sets.push(RecordSet {
            name: "waves",
            kind: SetKind::Rings,
            geometry: marshal(&self.waves, |w| [w.origin.x, w.origin.y, w.radius, w.strength]),
            tint: marshal(&self.waves, |w| [w.color.x, w.color.y, w.color.z, w.width]),
        });
        frame
    }
}
