use super::{Handles, Layer, LayerFrame, LayerKind, LayerOptions, RecordSet, SetKind};
use crate::constants::{
    BUBBLE_BUOYANCY, BUBBLE_CAPACITY, BUBBLE_FRICTION, BUBBLE_JITTER, BUBBLE_RADIUS_BASE,
    BUBBLE_RADIUS_SPAN, BUBBLE_RISE_BASE, BUBBLE_RISE_SPAN,
};
use crate::error::VizError;
use crate::integrate::{clamp_delta_sec, integrate};
use crate::marshal::marshal;
use crate::note::NoteEvent;
use crate::particle::{Particle, ParticleLaw};
use crate::pool::{FullPolicy, PoolConfig, SlotPool};
use crate::spawn::burst_life;
use crate::state::Viewport;
use glam::Vec2;
use rand::prelude::*;

const LAW: ParticleLaw =
    ParticleLaw::drifting(Vec2::new(0.0, BUBBLE_BUOYANCY), BUBBLE_FRICTION, BUBBLE_JITTER);

/// One rising bubble per note-on; oldest bubble is recycled when full.
/// Note-off is ignored.
pub struct BubblesLayer {
    bubbles: SlotPool<Particle>,
    viewport: Viewport,
    rng: StdRng,
}

impl BubblesLayer {
    pub const POOL: PoolConfig = PoolConfig::new(BUBBLE_CAPACITY, FullPolicy::OverwriteOldest);

    pub fn new(options: &LayerOptions) -> Result<Self, VizError> {
        Ok(Self {
            bubbles: SlotPool::new("bubbles", Self::POOL)?,
            viewport: Viewport::default(),
            rng: options.rng_for(LayerKind::Bubbles),
        })
    }

    pub fn pool(&self) -> &SlotPool<Particle> {
        &self.bubbles
    }

    /// Initial radius for a note of the given velocity.
    pub fn radius_for(ev: &NoteEvent) -> f32 {
        BUBBLE_RADIUS_BASE + ev.velocity01() * BUBBLE_RADIUS_SPAN
    }
}

impl Layer for BubblesLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::Bubbles
    }

    fn handles(&self) -> Handles {
        Handles {
            note_on: true,
            note_off: false,
        }
    }

    fn note_on(&mut self, ev: &NoteEvent) {
        let rng = &mut self.rng;
        let pos = Vec2::new(ev.x_norm(), 0.05 + rng.gen::<f32>() * 0.1);
        let vel = Vec2::new(
            rng.gen_range(-0.03..=0.03),
            BUBBLE_RISE_BASE + ev.velocity01() * BUBBLE_RISE_SPAN,
        );
        let life = burst_life(rng);
        let bubble = Particle::spawn(pos, vel, Self::radius_for(ev), life, ev.timestamp_ms)
            .with_color(ev.tint(), ev.hue01());
        self.bubbles.spawn(bubble);
    }

    fn update(&mut self, delta_ms: f64, now_ms: f64) {
        self.viewport.now_ms = now_ms;
        let dt = clamp_delta_sec(delta_ms);
        integrate(&mut self.bubbles, &LAW, dt, &mut self.rng);
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.viewport.resize(width, height);
    }

    fn frame(&self) -> LayerFrame {
        let mut frame = LayerFrame::new(
            LayerKind::Bubbles,
            self.viewport.resolution(),
            self.viewport.time_sec(),
        );
        let fill = self.bubbles.active_count() as f32 / self.bubbles.capacity() as f32;
        frame.params[0] = [self.viewport.aspect(), fill, 0.0, 0.0];
        frame.sets.push(RecordSet {
            name: "bubbles",
            kind: SetKind::Discs,
            geometry: marshal(&self.bubbles, |b| [b.pos.x, b.pos.y, b.size, b.age_ratio()]),
            tint: marshal(&self.bubbles, |b| {
                [b.color.x, b.color.y, b.color.z, 1.0 - b.age_ratio()]
            }),
        });
        frame
    }
}
