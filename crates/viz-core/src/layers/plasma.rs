use super::{Handles, Layer, LayerFrame, LayerKind, LayerOptions, RecordSet, SetKind};
use crate::constants::{
    PLASMA_BURST_K, PLASMA_CAPACITY, PLASMA_FRICTION, PLASMA_JITTER, PLASMA_SIZE_BASE,
    PLASMA_SIZE_SPAN,
};
use crate::error::VizError;
use crate::integrate::{clamp_delta_sec, integrate};
use crate::marshal::marshal;
use crate::note::NoteEvent;
use crate::particle::{Particle, ParticleLaw};
use crate::pool::{FullPolicy, PoolConfig, SlotPool};
use crate::spawn::{burst_count, burst_life, jitter, unit_direction};
use crate::state::{GlowEnvelope, Viewport};
use glam::Vec2;
use rand::prelude::*;

const LAW: ParticleLaw = ParticleLaw::drifting(Vec2::ZERO, PLASMA_FRICTION, PLASMA_JITTER);

/// Velocity-scaled bursts of plasma seeds. Late seeds are dropped when the
/// pool is full; note-off is ignored.
pub struct PlasmaLayer {
    seeds: SlotPool<Particle>,
    glow: GlowEnvelope,
    viewport: Viewport,
    rng: StdRng,
}

impl PlasmaLayer {
    pub const POOL: PoolConfig = PoolConfig::new(PLASMA_CAPACITY, FullPolicy::DropOnFull);

    pub fn new(options: &LayerOptions) -> Result<Self, VizError> {
        Ok(Self {
            seeds: SlotPool::new("plasma", Self::POOL)?,
            glow: GlowEnvelope::default(),
            viewport: Viewport::default(),
            rng: options.rng_for(LayerKind::Plasma),
        })
    }

    pub fn pool(&self) -> &SlotPool<Particle> {
        &self.seeds
    }

    pub fn glow(&self) -> f32 {
        self.glow.level()
    }
}

impl Layer for PlasmaLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::Plasma
    }

    fn handles(&self) -> Handles {
        Handles {
            note_on: true,
            note_off: false,
        }
    }

    fn note_on(&mut self, ev: &NoteEvent) {
        let v01 = ev.velocity01();
        // octave 4 sits in the middle of the screen
        let center = Vec2::new(ev.x_norm(), 0.5 + (ev.octave() - 4) as f32 * 0.1);
        for _ in 0..burst_count(ev.velocity as f32, PLASMA_BURST_K) {
            let rng = &mut self.rng;
            let pos = (center + jitter(rng, 0.04)).clamp(Vec2::ZERO, Vec2::ONE);
            let vel = unit_direction(rng) * (0.05 + 0.1 * rng.gen::<f32>());
            let size = PLASMA_SIZE_BASE + v01 * PLASMA_SIZE_SPAN;
            let life = burst_life(rng);
            let seed = Particle::spawn(pos, vel, size, life, ev.timestamp_ms)
                .with_color(ev.tint(), ev.hue01());
            if self.seeds.spawn(seed).is_none() {
                break;
            }
        }
        self.glow.kick(v01);
    }

    fn update(&mut self, delta_ms: f64, now_ms: f64) {
        self.viewport.now_ms = now_ms;
        let dt = clamp_delta_sec(delta_ms);
        self.glow.step(dt);
        integrate(&mut self.seeds, &LAW, dt, &mut self.rng);
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.viewport.resize(width, height);
    }

    fn frame(&self) -> LayerFrame {
        let mut frame = LayerFrame::new(
            LayerKind::Plasma,
            self.viewport.resolution(),
            self.viewport.time_sec(),
        );
        frame.params[0] = [self.viewport.aspect(), self.glow.level(), 0.0, 0.0];
        frame.sets.push(RecordSet {
            name: "plasma",
            kind: SetKind::Discs,
            geometry: marshal(&self.seeds, |s| [s.pos.x, s.pos.y, s.size, s.age_ratio()]),
            tint: marshal(&self.seeds, |s| {
                [s.color.x, s.color.y, s.color.z, 1.0 - s.age_ratio()]
            }),
        });
        frame
    }
}
