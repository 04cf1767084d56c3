use super::{Handles, Layer, LayerFrame, LayerKind, LayerOptions, RecordSet, SetKind};
use crate::constants::{LEAF_BURST_K, LEAF_CAPACITY, TREE_CAPACITY};
use crate::error::VizError;
use crate::integrate::{clamp_delta_sec, integrate};
use crate::marshal::marshal;
use crate::note::{NoteEvent, MIDI_MAX};
use crate::particle::{FlashDecay, Particle, ParticleLaw};
use crate::pool::{FullPolicy, PoolConfig, SlotPool};
use crate::spawn::{boosted_velocity, burst_count, burst_life, jitter};
use crate::state::Viewport;
use glam::Vec2;
use rand::prelude::*;

// Trees grow upward and slow down; their flash fades polynomially on its own
// timer, so either the flash or the lifespan can end a tree.
const TREE_LAW: ParticleLaw = ParticleLaw::drifting(Vec2::new(0.0, -0.03), 0.99, 0.0)
    .with_flash(FlashDecay::Power {
        per_sec: 0.15,
        exponent: 2.0,
    });

// Leaf flash lasts 4 s, inside the lifespan range, so either timer can end
// a leaf.
const LEAF_LAW: ParticleLaw = ParticleLaw::drifting(Vec2::new(0.0, -0.05), 0.98, 0.08)
    .with_flash(FlashDecay::Linear { per_sec: 0.25 });

/// Note-on plants a flashing tree at the note's x position (slot 0 is
/// recycled when full). Note-off sheds a burst of leaves whose size grows
/// with the hold; leaves that do not fit are dropped.
pub struct TreesLayer {
    trees: SlotPool<Particle>,
    leaves: SlotPool<Particle>,
    viewport: Viewport,
    rng: StdRng,
}

impl TreesLayer {
    pub const TREE_POOL: PoolConfig = PoolConfig::new(TREE_CAPACITY, FullPolicy::OverwriteFirst);
    pub const LEAF_POOL: PoolConfig = PoolConfig::new(LEAF_CAPACITY, FullPolicy::DropOnFull);

    pub fn new(options: &LayerOptions) -> Result<Self, VizError> {
        Ok(Self {
            trees: SlotPool::new("trees", Self::TREE_POOL)?,
            leaves: SlotPool::new("leaves", Self::LEAF_POOL)?,
            viewport: Viewport::default(),
            rng: options.rng_for(LayerKind::Trees),
        })
    }

    pub fn trees(&self) -> &SlotPool<Particle> {
        &self.trees
    }

    pub fn leaves(&self) -> &SlotPool<Particle> {
        &self.leaves
    }

    /// Canopy position of the live tree closest to `x`, if any.
    fn canopy_near(&self, x: f32) -> Option<Vec2> {
        self.trees
            .iter_active()
            .min_by(|a, b| {
                (a.pos.x - x)
                    .abs()
                    .total_cmp(&(b.pos.x - x).abs())
            })
            .map(|t| t.pos + Vec2::new(0.0, t.size * 0.5))
    }
}

impl Layer for TreesLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::Trees
    }

    fn handles(&self) -> Handles {
        Handles {
            note_on: true,
            note_off: true,
        }
    }

    fn note_on(&mut self, ev: &NoteEvent) {
        let v01 = ev.velocity01();
        let rng = &mut self.rng;
        let pos = Vec2::new(ev.x_norm(), 0.0);
        let vel = Vec2::new(0.0, 0.05 + 0.1 * v01);
        let size = 0.1 + 0.25 * v01;
        let life = 4.0 + rng.gen::<f32>() * 4.0;
        let tree = Particle::spawn(pos, vel, size, life, ev.timestamp_ms)
            .with_color(ev.tint(), ev.hue01())
            .with_intensity(0.5 + 0.5 * v01);
        self.trees.spawn(tree);
    }

    fn note_off(&mut self, ev: &NoteEvent, held_ms: f64) {
        let boosted = boosted_velocity(ev.velocity, held_ms);
        let v01 = (boosted / MIDI_MAX as f32).clamp(0.0, 1.0);
        let origin = self
            .canopy_near(ev.x_norm())
            .unwrap_or_else(|| Vec2::new(ev.x_norm(), 0.3 + self.rng.gen::<f32>() * 0.3));
        for _ in 0..burst_count(boosted, LEAF_BURST_K) {
            let rng = &mut self.rng;
            let vel = jitter(rng, 0.12) + Vec2::new(0.0, 0.05 * v01);
            let life = burst_life(rng);
            let leaf = Particle::spawn(origin, vel, 0.01 + 0.02 * v01, life, ev.timestamp_ms)
                .with_color(ev.tint(), ev.hue01());
            if self.leaves.spawn(leaf).is_none() {
                break;
            }
        }
    }

    fn update(&mut self, delta_ms: f64, now_ms: f64) {
        self.viewport.now_ms = now_ms;
        let dt = clamp_delta_sec(delta_ms);
        integrate(&mut self.trees, &TREE_LAW, dt, &mut self.rng);
        integrate(&mut self.leaves, &LEAF_LAW, dt, &mut self.rng);
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.viewport.resize(width, height);
    }

    fn frame(&self) -> LayerFrame {
        let mut frame = LayerFrame::new(
            LayerKind::Trees,
            self.viewport.resolution(),
            self.viewport.time_sec(),
        );
        frame.params[0] = [self.viewport.aspect(), 0.0, 0.0, 0.0];
        frame.sets.push(RecordSet {
            name: "trees",
            kind: SetKind::Discs,
            geometry: marshal(&self.trees, |t| [t.pos.x, t.pos.y, t.size, t.age_ratio()]),
            tint: marshal(&self.trees, |t| [t.color.x, t.color.y, t.color.z, t.intensity]),
        });
        frame.sets.push(RecordSet {
            name: "leaves",
            kind: SetKind::Discs,
            geometry: marshal(&self.leaves, |l| [l.pos.x, l.pos.y, l.size, l.age_ratio()]),
            tint: marshal(&self.leaves, |l| [l.color.x, l.color.y, l.color.z, l.intensity]),
        });
        frame
    }
}
