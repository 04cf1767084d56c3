//! Solar layer: a sun whose surface parameters follow the playing style, with
//! wavefronts from held notes, flares on attacks and releases, and a bed of
//! embers whose density tracks the energy EMA.
//!
//! Positions are in disk space: the sun is centered at the origin and
//! coordinates run roughly -1..1.

use super::{Handles, Layer, LayerFrame, LayerKind, LayerOptions, RecordSet, SetKind};
use crate::constants::{
    ENERGY_MAX, SOLAR_EMBERS_PER_SEC, SOLAR_EMBER_CAPACITY, SOLAR_FLARE_BURST_K,
    SOLAR_FLARE_CAPACITY, SOLAR_WAVE_CAPACITY, SOLAR_WAVE_MAX_RADIUS,
};
use crate::error::VizError;
use crate::features::{FeatureExtractor, SolarParams};
use crate::hold::{HoldConfig, HoldTracker, WaveSpawn};
use crate::integrate::{clamp_delta_sec, integrate};
use crate::marshal::marshal;
use crate::note::{NoteEvent, MIDI_MAX};
use crate::particle::{FlashDecay, Particle, ParticleLaw};
use crate::pool::{FullPolicy, PoolConfig, SlotPool};
use crate::spawn::{boosted_velocity, burst_count, burst_life, unit_direction};
use crate::state::Viewport;
use crate::wave::{Wave, WaveLaw};
use glam::{Vec2, Vec3};
use rand::prelude::*;

const WAVE_LAW: WaveLaw = WaveLaw {
    width_cap: 0.12,
    width_rate: 1.2,
    min_strength: 0.01,
    max_radius: SOLAR_WAVE_MAX_RADIUS,
};

const FLARE_LAW: ParticleLaw = ParticleLaw::drifting(Vec2::ZERO, 0.97, 0.02).with_flash(
    FlashDecay::Power {
        per_sec: 0.9,
        exponent: 1.5,
    },
);

const EMBER_LAW: ParticleLaw = ParticleLaw::drifting(Vec2::ZERO, 0.99, 0.05);

const WARM: Vec3 = Vec3::new(1.0, 0.55, 0.2);
const COOL: Vec3 = Vec3::new(0.35, 0.6, 1.0);

pub struct SolarLayer {
    waves: SlotPool<Wave>,
    flares: SlotPool<Particle>,
    embers: SlotPool<Particle>,
    features: FeatureExtractor,
    holds: HoldTracker,
    ember_accum: f32,
    viewport: Viewport,
    rng: StdRng,
}

impl SolarLayer {
    pub const WAVE_POOL: PoolConfig =
        PoolConfig::new(SOLAR_WAVE_CAPACITY, FullPolicy::OverwriteOldest);
    pub const FLARE_POOL: PoolConfig =
        PoolConfig::new(SOLAR_FLARE_CAPACITY, FullPolicy::OverwriteOldest);
    pub const EMBER_POOL: PoolConfig = PoolConfig::new(SOLAR_EMBER_CAPACITY, FullPolicy::DropOnFull);

    pub fn new(options: &LayerOptions) -> Result<Self, VizError> {
        Ok(Self {
            waves: SlotPool::new("solar_waves", Self::WAVE_POOL)?,
            flares: SlotPool::new("flares", Self::FLARE_POOL)?,
            embers: SlotPool::new("embers", Self::EMBER_POOL)?,
            features: FeatureExtractor::default(),
            holds: HoldTracker::new(HoldConfig::default()),
            ember_accum: 0.0,
            viewport: Viewport::default(),
            rng: options.rng_for(LayerKind::Solar),
        })
    }

    pub fn waves(&self) -> &SlotPool<Wave> {
        &self.waves
    }

    pub fn flares(&self) -> &SlotPool<Particle> {
        &self.flares
    }

    pub fn embers(&self) -> &SlotPool<Particle> {
        &self.embers
    }

    pub fn features(&self) -> &FeatureExtractor {
        &self.features
    }

    pub fn holds(&self) -> &HoldTracker {
        &self.holds
    }

    pub fn is_note_active(&self, note: u8) -> bool {
        self.holds.is_held(note)
    }

    pub fn params(&self) -> SolarParams {
        self.features.derive(self.holds.held_count())
    }

    /// Where a note sits on the disk: angle by pitch class, radius by octave.
    pub fn origin_for(ev: &NoteEvent) -> Vec2 {
        let angle = ev.hue_deg().to_radians();
        let r = 0.15 + 0.04 * (ev.octave() - 4).clamp(-3, 4) as f32;
        Vec2::from_angle(angle) * r
    }

    /// Pitch-class tint pulled toward warm for low octaves and cool for high
    /// ones.
    pub fn color_for(ev: &NoteEvent) -> Vec3 {
        let t = ((ev.octave() - 2) as f32 / 5.0).clamp(0.0, 1.0);
        ev.tint().lerp(WARM.lerp(COOL, t), 0.5)
    }

    fn spawn_wave(&mut self, spawn: WaveSpawn) {
        let wave = Wave::spawn(spawn.origin, spawn.speed, spawn.strength, spawn.decay, spawn.at_ms)
            .with_width(spawn.width)
            .with_color(spawn.color);
        self.waves.spawn(wave);
    }

    fn flare_burst(&mut self, origin: Vec2, color: Vec3, velocity: f32, at_ms: f64) {
        let v01 = (velocity / MIDI_MAX as f32).clamp(0.0, 1.0);
        for _ in 0..burst_count(velocity, SOLAR_FLARE_BURST_K) {
            let rng = &mut self.rng;
            let outward = origin.try_normalize().unwrap_or_else(|| unit_direction(rng));
            let dir = (outward + unit_direction(rng) * 0.4).normalize_or_zero();
            let vel = dir * (0.1 + 0.2 * v01);
            let life = burst_life(rng);
            let flare = Particle::spawn(origin, vel, 0.04 + 0.06 * v01, life, at_ms)
                .with_color(color, 0.0);
            self.flares.spawn(flare);
        }
    }

    fn spawn_embers(&mut self, dt: f32) {
        let energy01 = (self.features.energy() / ENERGY_MAX * 2.0).clamp(0.0, 1.0);
        self.ember_accum += energy01 * SOLAR_EMBERS_PER_SEC * dt;
        while self.ember_accum >= 1.0 {
            self.ember_accum -= 1.0;
            let rng = &mut self.rng;
            let dir = unit_direction(rng);
            let vel = dir * (0.03 + 0.05 * rng.gen::<f32>());
            let size = 0.006 + 0.01 * rng.gen::<f32>();
            let life = 1.5 + rng.gen::<f32>() * 2.0;
            let ember = Particle::spawn(dir * 0.3, vel, size, life, self.viewport.now_ms)
                .with_color(WARM, 0.0);
            // embers are background detail; they never evict anything
            self.embers.spawn(ember);
        }
    }
}

impl Layer for SolarLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::Solar
    }

    fn handles(&self) -> Handles {
        Handles {
            note_on: true,
            note_off: true,
        }
    }

    fn note_on(&mut self, ev: &NoteEvent) {
        self.features.observe_note_on(ev);
        let origin = Self::origin_for(ev);
        let color = Self::color_for(ev);
        let spawn = self.holds.press(ev, origin, color);
        self.spawn_wave(spawn);
        self.flare_burst(origin, color, ev.velocity as f32, ev.timestamp_ms);
    }

    fn note_off(&mut self, ev: &NoteEvent, held_ms: f64) {
        let Some((_, spawn)) = self.holds.release(ev.note, held_ms, ev.timestamp_ms) else {
            return;
        };
        self.spawn_wave(spawn);
        let boosted = boosted_velocity(ev.velocity, held_ms);
        self.flare_burst(spawn.origin, spawn.color, boosted, ev.timestamp_ms);
    }

    fn update(&mut self, delta_ms: f64, now_ms: f64) {
        self.viewport.now_ms = now_ms;
        let dt = clamp_delta_sec(delta_ms);
        if dt <= 0.0 {
            return;
        }
        self.features.relax(dt);
        for spawn in self.holds.poll(now_ms) {
            self.spawn_wave(spawn);
        }
        self.spawn_embers(dt);
        integrate(&mut self.waves, &WAVE_LAW, dt, &mut self.rng);
        integrate(&mut self.flares, &FLARE_LAW, dt, &mut self.rng);
        integrate(&mut self.embers, &EMBER_LAW, dt, &mut self.rng);
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.viewport.resize(width, height);
    }

    fn frame(&self) -> LayerFrame {
        let mut frame = LayerFrame::new(
            LayerKind::Solar,
            self.viewport.resolution(),
            self.viewport.time_sec(),
        );
        frame.params = self.params().to_records(self.features.energy());
        frame.sets.push(RecordSet {
            name: "wavefronts",
            kind: SetKind::Rings,
            geometry: marshal(&self.waves, |w| [w.origin.x, w.origin.y, w.radius, w.strength]),
            tint: marshal(&self.waves, |w| [w.color.x, w.color.y, w.color.z, w.width]),
        });
        frame.sets.push(RecordSet {
            name: "flares",
            kind: SetKind::Discs,
            geometry: marshal(&self.flares, |f| [f.pos.x, f.pos.y, f.size, f.age_ratio()]),
            tint: marshal(&self.flares, |f| [f.color.x, f.color.y, f.color.z, f.intensity]),
        });
        frame.sets.push(RecordSet {
            name: "embers",
            kind: SetKind::Discs,
            geometry: marshal(&self.embers, |e| [e.pos.x, e.pos.y, e.size, e.age_ratio()]),
            tint: marshal(&self.embers, |e| {
                [e.color.x, e.color.y, e.color.z, 1.0 - e.age_ratio()]
            }),
        });
        frame
    }
}
