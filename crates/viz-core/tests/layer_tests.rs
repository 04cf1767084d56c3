// Layer-level behavior: spawning rules, capabilities, clamped frame deltas
// and the zero-means-empty record convention.

use viz_core::*;

const SEED: u64 = 42;

fn on(note: i32, velocity: i32, t: f64) -> NoteEvent {
    NoteEvent::new(note, velocity, t)
}

fn run(layer: &mut dyn Layer, from_ms: f64, to_ms: f64, step_ms: f64) {
    let mut now = from_ms;
    while now < to_ms {
        now += step_ms;
        layer.update(step_ms, now);
    }
}

fn magnitude(kind: SetKind, r: &Record) -> f32 {
    match kind {
        SetKind::Discs => r[2],
        SetKind::Rings => r[3],
    }
}

fn all_layers() -> Vec<Box<dyn Layer>> {
    let options = LayerOptions::seeded(SEED);
    LayerKind::ALL
        .into_iter()
        .map(|k| create_layer(k, &options).expect("layer"))
        .collect()
}

#[test]
fn bubble_scenario_spawns_one_and_expires() {
    let mut layer = BubblesLayer::new(&LayerOptions::seeded(SEED)).expect("bubbles");
    assert_eq!(layer.pool().capacity(), 100);
    layer.note_on(&on(60, 100, 0.0));

    let active: Vec<_> = layer.pool().iter_active().collect();
    assert_eq!(active.len(), 1, "exactly one bubble per note-on");
    let bubble = active[0];
    assert_eq!(bubble.hue, 0.0);
    assert!((bubble.size - 0.124).abs() < 1e-3, "radius was {}", bubble.size);
    assert!(bubble.life_sec <= 6.0);

    run(&mut layer, 0.0, 60_000.0, 50.0);
    assert_eq!(layer.pool().active_count(), 0);
}

#[test]
fn bubble_hue_follows_pitch_class() {
    let mut layer = BubblesLayer::new(&LayerOptions::seeded(SEED)).expect("bubbles");
    layer.note_on(&on(64, 90, 0.0));
    layer.note_on(&on(76, 90, 1.0));
    let hues: Vec<f32> = layer.pool().iter_active().map(|b| b.hue).collect();
    assert_eq!(hues.len(), 2);
    assert!((hues[0] - 120.0 / 360.0).abs() < 1e-6);
    assert_eq!(hues[0], hues[1], "same pitch class, same hue");
}

#[test]
fn bubbles_overwrite_oldest_when_full() {
    let mut layer = BubblesLayer::new(&LayerOptions::seeded(SEED)).expect("bubbles");
    for i in 0..100 {
        layer.note_on(&on(60, 64, i as f64));
    }
    assert_eq!(layer.pool().active_count(), 100);
    layer.note_on(&on(61, 64, 500.0));
    assert_eq!(layer.pool().active_count(), 100);
    assert_eq!(layer.pool().get(0).map(|b| b.birth_ms), Some(500.0));
}

#[test]
fn oversized_delta_matches_max_step() {
    for kind in LayerKind::ALL {
        let options = LayerOptions::seeded(SEED);
        let mut a = create_layer(kind, &options).expect("layer");
        let mut b = create_layer(kind, &options).expect("layer");
        for layer in [&mut a, &mut b] {
            layer.note_on(&on(60, 100, 0.0));
            layer.note_on(&on(67, 80, 10.0));
        }
        a.update(10_000.0, 100.0);
        b.update(50.0, 100.0);
        assert_eq!(a.frame(), b.frame(), "{kind}: oversized delta applied verbatim");
    }
}

#[test]
fn zero_delta_changes_nothing() {
    for mut layer in all_layers() {
        layer.note_on(&on(62, 100, 0.0));
        layer.update(16.0, 16.0);
        let before = layer.frame();
        layer.update(0.0, 16.0);
        assert_eq!(layer.frame(), before, "{}: zero delta mutated state", layer.kind());
    }
}

#[test]
fn frames_have_fixed_length() {
    for mut layer in all_layers() {
        let empty = layer.frame();
        for set in &empty.sets {
            assert_eq!(set.geometry.len(), set.tint.len());
            assert!(set.geometry.iter().all(|r| *r == ZERO_RECORD));
        }

        for (i, note) in [48, 55, 60, 64, 67, 72].into_iter().enumerate() {
            layer.note_on(&on(note, 110, i as f64 * 40.0));
        }
        run(&mut *layer, 0.0, 500.0, 16.0);
        let frame = layer.frame();
        assert_eq!(frame.sets.len(), empty.sets.len());
        for (set, before) in frame.sets.iter().zip(&empty.sets) {
            assert_eq!(set.geometry.len(), before.geometry.len(), "{} resized", set.name);
            assert_eq!(set.tint.len(), before.tint.len(), "{} resized", set.name);
        }
    }
}

fn assert_records_track_slots<T: Instance>(name: &str, pool: &SlotPool<T>, set: &RecordSet) {
    assert_eq!(set.geometry.len(), pool.capacity());
    for (i, (g, t)) in set.geometry.iter().zip(&set.tint).enumerate() {
        let active = pool.get(i).is_some_and(|s| s.is_active());
        if active {
            assert!(magnitude(set.kind, g) > 0.0, "{name}[{i}]: live slot marshalled empty");
        } else {
            assert_eq!(*g, ZERO_RECORD, "{name}[{i}]: stale geometry");
            assert_eq!(*t, ZERO_RECORD, "{name}[{i}]: stale tint");
        }
    }
}

#[test]
fn expired_bubbles_marshal_to_zero() {
    let mut layer = BubblesLayer::new(&LayerOptions::seeded(SEED)).expect("bubbles");
    for i in 0..8 {
        layer.note_on(&on(60 + i, 100, i as f64));
    }
    run(&mut layer, 0.0, 10_000.0, 50.0);
    assert_eq!(layer.pool().active_count(), 0);
    for i in 0..3 {
        layer.note_on(&on(70 + i, 100, 10_000.0 + i as f64));
    }
    layer.update(16.0, 10_016.0);
    assert_eq!(layer.pool().active_count(), 3);

    let frame = layer.frame();
    assert_records_track_slots("bubbles", layer.pool(), &frame.sets[0]);
}

#[test]
fn expired_solar_waves_marshal_to_zero() {
    let mut layer = SolarLayer::new(&LayerOptions::seeded(SEED)).expect("solar");
    layer.note_on(&on(60, 100, 0.0));
    layer.note_off(&on(60, 100, 10.0), 10.0);
    assert_eq!(layer.waves().active_count(), 2);
    run(&mut layer, 0.0, 10_000.0, 50.0);
    assert_eq!(layer.waves().active_count(), 0);

    layer.note_on(&on(64, 100, 10_000.0));
    layer.note_off(&on(64, 100, 10_010.0), 10.0);
    layer.update(16.0, 10_016.0);
    let frame = layer.frame();
    let rings = frame
        .sets
        .iter()
        .find(|s| s.name == "wavefronts")
        .expect("wavefronts set");
    assert_records_track_slots("wavefronts", layer.waves(), rings);
}

#[test]
fn bubble_brightness_ignores_pitch_class() {
    let mut layer = BubblesLayer::new(&LayerOptions::seeded(SEED)).expect("bubbles");
    layer.note_on(&on(60, 100, 0.0));
    layer.note_on(&on(61, 100, 0.0));
    layer.note_on(&on(66, 100, 0.0));
    let frame = layer.frame();
    let set = &frame.sets[0];
    // the disc shader scales `1 - g.w` by tint w when it lies in (0, 1]
    let fades: Vec<f32> = set
        .geometry
        .iter()
        .zip(&set.tint)
        .take(3)
        .map(|(g, t)| {
            let fade = 1.0 - g[3];
            if t[3] > 0.0 && t[3] <= 1.0 {
                fade * t[3]
            } else {
                fade
            }
        })
        .collect();
    assert_eq!(fades.len(), 3);
    assert!(fades.iter().all(|f| *f == fades[0]), "fades differ: {fades:?}");
    assert_eq!(fades[0], 1.0);
    assert_ne!(set.tint[0][..3], set.tint[1][..3], "pitch class still sets the color");
}

#[test]
fn frame_is_idempotent() {
    for mut layer in all_layers() {
        layer.note_on(&on(70, 90, 0.0));
        layer.update(16.0, 16.0);
        assert_eq!(layer.frame(), layer.frame());
    }
}

#[test]
fn no_op_note_off_layers_are_untouched() {
    for mut layer in all_layers() {
        layer.note_on(&on(60, 100, 0.0));
        layer.update(16.0, 16.0);
        if layer.handles().note_off {
            continue;
        }
        let before = layer.frame();
        layer.note_off(&on(60, 64, 1000.0), 1000.0);
        assert_eq!(layer.frame(), before, "{}: note-off should be ignored", layer.kind());
    }
}

#[test]
fn bubbles_and_plasma_declare_note_off_as_ignored() {
    let options = LayerOptions::seeded(SEED);
    for kind in LayerKind::ALL {
        let layer = create_layer(kind, &options).expect("layer");
        let expect_off = !matches!(kind, LayerKind::Bubbles | LayerKind::Plasma);
        assert!(layer.handles().note_on);
        assert_eq!(layer.handles().note_off, expect_off, "{kind}");
    }
}

#[test]
fn plasma_burst_scales_with_velocity_and_drops_when_full() {
    let mut layer = PlasmaLayer::new(&LayerOptions::seeded(SEED)).expect("plasma");
    layer.note_on(&on(60, 10, 0.0));
    assert_eq!(layer.pool().active_count(), 1);
    layer.note_on(&on(60, 127, 1.0));
    assert_eq!(layer.pool().active_count(), 4);

    for i in 0..40 {
        layer.note_on(&on(60, 127, 2.0 + i as f64));
    }
    assert_eq!(layer.pool().active_count(), layer.pool().capacity());
    let births: Vec<f64> = layer.pool().slots().iter().map(|s| s.birth_ms).collect();
    layer.note_on(&on(72, 127, 999.0));
    let after: Vec<f64> = layer.pool().slots().iter().map(|s| s.birth_ms).collect();
    assert_eq!(births, after, "full plasma pool must drop new seeds");
}

#[test]
fn release_burst_is_stronger_than_attack() {
    let mut tap = WavesLayer::new(&LayerOptions::seeded(SEED)).expect("waves");
    tap.note_off(&on(60, 40, 0.0), 0.0);
    let tapped = tap.pool().active_count();

    let mut held = WavesLayer::new(&LayerOptions::seeded(SEED)).expect("waves");
    held.note_off(&on(60, 40, 0.0), 3000.0);
    assert!(held.pool().active_count() > tapped);
    let strongest = |l: &WavesLayer| {
        l.pool()
            .iter_active()
            .map(|w| w.strength)
            .fold(0.0f32, f32::max)
    };
    assert!(strongest(&held) > strongest(&tap));
}

#[test]
fn water_overwrites_first_slot_when_full() {
    let mut layer = WaterLayer::new(&LayerOptions::seeded(SEED)).expect("water");
    for i in 0..30 {
        layer.note_on(&on(60, 64, i as f64));
    }
    layer.note_on(&on(64, 64, 100.0));
    assert_eq!(layer.pool().active_count(), 30);
    assert_eq!(layer.pool().get(0).map(|r| r.birth_ms), Some(100.0));
    assert_eq!(layer.pool().get(1).map(|r| r.birth_ms), Some(1.0));
}

#[test]
fn water_release_cluster_grows_with_hold() {
    let mut layer = WaterLayer::new(&LayerOptions::seeded(SEED)).expect("water");
    layer.note_off(&on(60, 0, 0.0), 0.0);
    assert_eq!(layer.pool().active_count(), 1);
    layer.note_off(&on(60, 0, 10.0), 3175.0);
    assert_eq!(layer.pool().active_count(), 1 + 4);
}

#[test]
fn trees_flash_and_leaves() {
    let mut layer = TreesLayer::new(&LayerOptions::seeded(SEED)).expect("trees");
    layer.note_on(&on(60, 127, 0.0));
    assert_eq!(layer.trees().active_count(), 1);
    let tree = layer.trees().iter_active().next().cloned().expect("tree");
    assert!((tree.intensity - 1.0).abs() < 1e-6);

    layer.note_off(&on(60, 64, 2000.0), 2000.0);
    // 64 + 2000/25 = 144 -> capped at 127 -> 1 + floor(3) = 4 leaves
    assert_eq!(layer.leaves().active_count(), 4);

    run(&mut layer, 0.0, 1000.0, 16.0);
    let tree_now = layer.trees().iter_active().next().cloned().expect("tree alive");
    assert!(tree_now.intensity < tree.intensity, "flash should fade");
    assert!(tree_now.pos.y > tree.pos.y, "tree should grow upward");

    run(&mut layer, 1000.0, 20_000.0, 50.0);
    assert_eq!(layer.trees().active_count(), 0);
    assert_eq!(layer.leaves().active_count(), 0);
}

#[test]
fn leaves_outlive_two_seconds_of_flash() {
    let mut layer = TreesLayer::new(&LayerOptions::seeded(SEED)).expect("trees");
    layer.note_off(&on(60, 127, 0.0), 0.0);
    assert_eq!(layer.leaves().active_count(), 4);

    // 2.2 s: flash at 1 - 0.25 * 2.2, shortest lifespan is 2.5 s
    run(&mut layer, 0.0, 2200.0, 20.0);
    assert_eq!(layer.leaves().active_count(), 4);
    for leaf in layer.leaves().iter_active() {
        assert!(leaf.intensity > 0.4 && leaf.intensity < 0.5, "{}", leaf.intensity);
    }

    // a leaf whose lifespan is under 4 s ends on age with flash left over
    run(&mut layer, 2200.0, 4000.0, 20.0);
    for leaf in layer.leaves().iter_active() {
        assert!(leaf.life_sec >= 3.9, "leaf with life {} outlived its age", leaf.life_sec);
    }
}

#[test]
fn resize_only_touches_presentation() {
    for mut layer in all_layers() {
        layer.note_on(&on(60, 100, 0.0));
        layer.update(16.0, 16.0);
        let before = layer.frame();
        layer.resize(640, 480);
        let after = layer.frame();
        assert_eq!(after.resolution, [640.0, 480.0]);
        assert_eq!(after.sets, before.sets, "{}: resize touched pools", layer.kind());
    }
}

#[test]
fn out_of_range_notes_stay_in_domain() {
    for mut layer in all_layers() {
        layer.note_on(&NoteEvent::new(500, 900, 0.0));
        layer.note_on(&NoteEvent::new(-20, -1, 1.0));
        layer.note_off(&NoteEvent::new(500, 900, 2.0), f64::INFINITY);
        run(&mut *layer, 0.0, 200.0, 16.0);
        for set in &layer.frame().sets {
            for r in set.geometry.iter().chain(&set.tint) {
                assert!(r.iter().all(|v| v.is_finite()), "{}: non-finite record", set.name);
            }
        }
    }
}

#[test]
fn layer_kind_parses_names() {
    assert_eq!("Solar".parse::<LayerKind>(), Ok(LayerKind::Solar));
    assert_eq!(" water ".parse::<LayerKind>(), Ok(LayerKind::Water));
    assert!(matches!(
        "fire".parse::<LayerKind>(),
        Err(VizError::UnknownLayer(_))
    ));
    for kind in LayerKind::ALL {
        assert_eq!(kind.name().parse::<LayerKind>(), Ok(kind));
    }
}
