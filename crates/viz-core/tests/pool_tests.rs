// Slot pool, integrator and marshaller behavior shared by every layer.

use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use viz_core::*;

fn particle(birth_ms: f64) -> Particle {
    Particle::spawn(Vec2::new(0.5, 0.5), Vec2::ZERO, 0.1, 3.0, birth_ms)
}

fn pool(capacity: usize, policy: FullPolicy) -> SlotPool<Particle> {
    SlotPool::new("test", PoolConfig::new(capacity, policy)).expect("valid pool")
}

#[test]
fn pool_config_rejects_bad_capacities() {
    assert_eq!(
        PoolConfig::new(0, FullPolicy::DropOnFull).validate("p"),
        Err(VizError::ZeroCapacity("p"))
    );
    assert!(matches!(
        PoolConfig::new(10_000, FullPolicy::DropOnFull).validate("p"),
        Err(VizError::CapacityTooLarge { .. })
    ));
    assert!(SlotPool::<Particle>::new("p", PoolConfig::new(0, FullPolicy::OverwriteFirst)).is_err());
}

#[test]
fn find_free_slot_scans_in_index_order() {
    let mut p = pool(4, FullPolicy::DropOnFull);
    assert_eq!(p.find_free_index(), Some(0));
    p.spawn(particle(0.0));
    p.spawn(particle(1.0));
    assert_eq!(p.find_free_index(), Some(2));
    assert!(p.find_free_slot().is_some_and(|s| !s.active));
}

#[test]
fn capacity_never_exceeded_for_any_policy() {
    for policy in [
        FullPolicy::DropOnFull,
        FullPolicy::OverwriteFirst,
        FullPolicy::OverwriteOldest,
    ] {
        let mut p = pool(8, policy);
        for i in 0..50 {
            p.spawn(particle(i as f64));
            assert!(p.active_count() <= p.capacity(), "{policy:?} exceeded capacity");
        }
        assert_eq!(p.capacity(), 8);
        assert_eq!(p.slots().len(), 8);
    }
}

#[test]
fn drop_on_full_discards_spawn() {
    let mut p = pool(2, FullPolicy::DropOnFull);
    assert_eq!(p.spawn(particle(0.0)), Some(0));
    assert_eq!(p.spawn(particle(1.0)), Some(1));
    let before = p.slots().to_vec();
    assert_eq!(p.spawn(particle(2.0)), None);
    assert_eq!(p.slots(), &before[..], "dropped spawn must not touch slots");
}

#[test]
fn overwrite_first_evicts_slot_zero() {
    let mut p = pool(3, FullPolicy::OverwriteFirst);
    for t in [10.0, 20.0, 30.0] {
        p.spawn(particle(t));
    }
    assert_eq!(p.spawn(particle(40.0)), Some(0));
    assert_eq!(p.get(0).map(|s| s.birth_ms), Some(40.0));
}

#[test]
fn overwrite_oldest_evicts_smallest_birth() {
    let mut p = pool(3, FullPolicy::OverwriteOldest);
    for t in [30.0, 10.0, 20.0] {
        p.spawn(particle(t));
    }
    assert_eq!(p.spawn(particle(40.0)), Some(1));
    assert_eq!(p.spawn(particle(50.0)), Some(2));
    assert_eq!(p.spawn(particle(60.0)), Some(0));
}

#[test]
fn expired_particle_is_fully_zeroed() {
    let mut p = pool(2, FullPolicy::DropOnFull);
    p.spawn(Particle::spawn(Vec2::ONE, Vec2::ONE, 0.2, 0.1, 0.0).with_color(Vec3::ONE, 0.5));
    let law = ParticleLaw::drifting(Vec2::ZERO, 0.98, 0.0);
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..10 {
        integrate(&mut p, &law, 0.016, &mut rng);
    }
    assert_eq!(p.active_count(), 0);
    assert_eq!(p.get(0), Some(&Particle::default()));
}

#[test]
fn age_is_monotonic_until_expiry() {
    let mut p = pool(1, FullPolicy::DropOnFull);
    p.spawn(particle(0.0));
    let law = ParticleLaw::drifting(Vec2::new(0.0, 0.02), 0.98, 0.05);
    let mut rng = StdRng::seed_from_u64(7);
    let mut last = 0.0;
    while p.active_count() == 1 {
        integrate(&mut p, &law, 0.05, &mut rng);
        if let Some(s) = p.iter_active().next() {
            assert!(s.age >= last, "age went backwards: {} -> {}", last, s.age);
            assert!(s.age.is_finite());
            last = s.age;
        }
    }
    assert!(last > 0.9);
}

#[test]
fn flash_channel_can_expire_before_lifespan() {
    let mut p = pool(1, FullPolicy::DropOnFull);
    p.spawn(Particle::spawn(Vec2::ZERO, Vec2::ZERO, 0.1, 100.0, 0.0));
    let law = ParticleLaw::drifting(Vec2::ZERO, 1.0, 0.0)
        .with_flash(FlashDecay::Linear { per_sec: 2.0 });
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..12 {
        integrate(&mut p, &law, 0.05, &mut rng);
    }
    assert_eq!(p.active_count(), 0, "intensity timer should end the instance");
}

#[test]
fn power_flash_decays_toward_zero() {
    let mut p = pool(1, FullPolicy::DropOnFull);
    p.spawn(Particle::spawn(Vec2::ZERO, Vec2::ZERO, 0.1, 100.0, 0.0).with_intensity(0.8));
    let law = ParticleLaw::drifting(Vec2::ZERO, 1.0, 0.0).with_flash(FlashDecay::Power {
        per_sec: 1.0,
        exponent: 2.0,
    });
    let mut rng = StdRng::seed_from_u64(3);
    integrate(&mut p, &law, 0.05, &mut rng);
    let after_one = p.get(0).map(|s| s.intensity).unwrap_or(0.0);
    let expected = 0.8 * (1.0f32 - 0.05).powi(2);
    assert!((after_one - expected).abs() < 1e-5);
    for _ in 0..40 {
        integrate(&mut p, &law, 0.05, &mut rng);
    }
    assert_eq!(p.active_count(), 0);
}

#[test]
fn wave_expires_on_strength_or_radius() {
    let law = WaveLaw {
        width_cap: 0.1,
        width_rate: 1.0,
        min_strength: 0.01,
        max_radius: 0.5,
    };
    let mut rng = StdRng::seed_from_u64(0);

    // fast but slowly decaying: radius runs out first
    let mut p: SlotPool<Wave> =
        SlotPool::new("w", PoolConfig::new(1, FullPolicy::DropOnFull)).expect("pool");
    p.spawn(Wave::spawn(Vec2::ZERO, 1.0, 1.0, 0.01, 0.0));
    for _ in 0..11 {
        integrate(&mut p, &law, 0.05, &mut rng);
    }
    assert_eq!(p.active_count(), 0);

    // slow but strongly decaying: strength runs out first
    p.spawn(Wave::spawn(Vec2::ZERO, 0.01, 1.0, 20.0, 0.0));
    for _ in 0..6 {
        integrate(&mut p, &law, 0.05, &mut rng);
    }
    assert_eq!(p.active_count(), 0);
}

#[test]
fn wave_width_approaches_cap_without_overshoot() {
    let law = WaveLaw {
        width_cap: 0.1,
        width_rate: 3.0,
        min_strength: 0.0,
        max_radius: 100.0,
    };
    let mut rng = StdRng::seed_from_u64(0);
    let mut p: SlotPool<Wave> =
        SlotPool::new("w", PoolConfig::new(1, FullPolicy::DropOnFull)).expect("pool");
    p.spawn(Wave::spawn(Vec2::ZERO, 0.1, 1.0, 0.1, 0.0));
    let mut last = 0.0;
    for _ in 0..200 {
        integrate(&mut p, &law, 0.05, &mut rng);
        let w = p.get(0).map(|w| w.width).unwrap_or(0.0);
        assert!(w >= last && w <= 0.1 + 1e-6);
        last = w;
    }
    assert!(last > 0.099);
}

#[test]
fn zero_dt_is_a_no_op() {
    let mut p = pool(2, FullPolicy::DropOnFull);
    p.spawn(Particle::spawn(Vec2::ZERO, Vec2::ONE, 0.1, 1.0, 0.0));
    let before = p.slots().to_vec();
    let law = ParticleLaw::drifting(Vec2::new(0.0, 1.0), 0.9, 1.0);
    let mut rng = StdRng::seed_from_u64(0);
    integrate(&mut p, &law, clamp_delta_sec(0.0), &mut rng);
    assert_eq!(p.slots(), &before[..]);
}

#[test]
fn marshal_is_fixed_length_and_zero_for_inactive() {
    let mut p = pool(5, FullPolicy::DropOnFull);
    p.spawn(particle(0.0));
    p.spawn(particle(1.0));
    let project = |s: &Particle| [s.pos.x, s.pos.y, s.size, s.age];
    let records = marshal(&p, project);
    assert_eq!(records.len(), 5);
    assert_eq!(records[0][2], 0.1);
    for r in &records[2..] {
        assert_eq!(*r, ZERO_RECORD);
    }
    assert_eq!(marshal(&p, project), records, "marshal must be idempotent");
}

#[test]
fn marshal_into_reuses_buffer() {
    let mut p = pool(3, FullPolicy::DropOnFull);
    p.spawn(particle(0.0));
    let mut buf = vec![[9.0; 4]; 10];
    marshal_into(&p, |s| [s.size, 0.0, 0.0, 0.0], &mut buf);
    assert_eq!(buf.len(), 3);
    assert_eq!(buf[0][0], 0.1);
    assert_eq!(buf[1], ZERO_RECORD);
}
