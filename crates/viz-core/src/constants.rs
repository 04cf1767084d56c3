// Shared tuning constants for pools, integration and the individual layers.

// Frame clock
pub const MAX_FRAME_DT_MS: f64 = 50.0; // larger deltas are truncated before integration
pub const REFERENCE_FPS: f32 = 60.0; // per-frame friction factors are expressed at this rate

// Pools
pub const MAX_POOL_CAPACITY: usize = 256; // sanity bound checked by PoolConfig::validate
pub const MIN_LIFE_SEC: f32 = 0.05; // guards inverse-life against tiny lifespans

// Note derivations
pub const HUE_STEP_DEG: f32 = 30.0; // one pitch class = 30 degrees on the color wheel
pub const HELD_MS_PER_VELOCITY: f64 = 25.0; // note-off boost: +1 velocity per 25 ms held
pub const TINT_SATURATION: f32 = 0.75;
pub const TINT_LIGHTNESS_BASE: f32 = 0.45;
pub const TINT_LIGHTNESS_SPAN: f32 = 0.2; // scaled by velocity

// Shared lifespan range for particle bursts (seconds)
pub const BURST_LIFE_MIN_SEC: f32 = 2.5;
pub const BURST_LIFE_SPAN_SEC: f32 = 3.0;

// Ambient glow envelope (rise/fall time constants, seconds)
pub const GLOW_RISE_TAU_SEC: f32 = 0.10;
pub const GLOW_FALL_TAU_SEC: f32 = 0.45;
pub const GLOW_ENERGY_DECAY_PER_SEC: f32 = 1.6;
pub const GLOW_ENERGY_MAX: f32 = 1.5;

// Bubbles
pub const BUBBLE_CAPACITY: usize = 100;
pub const BUBBLE_RADIUS_BASE: f32 = 0.03;
pub const BUBBLE_RADIUS_SPAN: f32 = 0.12; // scaled by velocity
pub const BUBBLE_RISE_BASE: f32 = 0.06; // initial upward speed (uv units per second)
pub const BUBBLE_RISE_SPAN: f32 = 0.08;
pub const BUBBLE_BUOYANCY: f32 = 0.02;
pub const BUBBLE_FRICTION: f32 = 0.98;
pub const BUBBLE_JITTER: f32 = 0.05;

// Plasma
pub const PLASMA_CAPACITY: usize = 48;
pub const PLASMA_BURST_K: f32 = 2.0; // 1..3 seeds per note-on
pub const PLASMA_SIZE_BASE: f32 = 0.08;
pub const PLASMA_SIZE_SPAN: f32 = 0.10;
pub const PLASMA_FRICTION: f32 = 0.97;
pub const PLASMA_JITTER: f32 = 0.10;

// Waves
pub const WAVES_CAPACITY: usize = 20;
pub const WAVES_RELEASE_BURST_K: f32 = 2.0;
pub const WAVES_WIDTH_CAP: f32 = 0.08;
pub const WAVES_MAX_RADIUS: f32 = 1.6;

// Water
pub const RIPPLE_CAPACITY: usize = 30;
pub const RIPPLE_RELEASE_BURST_K: f32 = 3.0;
pub const RIPPLE_WIDTH_CAP: f32 = 0.06;
pub const RIPPLE_MAX_RADIUS: f32 = 1.2;

// Trees
pub const TREE_CAPACITY: usize = 24;
pub const LEAF_CAPACITY: usize = 80;
pub const LEAF_BURST_K: f32 = 3.0; // 1..4 leaves per release

// Solar
pub const SOLAR_WAVE_CAPACITY: usize = 24;
pub const SOLAR_FLARE_CAPACITY: usize = 32;
pub const SOLAR_EMBER_CAPACITY: usize = 60;
pub const SOLAR_WAVE_STRENGTH_MAX: f32 = 1.2;
pub const SOLAR_WAVE_MAX_RADIUS: f32 = 1.5;
pub const SOLAR_EMBERS_PER_SEC: f32 = 18.0; // at full energy
pub const SOLAR_FLARE_BURST_K: f32 = 2.0;

// Feature extractor
pub const EMA_ENERGY_ALPHA: f32 = 0.35;
pub const EMA_PITCH_ALPHA: f32 = 0.25;
pub const RATE_BOOST_REF_MS: f64 = 300.0; // inter-note interval that yields a boost of 1
pub const RATE_BOOST_MAX: f32 = 2.0;
pub const ENERGY_MAX: f32 = 3.0; // velocity01 * (1 + RATE_BOOST_MAX)
pub const ENERGY_DECAY_PER_SEC: f32 = 0.6;
pub const DEFAULT_PITCH: f32 = 60.0; // middle C until the first note arrives

// Hold tracker
pub const HOLD_BASE_INTERVAL_MS: f64 = 450.0;
pub const HOLD_MIN_INTERVAL_FRACTION: f64 = 0.4;
pub const HOLD_RAMP_MS: f64 = 3000.0; // hold duration at which the interval bottoms out
pub const HOLD_RELEASE_FULL_MS: f64 = 2500.0; // hold duration for a full release boost
