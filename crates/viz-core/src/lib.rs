pub mod constants;
pub mod error;
pub mod features;
pub mod hold;
pub mod integrate;
pub mod layers;
pub mod marshal;
pub mod note;
pub mod particle;
pub mod pool;
pub mod spawn;
pub mod stack;
pub mod state;
pub mod uniforms;
pub mod wave;

pub static FIELD_WGSL: &str = include_str!("../shaders/field.wgsl");

pub use error::VizError;
pub use features::{FeatureExtractor, SolarParams};
pub use hold::{HoldConfig, HoldPhase, HoldTracker, WaveSpawn};
pub use integrate::{clamp_delta_sec, integrate, DecayLaw};
pub use layers::*;
pub use marshal::{marshal, marshal_into, Record, ZERO_RECORD};
pub use note::{NoteEvent, NoteInput};
pub use particle::{FlashDecay, Particle, ParticleLaw};
pub use pool::{FullPolicy, Instance, PoolConfig, SlotPool};
pub use stack::LayerStack;
pub use state::{GlowEnvelope, Viewport};
pub use uniforms::{pack_frame, FieldUniforms, MAX_RECORDS};
pub use wave::{Wave, WaveLaw};
