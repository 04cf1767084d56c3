use thiserror::Error;

/// Configuration errors raised while building pools and layers.
///
/// Runtime paths (spawning, integrating, marshalling) never fail; they degrade
/// by dropping, evicting or clamping instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VizError {
    #[error("unknown layer `{0}` (expected one of: bubbles, waves, plasma, trees, solar, water)")]
    UnknownLayer(String),
    #[error("pool `{0}` must have a non-zero capacity")]
    ZeroCapacity(&'static str),
    #[error("pool `{label}` capacity {capacity} exceeds the limit of {max}")]
    CapacityTooLarge {
        label: &'static str,
        capacity: usize,
        max: usize,
    },
}
