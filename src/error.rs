use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Setup and configuration failures. Nothing on the per-tick path returns one.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid field bounds {width}x{height}: width and height must be positive")]
    InvalidBounds { width: f32, height: f32 },

    #[error("invalid proximity threshold {0}: must be positive")]
    InvalidThreshold(f32),

    #[error("invalid tick rate {0}: must give a positive, representable tick interval")]
    InvalidTickRate(f32),

    #[error("invalid rotation step {0}: must be finite")]
    InvalidRotationStep(f32),

    #[error("invalid segment length range [{min}, {max}]")]
    InvalidLengthRange { min: f32, max: f32 },

    #[error("invalid max speed {0}: must be between 0 and f32::MAX / 4")]
    InvalidSpeed(f32),

    #[error("malformed parameters: {0}")]
    Parse(#[from] serde_json::Error),
}
