use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::field::{Spawn, ROTATION_STEP};

/// Environment variable naming an alternative parameters file.
pub const PARAMETERS_ENV: &str = "CONSTELLATION_PARAMETERS";
pub const DEFAULT_PARAMETERS_PATH: &str = "parameters.json";

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Parameters {
    pub particle_count: usize,
    pub threshold: f32,
    pub rotation_step: f32,
    pub ticks_per_second: f32,
    pub max_speed: f32,
    pub min_length: f32,
    pub max_length: f32,
    /// Stroke color shared by edges and segments, as linear RGB in `[0, 1]`.
    pub color: [f32; 3],
}

impl Default for Parameters {
    fn default() -> Self {
        let spawn = Spawn::default();
        Parameters {
            particle_count: 150,
            threshold: 100.0,
            rotation_step: ROTATION_STEP,
            ticks_per_second: 30.0,
            max_speed: spawn.max_speed,
            min_length: spawn.min_length,
            max_length: spawn.max_length,
            color: [0.18, 0.62, 0.34],
        }
    }
}

impl Parameters {
    pub fn from_json(text: &str) -> Result<Self> {
        let parameters: Parameters = serde_json::from_str(text)?;
        Ok(parameters)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.threshold.is_finite() && self.threshold > 0.0) {
            return Err(Error::InvalidThreshold(self.threshold));
        }
        if interval(self.ticks_per_second).is_none() {
            return Err(Error::InvalidTickRate(self.ticks_per_second));
        }
        if !self.rotation_step.is_finite() {
            return Err(Error::InvalidRotationStep(self.rotation_step));
        }
        self.spawn().validate()
    }

    pub fn spawn(&self) -> Spawn {
        Spawn {
            max_speed: self.max_speed,
            min_length: self.min_length,
            max_length: self.max_length,
        }
    }

    /// Time between ticks. Rates `validate` rejects fall back to the default rate.
    pub fn tick_interval(&self) -> Duration {
        interval(self.ticks_per_second)
            .or_else(|| interval(Parameters::default().ticks_per_second))
            .unwrap_or_default()
    }
}

/// A usable, non-zero tick interval for `ticks_per_second`, if there is one.
fn interval(ticks_per_second: f32) -> Option<Duration> {
    if !(ticks_per_second.is_finite() && ticks_per_second > 0.0) {
        return None;
    }
    Duration::try_from_secs_f32(1.0 / ticks_per_second)
        .ok()
        .filter(|interval| !interval.is_zero())
}

/// Reads the parameters file, falling back to defaults when it is missing or malformed.
/// Validation is left to the caller so a bad value surfaces as a configuration error
/// instead of being silently replaced.
pub async fn load(path: impl AsRef<Path>) -> Parameters {
    let path = path.as_ref();
    match tokio::fs::read_to_string(path).await {
        Ok(text) => match Parameters::from_json(&text) {
            Ok(parameters) => {
                info!(path = %path.display(), "loaded parameters");
                parameters
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "using default parameters");
                Parameters::default()
            }
        },
        Err(err) => {
            warn!(path = %path.display(), %err, "using default parameters");
            Parameters::default()
        }
    }
}

pub fn path_from_env() -> String {
    std::env::var(PARAMETERS_ENV).unwrap_or_else(|_| DEFAULT_PARAMETERS_PATH.to_string())
}
