use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{NetworkError, Result};
use crate::inference::Penalty;

/// Structure the hill climb starts from.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum InitialStructure {
    /// No edges at all.
    #[default]
    Empty,
    /// The parents declared in the input file.
    Declared,
    /// Maximum mutual-information spanning tree.
    SpanningTree,
}

/// Tuning knobs for the structure search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub penalty: Penalty,
    /// Upper bound on rounds across all climbs; `None` means unbounded.
    pub max_rounds: Option<usize>,
    /// Wall-clock budget in seconds; `None` means unbounded.
    pub time_limit_secs: Option<f64>,
    /// Candidates giving any variable more parents than this are discarded.
    pub max_parents: Option<usize>,
    pub initial: InitialStructure,
    /// Extra climbs started from a perturbed copy of the best network.
    pub restarts: usize,
    /// Random moves applied to build each restart's starting point.
    pub perturbation_moves: usize,
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            penalty: Penalty::default(),
            max_rounds: Some(1000),
            time_limit_secs: None,
            max_parents: None,
            initial: InitialStructure::Empty,
            restarts: 0,
            perturbation_moves: 3,
            seed: 0,
        }
    }
}

impl SearchConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| NetworkError::io(path, e))?;
        let config: SearchConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(secs) = self.time_limit_secs {
            if secs.is_nan() || secs <= 0.0 || Duration::try_from_secs_f64(secs).is_err() {
                return Err(NetworkError::InvalidConfig(format!(
                    "time_limit_secs must be a positive, representable number of seconds, got {}",
                    secs
                )));
            }
        }
        if let Penalty::Constant { per_row } = self.penalty {
            if per_row.is_nan() || per_row < 0.0 {
                return Err(NetworkError::InvalidConfig(format!(
                    "penalty per_row must be non-negative, got {}",
                    per_row
                )));
            }
        }
        Ok(())
    }

    /// Wall-clock budget; values `validate` would reject count as no limit.
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}
