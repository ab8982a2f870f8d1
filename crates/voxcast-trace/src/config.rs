use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::Path;

use crate::TraceError;

/// Iteration and batching limits for one traversal.
///
/// Total per-ray work is bounded by `max_outer_rounds * max_inner_steps`
/// Stepper calls; `max_chunk_size` bounds how many rays one launch touches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraceConfig {
    #[serde(default = "default_max_outer_rounds")]
    pub max_outer_rounds: u32,
    #[serde(default = "default_max_inner_steps")]
    pub max_inner_steps: u32,
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,
    // Smallest run of rays handed to one rayon task
    #[serde(default = "default_min_rays_per_task")]
    pub min_rays_per_task: usize,
    // Worker threads for the trace pool; rayon picks when absent
    #[serde(default)]
    pub threads: Option<usize>,
}

fn default_max_outer_rounds() -> u32 {
    20
}
fn default_max_inner_steps() -> u32 {
    128
}
fn default_max_chunk_size() -> usize {
    100_000
}
fn default_min_rays_per_task() -> usize {
    1024
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            max_outer_rounds: default_max_outer_rounds(),
            max_inner_steps: default_max_inner_steps(),
            max_chunk_size: default_max_chunk_size(),
            min_rays_per_task: default_min_rays_per_task(),
            threads: None,
        }
    }
}

impl TraceConfig {
    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: TraceConfig = toml::from_str(toml_str)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    pub fn validate(&self) -> Result<(), TraceError> {
        if self.max_outer_rounds == 0 {
            return Err(TraceError::InvalidConfig("max_outer_rounds must be positive"));
        }
        if self.max_inner_steps == 0 {
            return Err(TraceError::InvalidConfig("max_inner_steps must be positive"));
        }
        if self.max_chunk_size == 0 {
            return Err(TraceError::InvalidConfig("max_chunk_size must be positive"));
        }
        if self.min_rays_per_task == 0 {
            return Err(TraceError::InvalidConfig("min_rays_per_task must be positive"));
        }
        if self.threads == Some(0) {
            return Err(TraceError::InvalidConfig("threads must be positive when set"));
        }
        Ok(())
    }

    /// Stepper calls a ray may consume before it is reported unresolved.
    #[inline]
    pub fn step_budget(&self) -> u64 {
        u64::from(self.max_outer_rounds) * u64::from(self.max_inner_steps)
    }
}
