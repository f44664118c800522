use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::grid::check_parameters;

/// Settings for one run of the hunt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // missing fields fall back to the defaults below
pub struct HuntConfig {
    pub width: i32,
    pub height: i32,
    /// share of the cells that are turned into walls, in [0, 1)
    pub wall_density: f64,
    pub move_delay_ms: u64,
    /// frames per second of the driver loop
    pub tick_rate: u32,
    /// fixed seed for the maze, a random one is used when absent
    pub seed: Option<u64>,
    /// how many mazes may be generated before giving up on finding a solvable one
    pub max_attempts: u32,
    /// how long the final state stays on screen
    pub hold_ms: u64,
}

impl Default for HuntConfig {
    fn default() -> Self {
        Self {
            width: 15,
            height: 15,
            wall_density: 0.2,
            move_delay_ms: 500,
            tick_rate: 60,
            seed: None,
            max_attempts: 100,
            hold_ms: 1000,
        }
    }
}

impl HuntConfig {
    pub fn load(path: &Path) -> Result<Self, anyhow::Error> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("loading config {}", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self, anyhow::Error> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        check_parameters(self.width, self.height, self.wall_density)?;

        if self.tick_rate == 0 {
            bail!("tick rate must be at least 1");
        }
        if self.max_attempts == 0 {
            bail!("at least one maze generation attempt is needed");
        }

        Ok(())
    }

    pub fn move_delay(&self) -> Duration {
        Duration::from_millis(self.move_delay_ms)
    }

    pub fn frame_time(&self) -> Duration {
        Duration::from_secs(1) / self.tick_rate.max(1)
    }

    pub fn hold(&self) -> Duration {
        Duration::from_millis(self.hold_ms)
    }
}
