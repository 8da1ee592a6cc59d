use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::SimulatorSettings;
use crate::faction::Faction;
use crate::field::{DEFAULT_DEPTH, DEFAULT_WIDTH};

pub const DEFAULT_SEED: u64 = 1111;
pub const DEFAULT_MAX_STEPS: u64 = 2000;

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_depth() -> usize {
    DEFAULT_DEPTH
}

fn default_width() -> usize {
    DEFAULT_WIDTH
}

fn default_max_steps() -> u64 {
    DEFAULT_MAX_STEPS
}

fn default_step_delay_ms() -> u64 {
    50
}

fn default_weather_change_interval() -> u64 {
    15
}

fn default_snow_stall_probability() -> f64 {
    0.5
}

fn default_repopulation_probability() -> f64 {
    0.01
}

fn default_british() -> f64 {
    0.01
}

fn default_roman() -> f64 {
    0.01
}

fn default_persian() -> f64 {
    0.04
}

fn default_spanish() -> f64 {
    0.01
}

fn default_civilian() -> f64 {
    0.10
}

fn default_amazonian() -> f64 {
    0.03
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScenarioError {
    #[error("{field} must lie in [0, 1], got {value}")]
    Probability { field: &'static str, value: f64 },
    #[error("weather_change_interval must be at least 1")]
    ZeroWeatherInterval,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_depth")]
    pub depth: usize,
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_max_steps")]
    pub max_steps: u64,
    #[serde(default = "default_step_delay_ms")]
    pub step_delay_ms: u64,
    #[serde(default)]
    pub densities: Densities,
    #[serde(default = "default_weather_change_interval")]
    pub weather_change_interval: u64,
    #[serde(default = "default_snow_stall_probability")]
    pub snow_stall_probability: f64,
    #[serde(default = "default_repopulation_probability")]
    pub repopulation_probability: f64,
}

/// Per-cell creation probabilities for the initial population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Densities {
    #[serde(default = "default_british")]
    pub british: f64,
    #[serde(default = "default_roman")]
    pub roman: f64,
    #[serde(default = "default_persian")]
    pub persian: f64,
    #[serde(default = "default_spanish")]
    pub spanish: f64,
    #[serde(default = "default_civilian")]
    pub civilian: f64,
    #[serde(default = "default_amazonian")]
    pub amazonian: f64,
}

impl Default for Densities {
    fn default() -> Self {
        Self {
            british: default_british(),
            roman: default_roman(),
            persian: default_persian(),
            spanish: default_spanish(),
            civilian: default_civilian(),
            amazonian: default_amazonian(),
        }
    }
}

impl Densities {
    /// Nobody is created; fields are filled by hand.
    pub fn none() -> Self {
        Self {
            british: 0.0,
            roman: 0.0,
            persian: 0.0,
            spanish: 0.0,
            civilian: 0.0,
            amazonian: 0.0,
        }
    }

    /// The order in which each cell tries the factions; the first hit wins.
    pub fn draw_order(&self) -> [(Faction, f64); 6] {
        [
            (Faction::British, self.british),
            (Faction::Roman, self.roman),
            (Faction::Persian, self.persian),
            (Faction::Spanish, self.spanish),
            (Faction::Civilian, self.civilian),
            (Faction::Amazonian, self.amazonian),
        ]
    }

    fn validate(&self) -> Result<(), ScenarioError> {
        let named = [
            ("densities.british", self.british),
            ("densities.roman", self.roman),
            ("densities.persian", self.persian),
            ("densities.spanish", self.spanish),
            ("densities.civilian", self.civilian),
            ("densities.amazonian", self.amazonian),
        ];
        for (field, value) in named {
            check_probability(field, value)?;
        }
        Ok(())
    }
}

fn check_probability(field: &'static str, value: f64) -> Result<(), ScenarioError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ScenarioError::Probability { field, value })
    }
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        scenario
            .validate()
            .with_context(|| format!("Invalid scenario {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.weather_change_interval == 0 {
            return Err(ScenarioError::ZeroWeatherInterval);
        }
        check_probability("snow_stall_probability", self.snow_stall_probability)?;
        check_probability("repopulation_probability", self.repopulation_probability)?;
        self.densities.validate()
    }

    pub fn settings(&self) -> SimulatorSettings {
        SimulatorSettings {
            depth: self.depth,
            width: self.width,
            seed: self.seed,
            densities: self.densities,
            weather_change_interval: self.weather_change_interval,
            snow_stall_probability: self.snow_stall_probability,
            repopulation_probability: self.repopulation_probability,
        }
    }

    pub fn max_steps(&self, override_steps: Option<u64>) -> u64 {
        override_steps.unwrap_or(self.max_steps)
    }
}
