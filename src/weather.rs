//! Weather shared by the whole field
//!
//! Rain doubles British activity, sun widens the Spanish hunting radius and
//! snow freezes roughly half of the population in place each step.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Weather {
    Sunny,
    Rainy,
    Foggy,
    Snowy,
    Moderate,
}

impl Weather {
    pub const ALL: [Weather; 5] = [
        Weather::Sunny,
        Weather::Rainy,
        Weather::Foggy,
        Weather::Snowy,
        Weather::Moderate,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Sunny => "SUNNY",
            Self::Rainy => "RAINY",
            Self::Foggy => "FOGGY",
            Self::Snowy => "SNOWY",
            Self::Moderate => "MODERATE",
        }
    }
}

impl Default for Weather {
    fn default() -> Self {
        Self::Moderate
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Current condition plus the periodic random transition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherModel {
    current: Weather,
}

impl WeatherModel {
    pub fn new(current: Weather) -> Self {
        Self { current }
    }

    pub fn current(&self) -> Weather {
        self.current
    }

    pub fn set(&mut self, weather: Weather) {
        self.current = weather;
    }

    /// Pick a condition uniformly; the current one may be drawn again.
    pub fn change<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Weather {
        self.current = Weather::ALL[rng.gen_range(0..Weather::ALL.len())];
        self.current
    }
}
