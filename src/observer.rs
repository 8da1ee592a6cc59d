//! Sinks fed by the simulator after every step
//!
//! Viewers receive a full [`StepFrame`]; soundtracks only receive the
//! [`Track`] for the dominant empire. Both are fallible, but the simulator
//! logs and drops their errors so a broken sink never touches the field.

use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::faction::Faction;
use crate::field::{FieldStats, FieldView};
use crate::weather::Weather;

/// What the soundtrack should play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Track {
    /// Theme of the empire with the most live members.
    Empire(Faction),
    /// Fewer than two empires are left.
    Win,
}

impl Track {
    pub fn from_stats(stats: &FieldStats, viable: bool) -> Self {
        if !viable {
            return Track::Win;
        }
        stats.dominant_empire().map_or(Track::Win, Track::Empire)
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Track::Empire(faction) => write!(f, "{faction}"),
            Track::Win => f.write_str("Win"),
        }
    }
}

/// Read-only snapshot of one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepFrame {
    pub step: u64,
    pub clock: Clock,
    pub weather: Weather,
    pub stats: FieldStats,
    pub track: Track,
    pub view: FieldView,
}

pub trait Viewer {
    fn name(&self) -> &str;
    fn show(&mut self, frame: &StepFrame) -> Result<()>;
}

pub trait Soundtrack {
    fn name(&self) -> &str;
    fn play(&mut self, track: Track) -> Result<()>;
}

/// Writes the census of every `interval`-th frame to the log.
pub struct LogViewer {
    interval: u64,
}

impl LogViewer {
    pub fn new() -> Self {
        Self { interval: 1 }
    }

    pub fn every(interval: u64) -> Self {
        Self {
            interval: interval.max(1),
        }
    }
}

impl Default for LogViewer {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewer for LogViewer {
    fn name(&self) -> &str {
        "log"
    }

    fn show(&mut self, frame: &StepFrame) -> Result<()> {
        if frame.step % self.interval == 0 {
            tracing::info!(
                step = frame.step,
                clock = %frame.clock,
                weather = %frame.weather,
                "{}",
                frame.stats
            );
        }
        Ok(())
    }
}

/// Soundtrack that only switches when a different track is requested,
/// keeping every switch in order.
#[derive(Debug, Default)]
pub struct TrackLog {
    playing: Option<Track>,
    history: Vec<Track>,
}

impl TrackLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn playing(&self) -> Option<Track> {
        self.playing
    }

    pub fn history(&self) -> &[Track] {
        &self.history
    }
}

impl Soundtrack for TrackLog {
    fn name(&self) -> &str {
        "track-log"
    }

    fn play(&mut self, track: Track) -> Result<()> {
        if self.playing == Some(track) {
            return Ok(());
        }
        tracing::info!(%track, "soundtrack changed");
        self.playing = Some(track);
        self.history.push(track);
        Ok(())
    }
}
