//! The step engine
//!
//! One [`Simulator::step`] turns the current field into the next one: weather
//! may change, every live inhabitant ticks in list order, civilians may be
//! repopulated, the next field is compacted and becomes current, and the sinks
//! are told what happened.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::faction::Faction;
use crate::field::{Field, FieldStats, DEFAULT_DEPTH, DEFAULT_WIDTH};
use crate::geometry::Location;
use crate::observer::{Soundtrack, StepFrame, Track, Viewer};
use crate::person::{Person, PersonId, Population};
use crate::policy::{self, Habitat, TickContext};
use crate::rng::{RngExt, RngManager, BEHAVIOR_STREAM, POPULATION_STREAM, WEATHER_STREAM};
use crate::scenario::{Densities, DEFAULT_SEED};
use crate::weather::{Weather, WeatherModel};

/// Steps run by [`Simulator::run_long`].
pub const LONG_RUN_STEPS: u64 = 2000;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorSettings {
    pub depth: usize,
    pub width: usize,
    pub seed: u64,
    pub densities: Densities,
    /// Weather changes on every step divisible by this.
    pub weather_change_interval: u64,
    pub snow_stall_probability: f64,
    pub repopulation_probability: f64,
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            width: DEFAULT_WIDTH,
            seed: DEFAULT_SEED,
            densities: Densities::default(),
            weather_change_interval: 15,
            snow_stall_probability: 0.5,
            repopulation_probability: 0.01,
        }
    }
}

impl SimulatorSettings {
    pub fn new(depth: usize, width: usize, seed: u64) -> Self {
        Self {
            depth,
            width,
            seed,
            ..Self::default()
        }
    }

    /// Replace zero dimensions with the defaults.
    fn sanitized(mut self) -> Self {
        if self.depth == 0 || self.width == 0 {
            warn!(
                depth = self.depth,
                width = self.width,
                "dimensions must be greater than zero, using {DEFAULT_DEPTH}x{DEFAULT_WIDTH}"
            );
            self.depth = DEFAULT_DEPTH;
            self.width = DEFAULT_WIDTH;
        }
        if self.weather_change_interval == 0 {
            warn!("weather change interval must be at least 1, weather will never change");
            self.weather_change_interval = u64::MAX;
        }
        self
    }
}

pub struct SimulatorBuilder {
    settings: SimulatorSettings,
    viewers: Vec<Box<dyn Viewer>>,
    soundtracks: Vec<Box<dyn Soundtrack>>,
}

impl SimulatorBuilder {
    pub fn new(settings: SimulatorSettings) -> Self {
        Self {
            settings,
            viewers: Vec::new(),
            soundtracks: Vec::new(),
        }
    }

    pub fn with_viewer(mut self, viewer: impl Viewer + 'static) -> Self {
        self.viewers.push(Box::new(viewer));
        self
    }

    pub fn with_soundtrack(mut self, soundtrack: impl Soundtrack + 'static) -> Self {
        self.soundtracks.push(Box::new(soundtrack));
        self
    }

    /// Build and populate the field. Viewers see the initial frame.
    pub fn build(self) -> Simulator {
        let settings = self.settings.sanitized();
        let mut simulator = Simulator {
            rng: RngManager::new(settings.seed),
            population: Population::new(),
            field: Field::new(settings.depth, settings.width),
            step: 0,
            clock: Clock::default(),
            weather: WeatherModel::default(),
            viewers: self.viewers,
            soundtracks: self.soundtracks,
            settings,
        };
        simulator.reset();
        simulator
    }
}

/// What happened during one step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepSummary {
    pub step: u64,
    pub weather_changed: bool,
    /// Civilians created by repopulation.
    pub repopulated: usize,
    pub viable: bool,
    pub stats: FieldStats,
    pub track: Track,
}

pub struct Simulator {
    settings: SimulatorSettings,
    rng: RngManager,
    population: Population,
    field: Field,
    step: u64,
    clock: Clock,
    weather: WeatherModel,
    viewers: Vec<Box<dyn Viewer>>,
    soundtracks: Vec<Box<dyn Soundtrack>>,
}

impl Simulator {
    /// Populated simulator without sinks. Zero dimensions fall back to 80x120.
    pub fn new(depth: usize, width: usize, seed: u64) -> Self {
        SimulatorBuilder::new(SimulatorSettings::new(depth, width, seed)).build()
    }

    pub fn settings(&self) -> &SimulatorSettings {
        &self.settings
    }

    pub fn step_count(&self) -> u64 {
        self.step
    }

    pub fn clock(&self) -> Clock {
        self.clock
    }

    pub fn weather(&self) -> Weather {
        self.weather.current()
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn person(&self, id: PersonId) -> &Person {
        self.population.get(id)
    }

    pub fn person_at(&self, location: Location) -> Option<&Person> {
        self.field.at(&self.population, location)
    }

    /// Live people on the current field, in traversal order.
    pub fn people(&self) -> impl Iterator<Item = &Person> {
        self.field
            .people()
            .iter()
            .map(|&id| self.population.get(id))
            .filter(|person| person.is_alive())
    }

    pub fn stats(&self) -> FieldStats {
        self.field.stats(&self.population)
    }

    pub fn viable(&self) -> bool {
        self.field.viable(&self.population)
    }

    pub fn track(&self) -> Track {
        Track::from_stats(&self.stats(), self.viable())
    }

    pub fn frame(&self) -> StepFrame {
        StepFrame {
            step: self.step,
            clock: self.clock,
            weather: self.weather.current(),
            stats: self.stats(),
            track: self.track(),
            view: self.field.view(&self.population),
        }
    }

    pub fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
    }

    pub fn set_weather(&mut self, weather: Weather) {
        self.weather.set(weather);
    }

    /// Put `person` on the current field at its own location.
    pub fn spawn(&mut self, person: Person) -> Option<PersonId> {
        self.field.spawn(&mut self.population, person)
    }

    /// Empty the field without touching step, clock, weather or rng.
    pub fn clear(&mut self) {
        self.field.clear();
        self.population = Population::new();
    }

    /// Back to step zero with a freshly populated field.
    pub fn reset(&mut self) {
        self.rng.reset();
        self.step = 0;
        self.clock = Clock::default();
        self.weather = WeatherModel::default();
        self.clear();
        self.populate();

        if !self.viewers.is_empty() {
            let frame = self.frame();
            self.show(&frame);
        }
    }

    /// Fill the empty cells of the current field from the configured densities.
    pub fn populate(&mut self) {
        let grid = self.field.grid();
        let draws = self.settings.densities.draw_order();
        let mut rng = self.rng.stream(POPULATION_STREAM);
        for cell in grid.cells() {
            if self.field.occupant(cell).is_some() {
                continue;
            }
            for (faction, density) in draws {
                if rng.chance(density) {
                    let person = Person::seeded(faction, cell, &mut rng);
                    self.field.spawn(&mut self.population, person);
                    break;
                }
            }
        }
        info!(
            seed = self.settings.seed,
            depth = grid.depth(),
            width = grid.width(),
            "populated field: {}",
            self.field.stats(&self.population)
        );
    }

    pub fn step(&mut self) -> StepSummary {
        self.advance(false).0
    }

    /// One step. The frame is built only when `framed` is set or viewers are attached.
    fn advance(&mut self, framed: bool) -> (StepSummary, Option<StepFrame>) {
        self.step += 1;
        let weather_changed = self.step % self.settings.weather_change_interval == 0;
        if weather_changed {
            let weather = self.weather.change(&mut self.rng.stream(WEATHER_STREAM));
            info!(step = self.step, %weather, "weather changed");
        }

        let ctx = TickContext {
            hour: self.clock.hour(),
            weather: self.weather.current(),
        };
        let snow = ctx.weather == Weather::Snowy;
        let stall_above = 1.0 - self.settings.snow_stall_probability;
        let mut next = self.field.empty_like();
        let people = self.field.people().to_vec();

        let repopulated = {
            let mut rng = self.rng.stream(BEHAVIOR_STREAM);
            let mut habitat = Habitat::new(&mut self.population, &self.field, &mut next);
            for id in people {
                if !habitat.population.get(id).is_alive() {
                    continue;
                }
                if snow && rng.uniform() > stall_above {
                    habitat.carry_forward(id);
                    continue;
                }
                policy::tick(&mut habitat, id, &ctx, &mut rng);
            }

            if self.field.has_civilian(&self.population) {
                0
            } else {
                let created = next.repopulate_civilians(
                    &mut self.population,
                    &mut rng,
                    self.settings.repopulation_probability,
                );
                if created > 0 {
                    info!(step = self.step, created, "civilians repopulated");
                }
                created
            }
        };

        let (field, population) = next.compact(&self.population);
        self.field = field;
        self.population = population;

        let stats = self.stats();
        let viable = self.viable();
        let track = Track::from_stats(&stats, viable);
        debug!(
            step = self.step,
            clock = %self.clock,
            weather = %ctx.weather,
            "{stats}"
        );

        let frame = (framed || !self.viewers.is_empty()).then(|| StepFrame {
            step: self.step,
            clock: self.clock,
            weather: ctx.weather,
            stats,
            track,
            view: self.field.view(&self.population),
        });
        if let Some(frame) = &frame {
            self.show(frame);
        }
        self.play(track);
        self.clock.advance();

        let summary = StepSummary {
            step: self.step,
            weather_changed,
            repopulated,
            viable,
            stats,
            track,
        };
        (summary, frame)
    }

    /// Step up to `steps` times, stopping early once fewer than two empires
    /// remain. Returns the number of steps taken.
    pub fn run(&mut self, steps: u64) -> u64 {
        self.drive(steps, None)
    }

    /// Like [`Simulator::run`], calling `hook` with the frame of every step.
    /// Viewers and the hook are handed the same frame.
    pub fn run_with_hook<F>(&mut self, steps: u64, mut hook: F) -> u64
    where
        F: FnMut(&StepFrame),
    {
        self.drive(steps, Some(&mut hook))
    }

    fn drive(&mut self, steps: u64, mut hook: Option<&mut dyn FnMut(&StepFrame)>) -> u64 {
        let mut taken = 0;
        while taken < steps && self.viable() {
            let (_, frame) = self.advance(hook.is_some());
            taken += 1;
            if let (Some(hook), Some(frame)) = (hook.as_mut(), frame.as_ref()) {
                hook(frame);
            }
        }
        if !self.viable() {
            info!(
                step = self.step,
                winner = ?self.stats().dominant_empire().map(Faction::name),
                "fewer than two empires remain"
            );
        }
        taken
    }

    pub fn run_long(&mut self) -> u64 {
        self.run(LONG_RUN_STEPS)
    }

    fn show(&mut self, frame: &StepFrame) {
        for viewer in &mut self.viewers {
            if let Err(err) = viewer.show(frame) {
                warn!(viewer = viewer.name(), error = %err, "viewer failed");
            }
        }
    }

    fn play(&mut self, track: Track) {
        for soundtrack in &mut self.soundtracks {
            if let Err(err) = soundtrack.play(track) {
                warn!(soundtrack = soundtrack.name(), error = %err, "soundtrack failed");
            }
        }
    }
}
