pub mod clock;
pub mod engine;
pub mod faction;
pub mod field;
pub mod geometry;
pub mod observer;
pub mod person;
pub mod policy;
pub mod rng;
pub mod scenario;
pub mod weather;

pub use engine::{Simulator, SimulatorBuilder, SimulatorSettings, StepSummary};
pub use scenario::{Scenario, ScenarioLoader};
