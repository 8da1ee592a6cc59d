use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{bail, Result};
use imperium::{
    engine::{Simulator, SimulatorBuilder, SimulatorSettings},
    observer::{LogViewer, StepFrame, TrackLog, Viewer},
};

#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Vec<u64>>>);

impl Viewer for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn show(&mut self, frame: &StepFrame) -> Result<()> {
        self.0.borrow_mut().push(frame.step);
        Ok(())
    }
}

#[derive(Clone, Default)]
struct FrameLog(Rc<RefCell<Vec<StepFrame>>>);

impl Viewer for FrameLog {
    fn name(&self) -> &str {
        "frame-log"
    }

    fn show(&mut self, frame: &StepFrame) -> Result<()> {
        self.0.borrow_mut().push(frame.clone());
        Ok(())
    }
}

struct Broken;

impl Viewer for Broken {
    fn name(&self) -> &str {
        "broken"
    }

    fn show(&mut self, _frame: &StepFrame) -> Result<()> {
        bail!("display went away")
    }
}

#[test]
fn simulator_runs_hook_each_step() {
    let mut simulator = Simulator::new(30, 30, 4);
    let mut steps = Vec::new();
    let taken = simulator.run_with_hook(6, |frame| steps.push(frame.step));

    assert_eq!(taken, 6);
    assert_eq!(steps, vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn hook_and_viewers_share_each_frame() {
    let log = FrameLog::default();
    let mut simulator = SimulatorBuilder::new(SimulatorSettings::new(30, 30, 4))
        .with_viewer(log.clone())
        .build();
    let mut hooked = Vec::new();
    simulator.run_with_hook(5, |frame| hooked.push(frame.clone()));

    let shown = log.0.borrow();
    assert_eq!(shown.len(), hooked.len() + 1);
    assert_eq!(&shown[1..], hooked.as_slice());
}

#[test]
fn run_without_sinks_matches_a_hooked_run() {
    let mut plain = Simulator::new(30, 30, 4);
    let mut hooked = Simulator::new(30, 30, 4);
    let mut last = None;

    let taken = plain.run(8);
    assert_eq!(hooked.run_with_hook(8, |frame| last = Some(frame.clone())), taken);
    assert_eq!(plain.step_count(), taken);
    assert_eq!(last.map(|frame| frame.view), Some(plain.frame().view));
}

#[test]
fn viewers_see_reset_and_every_step() {
    let recorder = Recorder::default();
    let mut simulator = SimulatorBuilder::new(SimulatorSettings::new(30, 30, 5))
        .with_viewer(recorder.clone())
        .build();
    simulator.run(3);
    simulator.reset();

    assert_eq!(recorder.0.borrow().as_slice(), &[0, 1, 2, 3, 0]);
}

#[test]
fn failing_viewer_does_not_affect_the_field() {
    let settings = SimulatorSettings::new(30, 30, 6);
    let mut plain = Simulator::new(30, 30, 6);
    let mut noisy = SimulatorBuilder::new(settings)
        .with_viewer(Broken)
        .with_viewer(LogViewer::every(2))
        .with_soundtrack(TrackLog::new())
        .build();

    plain.run(10);
    noisy.run(10);

    assert_eq!(plain.frame(), noisy.frame());
}

#[test]
fn frame_serializes_to_json() {
    let mut simulator = Simulator::new(10, 12, 8);
    simulator.step();
    let frame = simulator.frame();

    let json = serde_json::to_value(&frame).expect("frame serializes");
    assert_eq!(json["step"], 1);
    assert_eq!(json["view"]["depth"], 10);
    assert_eq!(json["view"]["width"], 12);
    assert!(json["weather"].is_string());
    assert_eq!(
        json["view"]["occupants"].as_array().map(Vec::len),
        Some(frame.stats.total())
    );
}

#[test]
fn run_long_stops_within_budget() {
    let mut simulator = Simulator::new(12, 12, 21);
    let taken = simulator.run_long();
    assert!(taken <= 2000);
    assert_eq!(simulator.step_count(), taken);
}
