use std::fs;
use std::path::PathBuf;

use imperium::{
    engine::SimulatorBuilder,
    scenario::{Densities, ScenarioError, ScenarioLoader},
};
use tempfile::tempdir;

fn scenario_loader() -> ScenarioLoader {
    ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"))
}

fn scenario_path() -> PathBuf {
    PathBuf::from("scenarios/classic.yaml")
}

#[test]
fn scenario_loader_reads_fixture() {
    let scenario = scenario_loader()
        .load(scenario_path())
        .expect("scenario parses");
    assert_eq!(scenario.name, "classic");
    assert_eq!(scenario.seed, 1111);
    assert_eq!((scenario.depth, scenario.width), (80, 120));
    assert_eq!(scenario.max_steps, 2000);
    assert_eq!(scenario.densities, Densities::default());
}

#[test]
fn skirmish_fixture_builds_a_viable_field() {
    let scenario = scenario_loader()
        .load("scenarios/skirmish.yaml")
        .expect("scenario parses");
    assert_eq!(scenario.densities.persian, 0.04);

    let simulator = SimulatorBuilder::new(scenario.settings()).build();
    assert_eq!(simulator.field().depth(), 24);
    assert_eq!(simulator.field().width(), 32);
    assert!(simulator.viable());
}

#[test]
fn loader_resolves_relative_to_base_dir() {
    let temp = tempdir().expect("tempdir");
    fs::write(
        temp.path().join("tiny.yaml"),
        "name: tiny\nseed: 5\ndepth: 6\nwidth: 7\nmax_steps: 12\n",
    )
    .expect("write scenario");

    let scenario = ScenarioLoader::new(temp.path())
        .load("tiny.yaml")
        .expect("scenario parses");
    assert_eq!(scenario.name, "tiny");
    assert_eq!(scenario.max_steps(None), 12);

    let simulator = SimulatorBuilder::new(scenario.settings()).build();
    assert_eq!(simulator.settings().seed, 5);
    assert_eq!(simulator.field().depth(), 6);
}

#[test]
fn missing_file_reports_path() {
    let temp = tempdir().expect("tempdir");
    let err = ScenarioLoader::new(temp.path())
        .load("absent.yaml")
        .expect_err("missing file fails");
    assert!(err.to_string().contains("absent.yaml"));
}

#[test]
fn invalid_probability_is_rejected() {
    let temp = tempdir().expect("tempdir");
    fs::write(
        temp.path().join("bad.yaml"),
        "name: bad\nsnow_stall_probability: 2.0\n",
    )
    .expect("write scenario");

    let err = ScenarioLoader::new(temp.path())
        .load("bad.yaml")
        .expect_err("validation fails");
    assert_eq!(
        err.downcast_ref::<ScenarioError>(),
        Some(&ScenarioError::Probability {
            field: "snow_stall_probability",
            value: 2.0
        })
    );
}

#[test]
fn malformed_yaml_is_an_error() {
    let temp = tempdir().expect("tempdir");
    fs::write(temp.path().join("broken.yaml"), "seed: [not, a, number\n").expect("write");
    assert!(ScenarioLoader::new(temp.path()).load("broken.yaml").is_err());
}
