use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use imperium::{
    clock::Clock,
    engine::{Simulator, SimulatorBuilder, SimulatorSettings},
    faction::{Faction, Sex},
    geometry::Location,
    observer::{Soundtrack, Track},
    person::Person,
    scenario::Densities,
    weather::Weather,
};

fn empty_settings(depth: usize, width: usize, seed: u64) -> SimulatorSettings {
    SimulatorSettings {
        densities: Densities::none(),
        repopulation_probability: 0.0,
        ..SimulatorSettings::new(depth, width, seed)
    }
}

fn empty_field(depth: usize, width: usize, seed: u64) -> Simulator {
    SimulatorBuilder::new(empty_settings(depth, width, seed)).build()
}

fn at_hour(simulator: &mut Simulator, hour: u8) {
    simulator.set_clock(Clock::new(hour, 0));
}

fn find(simulator: &Simulator, faction: Faction) -> Vec<Person> {
    simulator
        .people()
        .filter(|person| person.faction() == faction)
        .copied()
        .collect()
}

#[test]
fn lone_amazonian_moves_to_a_neighbour() {
    let mut simulator = empty_field(3, 3, 101);
    simulator.spawn(Person::new(Faction::Amazonian, Sex::Female, Location::new(1, 1)));
    at_hour(&mut simulator, 12);

    simulator.step();

    let amazonians = find(&simulator, Faction::Amazonian);
    assert_eq!(amazonians.len(), 1);
    let amazonian = amazonians[0];
    assert_eq!(amazonian.age(), 1);
    let location = amazonian.location().expect("alive");
    assert_eq!(location.distance(Location::new(1, 1)), 1);
    assert!(simulator.person_at(Location::new(1, 1)).is_none());
    assert!(!simulator.viable());
}

#[test]
fn amazonian_dies_of_old_age() {
    let mut simulator = empty_field(3, 3, 102);
    simulator.spawn(
        Person::new(Faction::Amazonian, Sex::Female, Location::new(1, 1)).with_age(195),
    );
    at_hour(&mut simulator, 12);

    for _ in 0..6 {
        simulator.step();
    }

    // Only daughters born during these steps can remain.
    assert!(simulator.people().all(|person| person.age() < 10));
    assert!(!simulator.viable());
}

#[test]
fn newborn_amazonian_lives_out_its_full_span() {
    let settings = SimulatorSettings {
        weather_change_interval: u64::MAX,
        ..empty_settings(20, 20, 112)
    };
    let mut simulator = SimulatorBuilder::new(settings).build();
    simulator.spawn(Person::new(Faction::Amazonian, Sex::Female, Location::new(10, 10)));

    for _ in 0..200 {
        simulator.step();
    }
    let eldest = simulator.people().map(Person::age).max();
    assert_eq!(eldest, Some(200));

    simulator.step();
    assert!(simulator.people().all(|person| person.age() < 200));
    assert!(!simulator.viable());
}

#[test]
fn british_kills_adjacent_persian() {
    let mut simulator = empty_field(3, 3, 103);
    simulator.spawn(
        Person::new(Faction::British, Sex::Male, Location::new(1, 1)).with_resource_level(5),
    );
    simulator.spawn(Person::new(Faction::Persian, Sex::Female, Location::new(0, 0)));
    at_hour(&mut simulator, 10);
    simulator.set_weather(Weather::Moderate);

    let summary = simulator.step();

    assert_eq!(summary.stats.persian, 0);
    assert_eq!(summary.stats.british, 1);
    let british = simulator
        .person_at(Location::new(0, 0))
        .expect("british moved onto its kill");
    assert_eq!(british.faction(), Faction::British);
    assert_eq!(british.resource_level(), 50);
}

#[test]
fn sunny_spanish_reach_diagonal_neighbours() {
    for weather in [Weather::Sunny, Weather::Moderate] {
        let mut simulator = empty_field(3, 3, 104);
        simulator.spawn(Person::new(Faction::Spanish, Sex::Male, Location::new(1, 1)));
        simulator.spawn(Person::new(Faction::Amazonian, Sex::Female, Location::new(2, 2)));
        at_hour(&mut simulator, 10);
        simulator.set_weather(weather);

        simulator.step();

        assert_eq!(simulator.stats().amazonian, 0, "{weather}");
        assert_eq!(
            simulator.person_at(Location::new(2, 2)).map(Person::faction),
            Some(Faction::Spanish)
        );
    }
}

#[test]
fn sun_widens_the_spanish_hunting_radius() {
    let mut simulator = empty_field(5, 5, 105);
    simulator.spawn(Person::new(Faction::Spanish, Sex::Male, Location::new(1, 1)));
    simulator.spawn(Person::new(Faction::Amazonian, Sex::Female, Location::new(3, 3)));
    at_hour(&mut simulator, 10);
    simulator.set_weather(Weather::Sunny);

    simulator.step();

    assert_eq!(simulator.stats().amazonian, 0);
    assert_eq!(
        simulator.person_at(Location::new(3, 3)).map(Person::faction),
        Some(Faction::Spanish)
    );
}

#[test]
fn default_radius_misses_prey_two_cells_away() {
    let mut simulator = empty_field(5, 5, 106);
    simulator.spawn(Person::new(Faction::Spanish, Sex::Male, Location::new(1, 1)));
    simulator.spawn(Person::new(Faction::Amazonian, Sex::Female, Location::new(3, 3)));
    at_hour(&mut simulator, 10);
    simulator.set_weather(Weather::Moderate);

    simulator.step();

    assert_eq!(simulator.stats().amazonian, 1);
    let spanish = find(&simulator, Faction::Spanish);
    assert_eq!(spanish.len(), 1);
    let location = spanish[0].location().expect("alive");
    assert_eq!(location.distance(Location::new(1, 1)), 1);
}

#[test]
fn crowded_civilians_stay_within_the_field() {
    let mut simulator = empty_field(5, 5, 107);
    for row in 0..5 {
        for col in 0..5 {
            let sex = if (row + col) % 2 == 0 { Sex::Male } else { Sex::Female };
            simulator.spawn(Person::new(Faction::Civilian, sex, Location::new(row, col)));
        }
    }
    at_hour(&mut simulator, 12);

    let summary = simulator.step();

    assert!(summary.stats.civilian >= 1);
    assert!(summary.stats.civilian <= 25);
    assert_eq!(summary.stats.total(), summary.stats.civilian);
    assert_eq!(summary.repopulated, 0);
    assert!(simulator.people().all(|person| person.age() == 1));
}

#[test]
fn rain_lets_the_british_move_after_a_kill() {
    let mut simulator = empty_field(3, 3, 108);
    simulator.spawn(
        Person::new(Faction::British, Sex::Male, Location::new(0, 0)).with_resource_level(10),
    );
    simulator.spawn(Person::new(Faction::Persian, Sex::Male, Location::new(0, 1)));
    at_hour(&mut simulator, 10);
    simulator.set_weather(Weather::Rainy);

    simulator.step();

    assert_eq!(simulator.stats().persian, 0);
    let british = find(&simulator, Faction::British);
    assert_eq!(british.len(), 1);
    assert_eq!(british[0].resource_level(), 50);
    let location = british[0].location().expect("alive");
    assert_eq!(location.distance(Location::new(0, 1)), 1);
}

#[derive(Clone, Default)]
struct SharedTracks(Rc<RefCell<Vec<Track>>>);

impl Soundtrack for SharedTracks {
    fn name(&self) -> &str {
        "shared"
    }

    fn play(&mut self, track: Track) -> Result<()> {
        self.0.borrow_mut().push(track);
        Ok(())
    }
}

#[test]
fn civilians_alone_are_not_viable() {
    let tracks = SharedTracks::default();
    let mut simulator = SimulatorBuilder::new(empty_settings(4, 4, 109))
        .with_soundtrack(tracks.clone())
        .build();
    simulator.spawn(Person::new(Faction::Civilian, Sex::Male, Location::new(0, 0)));
    simulator.spawn(Person::new(Faction::Civilian, Sex::Female, Location::new(3, 3)));

    assert!(!simulator.viable());
    let summary = simulator.step();

    assert!(!summary.viable);
    assert_eq!(summary.track, Track::Win);
    assert_eq!(summary.repopulated, 0);
    assert_eq!(tracks.0.borrow().as_slice(), &[Track::Win]);
}

#[test]
fn run_stops_once_not_viable() {
    let mut simulator = empty_field(4, 4, 110);
    simulator.spawn(Person::new(Faction::Civilian, Sex::Male, Location::new(0, 0)));
    assert_eq!(simulator.run(10), 0);
    assert_eq!(simulator.step_count(), 0);
}

#[test]
fn repopulation_refills_an_emptied_field() {
    let settings = SimulatorSettings {
        repopulation_probability: 0.5,
        ..empty_settings(6, 6, 111)
    };
    let mut simulator = SimulatorBuilder::new(settings).build();
    simulator.spawn(Person::new(Faction::British, Sex::Male, Location::new(0, 0)));
    simulator.spawn(Person::new(Faction::Roman, Sex::Male, Location::new(5, 5)));
    at_hour(&mut simulator, 3);

    let summary = simulator.step();

    assert!(summary.repopulated > 0);
    assert_eq!(summary.stats.civilian, summary.repopulated);
    assert!(summary.viable);
    assert_eq!(summary.track, Track::Empire(Faction::British));
}
