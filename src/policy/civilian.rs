use rand::Rng;

use super::Habitat;
use crate::person::PersonId;

/// Age, breed next to a mate, then move into a free neighbour or die of overcrowding.
pub(super) fn tick<R: Rng + ?Sized>(habitat: &mut Habitat<'_>, id: PersonId, rng: &mut R) {
    habitat.population.get_mut(id).increment_age();
    if !habitat.is_alive(id) {
        return;
    }

    let mut free = habitat.free_adjacent(id, rng);
    if !free.is_empty() && habitat.may_breed(id, rng) {
        habitat.reproduce(id, &mut free, rng);
    }
    let destination = free.front().copied();
    habitat.settle(id, destination);
}

#[cfg(test)]
mod tests {
    use crate::faction::{Faction, Sex};
    use crate::geometry::Location;
    use crate::person::Person;
    use crate::policy::test_support::Bench;
    use crate::weather::Weather;

    #[test]
    fn civilian_moves_to_a_free_neighbour() {
        let mut bench = Bench::new(3, 3, 11);
        let id = bench.add_at(Faction::Civilian, Sex::Male, 1, 1);
        bench.tick(id, 12, Weather::Moderate);

        let person = bench.person(id);
        assert!(person.is_alive());
        assert_eq!(person.age(), 1);
        let location = person.location().unwrap();
        assert_eq!(location.distance(Location::new(1, 1)), 1);
        assert_eq!(bench.next.occupant(location), Some(id));
    }

    #[test]
    fn civilian_dies_when_next_neighbourhood_is_full() {
        let mut bench = Bench::new(1, 2, 12);
        let id = bench.add_at(Faction::Civilian, Sex::Male, 0, 0);
        let blocker = bench.population.spawn(Person::new(
            Faction::Persian,
            Sex::Male,
            Location::new(0, 1),
        ));
        bench
            .next
            .place(&mut bench.population, blocker, Location::new(0, 1));

        bench.tick(id, 12, Weather::Moderate);

        assert!(!bench.person(id).is_alive());
        assert_eq!(bench.next_stats().civilian, 0);
    }

    #[test]
    fn civilian_dies_of_old_age() {
        let mut bench = Bench::new(3, 3, 13);
        let id = bench.add(
            Person::new(Faction::Civilian, Sex::Female, Location::new(1, 1)).with_age(100),
        );
        bench.tick(id, 12, Weather::Moderate);

        assert!(!bench.person(id).is_alive());
        assert!(bench.next.people().is_empty());
    }

    #[test]
    fn civilian_without_mate_in_next_field_never_breeds() {
        let mut bench = Bench::new(3, 3, 14);
        let id = bench.add(
            Person::new(Faction::Civilian, Sex::Female, Location::new(1, 1)).with_age(50),
        );
        // A mate on the current field only does not count.
        bench.add_at(Faction::Civilian, Sex::Male, 0, 0);
        bench.tick(id, 12, Weather::Moderate);

        assert_eq!(bench.next_stats().civilian, 1);
    }
}
