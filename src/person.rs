use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::faction::{Faction, FactionProfile, Sex};
use crate::geometry::Location;
use crate::rng::RngExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PersonId(u32);

impl PersonId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// One inhabitant of the field.
///
/// `location` is `None` exactly when the person is dead. `resource_level` is
/// only consulted for predators; everyone else carries zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    faction: Faction,
    alive: bool,
    location: Option<Location>,
    sex: Sex,
    age: u32,
    resource_level: u32,
}

impl Person {
    /// A fresh member at age zero. Predators still start with a random
    /// resource level below their full value.
    pub fn newborn<R: Rng + ?Sized>(
        faction: Faction,
        sex: Sex,
        location: Location,
        rng: &mut R,
    ) -> Self {
        let profile = faction.profile();
        let resource_level = profile
            .predation()
            .map_or(0, |predation| rng.gen_range(0..predation.full_resource));
        Self {
            faction,
            alive: true,
            location: Some(location),
            sex: profile.fixed_sex.unwrap_or(sex),
            age: 0,
            resource_level,
        }
    }

    /// A member of the initial population: random sex (unless single-sex),
    /// random age below the maximum, random resource level.
    pub fn seeded<R: Rng + ?Sized>(faction: Faction, location: Location, rng: &mut R) -> Self {
        let profile = faction.profile();
        let sex = profile.newborn_sex(rng);
        let mut person = Self::newborn(faction, sex, location, rng);
        person.age = rng.gen_range(0..profile.max_age);
        person
    }

    /// A deterministic member for hand-built fields: age zero, full resources.
    pub fn new(faction: Faction, sex: Sex, location: Location) -> Self {
        let profile = faction.profile();
        Self {
            faction,
            alive: true,
            location: Some(location),
            sex: profile.fixed_sex.unwrap_or(sex),
            age: 0,
            resource_level: profile.predation().map_or(0, |p| p.full_resource),
        }
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = age;
        self
    }

    pub fn with_resource_level(mut self, resource_level: u32) -> Self {
        self.resource_level = resource_level;
        self
    }

    pub fn faction(&self) -> Faction {
        self.faction
    }

    pub fn profile(&self) -> &'static FactionProfile {
        self.faction.profile()
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn location(&self) -> Option<Location> {
        self.location
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn resource_level(&self) -> u32 {
        self.resource_level
    }

    pub(crate) fn set_location(&mut self, location: Location) {
        if self.alive {
            self.location = Some(location);
        }
    }

    pub fn set_dead(&mut self) {
        self.alive = false;
        self.location = None;
    }

    /// Age by one step; dies once past the faction's maximum age.
    pub fn increment_age(&mut self) {
        self.age += 1;
        if self.age > self.profile().max_age {
            self.set_dead();
        }
    }

    /// Burn one unit of resources; dies when the level reaches zero.
    pub fn consume_resources(&mut self) {
        self.resource_level = self.resource_level.saturating_sub(1);
        if self.resource_level == 0 {
            self.set_dead();
        }
    }

    pub fn restore_resources(&mut self) {
        if let Some(predation) = self.profile().predation() {
            self.resource_level = predation.full_resource;
        }
    }

    pub fn can_breed(&self) -> bool {
        self.age >= self.profile().breeding_age
    }

    /// Number of children born this step, uniform over `1..=max_children`
    /// when old enough and the birth draw succeeds, otherwise zero.
    pub fn give_birth<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        let profile = self.profile();
        if self.can_breed() && rng.chance(profile.birth_probability) {
            1 + rng.gen_range(0..profile.max_children)
        } else {
            0
        }
    }

    /// Whether `other` could mate with this person: same faction, opposite sex, alive.
    pub fn is_mate(&self, other: &Person) -> bool {
        other.alive && other.faction == self.faction && other.sex != self.sex
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{{age = {}, alive = {}, location = ",
            self.faction, self.age, self.alive
        )?;
        match self.location {
            Some(location) => write!(f, "{location}")?,
            None => f.write_str("none")?,
        }
        if self.profile().predation().is_some() {
            write!(f, ", resource = {}", self.resource_level)?;
        }
        f.write_str("}")
    }
}

/// Arena owning every person referenced by either field buffer.
///
/// Both buffers store [`PersonId`]s into the same arena, so a kill recorded
/// while reading the current field is visible from the next one.
#[derive(Debug, Clone, Default)]
pub struct Population {
    people: Vec<Person>,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, person: Person) -> PersonId {
        let id = PersonId(self.people.len() as u32);
        self.people.push(person);
        id
    }

    pub fn get(&self, id: PersonId) -> &Person {
        &self.people[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: PersonId) -> &mut Person {
        &mut self.people[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    pub fn living(&self) -> impl Iterator<Item = &Person> {
        self.people.iter().filter(|person| person.alive)
    }
}
