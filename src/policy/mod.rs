//! Per-inhabitant behaviour for one step
//!
//! Every policy reads neighbourhoods from the current field and writes
//! placements into the next one. Kills land in the shared [`Population`], so a
//! victim is dead for everyone who looks at it later in the same step.

mod civilian;
mod predator;
mod prey;

use std::collections::VecDeque;

use rand::Rng;

use crate::faction::{Faction, MateCheck, Temperament};
use crate::field::Field;
use crate::geometry::Location;
use crate::person::{Person, PersonId, Population};
use crate::weather::Weather;

/// Ambient state every inhabitant sees during a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickContext {
    pub hour: u8,
    pub weather: Weather,
}

/// The two buffers of a step and the arena behind them.
pub struct Habitat<'a> {
    pub population: &'a mut Population,
    pub current: &'a Field,
    pub next: &'a mut Field,
}

impl<'a> Habitat<'a> {
    pub fn new(population: &'a mut Population, current: &'a Field, next: &'a mut Field) -> Self {
        Self {
            population,
            current,
            next,
        }
    }

    fn person(&self, id: PersonId) -> Person {
        *self.population.get(id)
    }

    fn is_alive(&self, id: PersonId) -> bool {
        self.population.get(id).is_alive()
    }

    /// Place `id` on the next field where it already stands.
    pub fn carry_forward(&mut self, id: PersonId) {
        if let Some(location) = self.population.get(id).location() {
            self.next.place(self.population, id, location);
        }
    }

    /// Place `id` on the next field at `destination`, or kill it when there is none.
    fn settle(&mut self, id: PersonId, destination: Option<Location>) {
        match destination {
            Some(location) => self.next.place(self.population, id, location),
            None => self.population.get_mut(id).set_dead(),
        }
    }

    fn free_adjacent<R: Rng + ?Sized>(&self, id: PersonId, rng: &mut R) -> VecDeque<Location> {
        match self.population.get(id).location() {
            Some(location) => self.next.free_adjacent(&*self.population, location, rng),
            None => VecDeque::new(),
        }
    }

    fn civilian_nearby<R: Rng + ?Sized>(&self, id: PersonId, rng: &mut R) -> bool {
        let Some(location) = self.population.get(id).location() else {
            return false;
        };
        self.current
            .any_adjacent(&*self.population, location, rng, |other| {
                other.faction() == Faction::Civilian
            })
    }

    fn mate_nearby<R: Rng + ?Sized>(&self, id: PersonId, field: &Field, rng: &mut R) -> bool {
        let me = self.person(id);
        let Some(location) = me.location() else {
            return false;
        };
        field.any_adjacent(&*self.population, location, rng, |other| me.is_mate(other))
    }

    /// The faction's precondition for breeding this step.
    fn may_breed<R: Rng + ?Sized>(&self, id: PersonId, rng: &mut R) -> bool {
        match self.population.get(id).profile().mate_check {
            MateCheck::None => true,
            MateCheck::CurrentField => self.mate_nearby(id, self.current, rng),
            MateCheck::NextField => self.mate_nearby(id, &*self.next, rng),
        }
    }

    /// Newborns take cells from the front of `free`.
    fn reproduce<R: Rng + ?Sized>(
        &mut self,
        id: PersonId,
        free: &mut VecDeque<Location>,
        rng: &mut R,
    ) -> u32 {
        let parent = self.person(id);
        let profile = parent.profile();
        let births = parent.give_birth(rng);
        let mut born = 0;
        for _ in 0..births {
            let Some(cell) = free.pop_front() else {
                break;
            };
            let sex = profile.newborn_sex(rng);
            let child = Person::newborn(parent.faction(), sex, cell, rng);
            self.next.spawn(self.population, child);
            born += 1;
        }
        born
    }

    /// Turn adjacent civilians that pass the recruit filter into new members
    /// on the same cells, up to the faction's recruit limit.
    fn recruit<R: Rng + ?Sized>(&mut self, id: PersonId, rng: &mut R) -> u32 {
        let recruiter = self.person(id);
        let profile = recruiter.profile();
        let Some(location) = recruiter.location() else {
            return 0;
        };
        let mut recruited = 0;
        for cell in self.current.adjacent(location, 1, rng) {
            if recruited >= profile.max_recruits {
                break;
            }
            let Some(candidate) = self.current.occupant(cell) else {
                continue;
            };
            let civilian = self.person(candidate);
            if civilian.is_alive()
                && civilian.faction() == Faction::Civilian
                && profile.accepts_recruit(civilian.sex())
            {
                self.population.get_mut(candidate).set_dead();
                let recruit = Person::newborn(profile.faction, civilian.sex(), cell, rng);
                self.next.spawn(self.population, recruit);
                recruited += 1;
            }
        }
        recruited
    }
}

/// Run the policy of `id` for one step. The dead are skipped.
pub fn tick<R: Rng + ?Sized>(
    habitat: &mut Habitat<'_>,
    id: PersonId,
    ctx: &TickContext,
    rng: &mut R,
) {
    if !habitat.is_alive(id) {
        return;
    }
    match habitat.population.get(id).profile().temperament {
        Temperament::Civilian => civilian::tick(habitat, id, rng),
        Temperament::Prey => prey::tick(habitat, id, ctx, rng),
        Temperament::Predator(_) => predator::tick(habitat, id, ctx, rng),
    }
}
