//! The field - authoritative spatial index over one buffer of the step
//!
//! A step reads neighbourhoods from the current field and writes placements
//! into the next one. Both buffers index into the same [`Population`].

use std::collections::{HashMap, VecDeque};
use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::faction::{Faction, Sex};
use crate::geometry::{Grid, Location};
use crate::person::{Person, PersonId, Population};
use crate::rng::RngExt;

pub const DEFAULT_DEPTH: usize = 80;
pub const DEFAULT_WIDTH: usize = 120;

#[derive(Debug, Clone)]
pub struct Field {
    grid: Grid,
    cells: HashMap<Location, PersonId>,
    people: Vec<PersonId>,
}

impl Field {
    pub fn new(depth: usize, width: usize) -> Self {
        Self {
            grid: Grid::new(depth, width),
            cells: HashMap::new(),
            people: Vec::new(),
        }
    }

    /// Empty field with the same dimensions.
    pub fn empty_like(&self) -> Self {
        Self::new(self.grid.depth(), self.grid.width())
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn depth(&self) -> usize {
        self.grid.depth()
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    /// Inhabitants in insertion order; may still hold people who died this step.
    pub fn people(&self) -> &[PersonId] {
        &self.people
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.people.clear();
    }

    /// Put `id` at `location`. A different occupant already there is evicted
    /// from the inhabitant list and, having been overwritten, dies.
    pub fn place(&mut self, population: &mut Population, id: PersonId, location: Location) {
        if !self.grid.contains(location) {
            return;
        }
        if let Some(old) = population.get(id).location() {
            if old != location && self.occupant(old) == Some(id) {
                self.cells.remove(&old);
                self.forget(id);
            }
        }
        if let Some(previous) = self.cells.insert(location, id) {
            self.forget(previous);
            if previous != id {
                population.get_mut(previous).set_dead();
            }
        }
        self.people.push(id);
        population.get_mut(id).set_location(location);
    }

    fn forget(&mut self, id: PersonId) {
        if let Some(index) = self.people.iter().position(|&other| other == id) {
            self.people.remove(index);
        }
    }

    /// Spawn `person` into the population and place it at its own location.
    pub fn spawn(&mut self, population: &mut Population, person: Person) -> Option<PersonId> {
        let location = person.location()?;
        if !self.grid.contains(location) {
            return None;
        }
        let id = population.spawn(person);
        self.place(population, id, location);
        Some(id)
    }

    pub fn occupant(&self, location: Location) -> Option<PersonId> {
        self.cells.get(&location).copied()
    }

    pub fn at<'p>(&self, population: &'p Population, location: Location) -> Option<&'p Person> {
        self.occupant(location).map(|id| population.get(id))
    }

    /// In-bounds neighbours within `radius`, shuffled.
    pub fn adjacent<R: Rng + ?Sized>(
        &self,
        location: Location,
        radius: usize,
        rng: &mut R,
    ) -> Vec<Location> {
        let mut cells = self.grid.neighbourhood(location, radius);
        cells.shuffle(rng);
        cells
    }

    /// Shuffled neighbours that are empty or hold someone already dead.
    pub fn free_adjacent<R: Rng + ?Sized>(
        &self,
        population: &Population,
        location: Location,
        rng: &mut R,
    ) -> VecDeque<Location> {
        self.adjacent(location, 1, rng)
            .into_iter()
            .filter(|cell| {
                self.at(population, *cell)
                    .map_or(true, |person| !person.is_alive())
            })
            .collect()
    }

    /// Cells without any map entry, in row-major order.
    pub fn free_cells(&self) -> Vec<Location> {
        self.grid
            .cells()
            .filter(|cell| !self.cells.contains_key(cell))
            .collect()
    }

    /// Whether any neighbour holds a live person matching `predicate`.
    pub fn any_adjacent<R, F>(
        &self,
        population: &Population,
        location: Location,
        rng: &mut R,
        mut predicate: F,
    ) -> bool
    where
        R: Rng + ?Sized,
        F: FnMut(&Person) -> bool,
    {
        self.adjacent(location, 1, rng).into_iter().any(|cell| {
            self.at(population, cell)
                .is_some_and(|person| person.is_alive() && predicate(person))
        })
    }

    pub fn stats(&self, population: &Population) -> FieldStats {
        let mut stats = FieldStats::default();
        for &id in self.cells.values() {
            let person = population.get(id);
            if person.is_alive() {
                stats.increment(person.faction());
            }
        }
        stats
    }

    /// At least two distinct empires still have a live member.
    pub fn viable(&self, population: &Population) -> bool {
        let mut found: Vec<Faction> = Vec::with_capacity(2);
        for &id in &self.people {
            let person = population.get(id);
            let faction = person.faction();
            if person.is_alive() && faction.is_empire() && !found.contains(&faction) {
                found.push(faction);
                if found.len() > 1 {
                    return true;
                }
            }
        }
        false
    }

    pub fn has_civilian(&self, population: &Population) -> bool {
        self.people.iter().any(|&id| {
            let person = population.get(id);
            person.is_alive() && person.faction() == Faction::Civilian
        })
    }

    /// Seed every free cell with a civilian with probability `probability`.
    /// Returns how many were created.
    pub fn repopulate_civilians<R: Rng + ?Sized>(
        &mut self,
        population: &mut Population,
        rng: &mut R,
        probability: f64,
    ) -> usize {
        let mut created = 0;
        for cell in self.free_cells() {
            if rng.chance(probability) {
                let civilian = Person::seeded(Faction::Civilian, cell, rng);
                if self.spawn(population, civilian).is_some() {
                    created += 1;
                }
            }
        }
        created
    }

    /// Drop everyone dead or displaced, renumbering the survivors in list order.
    pub fn compact(&self, population: &Population) -> (Field, Population) {
        let mut field = self.empty_like();
        let mut survivors = Population::new();
        for &id in &self.people {
            let person = population.get(id);
            let Some(location) = person.location() else {
                continue;
            };
            if person.is_alive() && self.occupant(location) == Some(id) {
                field.spawn(&mut survivors, *person);
            }
        }
        (field, survivors)
    }

    pub fn view(&self, population: &Population) -> FieldView {
        let mut occupants: Vec<Occupant> = self
            .cells
            .iter()
            .map(|(&location, &id)| {
                let person = population.get(id);
                Occupant {
                    location,
                    faction: person.faction(),
                    sex: person.sex(),
                    age: person.age(),
                    alive: person.is_alive(),
                }
            })
            .collect();
        occupants.sort_by_key(|occupant| occupant.location);
        FieldView {
            depth: self.depth(),
            width: self.width(),
            occupants,
        }
    }
}

/// Live counts per faction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStats {
    pub civilian: usize,
    pub amazonian: usize,
    pub british: usize,
    pub persian: usize,
    pub roman: usize,
    pub spanish: usize,
}

impl FieldStats {
    pub fn get(&self, faction: Faction) -> usize {
        match faction {
            Faction::Civilian => self.civilian,
            Faction::Amazonian => self.amazonian,
            Faction::British => self.british,
            Faction::Persian => self.persian,
            Faction::Roman => self.roman,
            Faction::Spanish => self.spanish,
        }
    }

    fn increment(&mut self, faction: Faction) {
        let slot = match faction {
            Faction::Civilian => &mut self.civilian,
            Faction::Amazonian => &mut self.amazonian,
            Faction::British => &mut self.british,
            Faction::Persian => &mut self.persian,
            Faction::Roman => &mut self.roman,
            Faction::Spanish => &mut self.spanish,
        };
        *slot += 1;
    }

    pub fn total(&self) -> usize {
        Faction::ALL.iter().map(|&faction| self.get(faction)).sum()
    }

    /// Empire with the most live members, earliest in population order on ties.
    pub fn dominant_empire(&self) -> Option<Faction> {
        let mut best: Option<(Faction, usize)> = None;
        for faction in Faction::EMPIRES {
            let count = self.get(faction);
            if count > 0 && best.map_or(true, |(_, top)| count > top) {
                best = Some((faction, count));
            }
        }
        best.map(|(faction, _)| faction)
    }
}

impl fmt::Display for FieldStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Civilians: {} Amazonians: {} British: {} Persians: {} Romans: {} Spanish: {}",
            self.civilian, self.amazonian, self.british, self.persian, self.roman, self.spanish
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    pub location: Location,
    pub faction: Faction,
    pub sex: Sex,
    pub age: u32,
    pub alive: bool,
}

/// Read-only copy of a field handed to viewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldView {
    pub depth: usize,
    pub width: usize,
    /// Row-major.
    pub occupants: Vec<Occupant>,
}

impl FieldView {
    pub fn occupancy(&self) -> Vec<Vec<Option<Faction>>> {
        let mut grid = vec![vec![None; self.width]; self.depth];
        for occupant in self.occupants.iter().filter(|o| o.alive) {
            grid[occupant.location.row][occupant.location.col] = Some(occupant.faction);
        }
        grid
    }

    /// One line per row, `.` for empty cells.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.depth);
        for row in self.occupancy() {
            out.extend(row.iter().map(|cell| cell.map_or('.', Faction::glyph)));
            out.push('\n');
        }
        out
    }
}
