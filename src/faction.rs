//! Faction tags and their behaviour tables
//!
//! Every rule that differs between factions lives in a [`FactionProfile`]; the
//! policies in [`crate::policy`] read these tables instead of branching on the
//! faction wherever possible.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::weather::Weather;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Sex {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen_range(0..2) == 0 {
            Sex::Male
        } else {
            Sex::Female
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => f.write_str("M"),
            Sex::Female => f.write_str("F"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Faction {
    Civilian,
    Amazonian,
    British,
    Persian,
    Roman,
    Spanish,
}

impl Faction {
    /// Order used for census lines and stats.
    pub const ALL: [Faction; 6] = [
        Faction::Civilian,
        Faction::Amazonian,
        Faction::British,
        Faction::Persian,
        Faction::Roman,
        Faction::Spanish,
    ];

    /// Population order of the empires; dominance ties resolve to the earliest.
    pub const EMPIRES: [Faction; 5] = [
        Faction::British,
        Faction::Roman,
        Faction::Persian,
        Faction::Spanish,
        Faction::Amazonian,
    ];

    pub fn is_empire(self) -> bool {
        self != Faction::Civilian
    }

    pub fn name(self) -> &'static str {
        match self {
            Faction::Civilian => "Civilian",
            Faction::Amazonian => "Amazonian",
            Faction::British => "British",
            Faction::Persian => "Persian",
            Faction::Roman => "Roman",
            Faction::Spanish => "Spanish",
        }
    }

    /// Single character used by the occupancy grid rendering.
    pub fn glyph(self) -> char {
        match self {
            Faction::Civilian => 'c',
            Faction::Amazonian => 'A',
            Faction::British => 'B',
            Faction::Persian => 'P',
            Faction::Roman => 'R',
            Faction::Spanish => 'S',
        }
    }

    pub fn profile(self) -> &'static FactionProfile {
        match self {
            Faction::Civilian => &CIVILIAN,
            Faction::Amazonian => &AMAZONIAN,
            Faction::British => &BRITISH,
            Faction::Persian => &PERSIAN,
            Faction::Roman => &ROMAN,
            Faction::Spanish => &SPANISH,
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Hours of day, as half-open `[start, end)` ranges, during which a faction acts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveHours(&'static [(u8, u8)]);

impl ActiveHours {
    pub const ALWAYS: ActiveHours = ActiveHours(&[(0, 24)]);

    pub fn contains(&self, hour: u8) -> bool {
        self.0.iter().any(|&(start, end)| start <= hour && hour < end)
    }
}

/// How the faction behaves when it has nothing better to do than move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Temperament {
    /// Moves and mates; never recruits.
    Civilian,
    /// Recruits, breeds and moves; never attacks.
    Prey,
    /// Starves without kills; attacks the factions in its diet.
    Predator(Predation),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Predation {
    pub full_resource: u32,
    pub diet: &'static [Faction],
}

/// Where a faction looks for a mate before breeding, if at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MateCheck {
    None,
    CurrentField,
    NextField,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactionProfile {
    pub faction: Faction,
    /// `Some` for single-sex factions.
    pub fixed_sex: Option<Sex>,
    pub max_age: u32,
    pub breeding_age: u32,
    pub birth_probability: f64,
    pub max_children: u32,
    pub max_recruits: u32,
    /// `Some` when only civilians of that sex can be recruited.
    pub recruit_sex: Option<Sex>,
    pub active_hours: ActiveHours,
    pub mate_check: MateCheck,
    pub temperament: Temperament,
}

impl FactionProfile {
    pub fn predation(&self) -> Option<&Predation> {
        match &self.temperament {
            Temperament::Predator(predation) => Some(predation),
            _ => None,
        }
    }

    pub fn is_active(&self, hour: u8) -> bool {
        self.active_hours.contains(hour)
    }

    pub fn accepts_recruit(&self, sex: Sex) -> bool {
        self.recruit_sex.map_or(true, |wanted| wanted == sex)
    }

    pub fn eats(&self, faction: Faction) -> bool {
        self.predation()
            .is_some_and(|predation| predation.diet.contains(&faction))
    }

    /// Number of act/move rounds per step under the given weather.
    pub fn executions(&self, weather: Weather) -> usize {
        if self.faction == Faction::British && weather == Weather::Rainy {
            2
        } else {
            1
        }
    }

    /// Radius scanned when hunting under the given weather.
    pub fn hunting_radius(&self, weather: Weather) -> usize {
        if self.faction == Faction::Spanish && weather == Weather::Sunny {
            2
        } else {
            1
        }
    }

    /// Sex of a newborn: fixed for single-sex factions, otherwise random.
    pub fn newborn_sex<R: Rng + ?Sized>(&self, rng: &mut R) -> Sex {
        self.fixed_sex.unwrap_or_else(|| Sex::random(rng))
    }
}

static CIVILIAN: FactionProfile = FactionProfile {
    faction: Faction::Civilian,
    fixed_sex: None,
    max_age: 100,
    breeding_age: 20,
    birth_probability: 0.05,
    max_children: 4,
    max_recruits: 0,
    recruit_sex: None,
    active_hours: ActiveHours::ALWAYS,
    mate_check: MateCheck::NextField,
    temperament: Temperament::Civilian,
};

// Asexual: no mate is required even though the faction is female-only.
static AMAZONIAN: FactionProfile = FactionProfile {
    faction: Faction::Amazonian,
    fixed_sex: Some(Sex::Female),
    max_age: 200,
    breeding_age: 10,
    birth_probability: 0.02,
    max_children: 1,
    max_recruits: 2,
    recruit_sex: Some(Sex::Female),
    active_hours: ActiveHours(&[(6, 23)]),
    mate_check: MateCheck::None,
    temperament: Temperament::Prey,
};

static PERSIAN: FactionProfile = FactionProfile {
    faction: Faction::Persian,
    fixed_sex: None,
    max_age: 300,
    breeding_age: 5,
    birth_probability: 0.05,
    max_children: 1,
    max_recruits: 2,
    recruit_sex: None,
    active_hours: ActiveHours(&[(10, 23)]),
    mate_check: MateCheck::CurrentField,
    temperament: Temperament::Prey,
};

// Tea time between 15:00 and 17:00.
static BRITISH: FactionProfile = FactionProfile {
    faction: Faction::British,
    fixed_sex: None,
    max_age: 800,
    breeding_age: 40,
    birth_probability: 0.2,
    max_children: 2,
    max_recruits: 3,
    recruit_sex: None,
    active_hours: ActiveHours(&[(6, 15), (17, 19)]),
    mate_check: MateCheck::NextField,
    temperament: Temperament::Predator(Predation {
        full_resource: 50,
        diet: &[Faction::Persian, Faction::Roman],
    }),
};

// Bath time between 11:00 and 13:00.
static ROMAN: FactionProfile = FactionProfile {
    faction: Faction::Roman,
    fixed_sex: Some(Sex::Male),
    max_age: 800,
    breeding_age: 30,
    birth_probability: 0.75,
    max_children: 4,
    max_recruits: 4,
    recruit_sex: Some(Sex::Male),
    active_hours: ActiveHours(&[(7, 11), (13, 20)]),
    mate_check: MateCheck::None,
    temperament: Temperament::Predator(Predation {
        full_resource: 20,
        diet: &[Faction::Amazonian, Faction::Persian],
    }),
};

// Siesta between 14:00 and 16:00.
static SPANISH: FactionProfile = FactionProfile {
    faction: Faction::Spanish,
    fixed_sex: None,
    max_age: 500,
    breeding_age: 50,
    birth_probability: 0.7,
    max_children: 4,
    max_recruits: 3,
    recruit_sex: None,
    active_hours: ActiveHours(&[(7, 14), (16, 20)]),
    mate_check: MateCheck::NextField,
    temperament: Temperament::Predator(Predation {
        full_resource: 30,
        diet: &[Faction::Amazonian, Faction::Roman],
    }),
};
