use rand::Rng;

use super::{Habitat, TickContext};
use crate::geometry::Location;
use crate::person::PersonId;

/// Empires that hunt.
///
/// A predator burns one unit of resources per active step and starves at
/// zero. Each round it recruits if a civilian is adjacent; otherwise it may
/// breed, then hunts and moves onto its kill, or takes the first free
/// neighbour. Rain gives the British a second round.
pub(super) fn tick<R: Rng + ?Sized>(
    habitat: &mut Habitat<'_>,
    id: PersonId,
    ctx: &TickContext,
    rng: &mut R,
) {
    let profile = habitat.population.get(id).profile();
    let executions = profile.executions(ctx.weather);

    habitat.population.get_mut(id).increment_age();
    if !habitat.is_alive(id) {
        return;
    }
    if !profile.is_active(ctx.hour) {
        habitat.carry_forward(id);
        return;
    }
    habitat.population.get_mut(id).consume_resources();
    if !habitat.is_alive(id) {
        return;
    }

    let mut destination = None;
    for _ in 0..executions {
        let Some(here) = habitat.population.get(id).location() else {
            break;
        };
        let mut free = habitat.free_adjacent(id, rng);
        if habitat.civilian_nearby(id, rng) {
            habitat.recruit(id, rng);
            destination = Some(here);
            continue;
        }
        if !free.is_empty() && habitat.may_breed(id, rng) {
            habitat.reproduce(id, &mut free, rng);
        }
        destination = find_enemy(habitat, id, ctx, rng).or_else(|| free.pop_front());
        if let Some(next) = destination {
            habitat.population.get_mut(id).set_location(next);
        }
    }
    habitat.settle(id, destination);
}

/// Kill the first live member of the diet within hunting range of the
/// current field. The hunter eats its fill and the kill's cell is returned.
fn find_enemy<R: Rng + ?Sized>(
    habitat: &mut Habitat<'_>,
    id: PersonId,
    ctx: &TickContext,
    rng: &mut R,
) -> Option<Location> {
    let hunter = habitat.person(id);
    let profile = hunter.profile();
    let here = hunter.location()?;
    let radius = profile.hunting_radius(ctx.weather);

    for cell in habitat.current.adjacent(here, radius, rng) {
        let Some(victim) = habitat.current.occupant(cell) else {
            continue;
        };
        let target = habitat.person(victim);
        if target.is_alive() && profile.eats(target.faction()) {
            habitat.population.get_mut(victim).set_dead();
            habitat.population.get_mut(id).restore_resources();
            return Some(cell);
        }
    }
    None
}
