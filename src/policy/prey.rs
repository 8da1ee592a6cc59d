use rand::Rng;

use super::{Habitat, TickContext};
use crate::person::PersonId;

/// Empires that recruit and breed but never attack.
///
/// Outside active hours the member stays where it is. Next to a civilian it
/// recruits and holds its cell; otherwise it may breed and then moves to the
/// first free neighbour, dying when there is none.
pub(super) fn tick<R: Rng + ?Sized>(
    habitat: &mut Habitat<'_>,
    id: PersonId,
    ctx: &TickContext,
    rng: &mut R,
) {
    habitat.population.get_mut(id).increment_age();
    if !habitat.is_alive(id) {
        return;
    }
    let profile = habitat.population.get(id).profile();
    if !profile.is_active(ctx.hour) {
        habitat.carry_forward(id);
        return;
    }

    let mut free = habitat.free_adjacent(id, rng);
    if habitat.civilian_nearby(id, rng) {
        habitat.recruit(id, rng);
        habitat.carry_forward(id);
        return;
    }
    if !free.is_empty() && habitat.may_breed(id, rng) {
        habitat.reproduce(id, &mut free, rng);
    }
    let destination = free.front().copied();
    habitat.settle(id, destination);
}
