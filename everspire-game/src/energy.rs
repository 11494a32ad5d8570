//! Energy drain and recovery math.

use crate::constants::{
    BRITTLE_FOOD_FACTOR, ENERGETIC_MEMORY_ZONE_DIVISOR, GOURMET_ENERGY_PER_LEVEL,
    HIGH_ALTITUDE_DRAIN_FACTOR, HOURGLASS_DRAIN_MULT, INSTANT_DRAIN_FACTOR,
    MAJOR_COMPRESSION_SPEED, REAPER_OVERCHARGE_MULT, REFLECTIONS_BASE, REFLECTIONS_BOOSTED_BASE,
    SERPENT_BOSS_DRAIN_MULT, TEMPEST_MIN_DRAIN,
};
use crate::content::{TaskDefinition, TaskKind};
use crate::engine::EngineConfig;
use crate::harrow::HarrowCard;
use crate::perk::PerkType;
use crate::prestige::{PrestigeRepeatable, PrestigeUnlock};
use crate::state::GameState;

/// Energy cost of one tick spent on `def`. `instant` marks reps that
/// finish within a single tick at the current speed.
#[must_use]
pub fn drain_per_tick(
    state: &GameState,
    cfg: &EngineConfig,
    def: &TaskDefinition,
    instant: bool,
) -> f64 {
    let mut drain = cfg.base_drain_per_tick * def.energy_mult;

    if instant && state.has_perk(PerkType::MinorTimeCompression) {
        drain *= INSTANT_DRAIN_FACTOR;
    }
    if !instant && state.has_perk(PerkType::MajorTimeCompression) {
        // The speedup is paid back here so energy per rep stays flat.
        drain *= MAJOR_COMPRESSION_SPEED;
    }
    if state.has_perk(PerkType::HighAltitudeClimbing) {
        drain *= HIGH_ALTITUDE_DRAIN_FACTOR;
    }
    drain *= reflections_factor(state);

    if state.harrow.penalty_active(HarrowCard::Hourglass) {
        drain *= HOURGLASS_DRAIN_MULT;
    }
    if def.kind == TaskKind::Boss && state.harrow.penalty_active(HarrowCard::Serpent) {
        drain *= SERPENT_BOSS_DRAIN_MULT;
    }
    if state.energy.current > state.energy.max && state.harrow.penalty_active(HarrowCard::Reaper) {
        drain *= REAPER_OVERCHARGE_MULT;
    }
    if state.harrow.penalty_active(HarrowCard::Tempest) {
        drain = drain.max(TEMPEST_MIN_DRAIN);
    }
    drain
}

/// Per-zone drain discount from Reflections on the Journey. Zones the
/// player has pushed past cost less, compounding per zone of headroom.
#[must_use]
pub fn reflections_factor(state: &GameState) -> f64 {
    if !state.has_perk(PerkType::ReflectionsOnTheJourney) {
        return 1.0;
    }
    let base = if state.prestige.owns(PrestigeUnlock::LookInTheMirror) {
        REFLECTIONS_BOOSTED_BASE
    } else {
        REFLECTIONS_BASE
    };
    let headroom = state.prestige.highest_zone.saturating_sub(state.current_zone);
    base.powf(f64::from(headroom))
}

/// Energy restored by eating one food item worth `base`.
#[must_use]
pub fn food_energy_value(state: &GameState, base: f64) -> f64 {
    let gourmet = state.prestige.repeatable_level(PrestigeRepeatable::Gourmet);
    let mut value = base + GOURMET_ENERGY_PER_LEVEL * f64::from(gourmet);
    if state.harrow.penalty_active(HarrowCard::Brittle) {
        value *= BRITTLE_FOOD_FACTOR;
    }
    value
}

/// Max-energy gain credited by the next energy reset, from the furthest
/// zone reached this run. Zero without the Energetic Memory perk.
#[must_use]
pub fn energetic_memory_gain(state: &GameState) -> f64 {
    if !state.has_perk(PerkType::EnergeticMemory) {
        return 0.0;
    }
    let gain = f64::from(state.zone_display_number()) / ENERGETIC_MEMORY_ZONE_DIVISOR;
    if gain > 1.0 && state.prestige.owns(PrestigeUnlock::TranscendantMemory) {
        gain * gain
    } else {
        gain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FLOAT_EPSILON;
    use crate::content::zone_catalog;

    fn first_task() -> &'static TaskDefinition {
        &zone_catalog().zone(0).unwrap().tasks[0]
    }

    #[test]
    fn reflections_compound_per_zone_of_headroom() {
        let mut state = GameState::new_game(1);
        state.own_perk(PerkType::ReflectionsOnTheJourney);
        state.prestige.highest_zone = 5;
        state.current_zone = 2;
        let expected = REFLECTIONS_BASE.powi(3);
        assert!((reflections_factor(&state) - expected).abs() < FLOAT_EPSILON);

        state
            .prestige
            .owned_unlocks
            .insert(PrestigeUnlock::LookInTheMirror);
        let boosted = REFLECTIONS_BOOSTED_BASE.powi(3);
        assert!((reflections_factor(&state) - boosted).abs() < FLOAT_EPSILON);
    }

    #[test]
    fn instant_discount_needs_minor_compression() {
        let state = GameState::new_game(2);
        let cfg = EngineConfig::default();
        let def = first_task();
        let plain = drain_per_tick(&state, &cfg, def, true);
        assert!((plain - cfg.base_drain_per_tick * def.energy_mult).abs() < FLOAT_EPSILON);

        let mut state = state;
        state.own_perk(PerkType::MinorTimeCompression);
        let discounted = drain_per_tick(&state, &cfg, def, true);
        assert!((discounted - plain * INSTANT_DRAIN_FACTOR).abs() < FLOAT_EPSILON);
        // Non-instant reps pay full price.
        let full = drain_per_tick(&state, &cfg, def, false);
        assert!((full - plain).abs() < FLOAT_EPSILON);
    }

    #[test]
    fn tempest_floors_the_drain() {
        let mut state = GameState::new_game(3);
        state.harrow.active.insert(HarrowCard::Tempest);
        let cfg = EngineConfig::default();
        let drain = drain_per_tick(&state, &cfg, first_task(), false);
        assert!((drain - TEMPEST_MIN_DRAIN).abs() < FLOAT_EPSILON);
    }

    #[test]
    fn reaper_only_bites_above_max() {
        let mut state = GameState::new_game(4);
        state.harrow.active.insert(HarrowCard::Reaper);
        let cfg = EngineConfig::default();
        let def = first_task();
        let normal = drain_per_tick(&state, &cfg, def, false);
        state.energy.current = state.energy.max + 1.0;
        let overcharged = drain_per_tick(&state, &cfg, def, false);
        assert!((overcharged - normal * REAPER_OVERCHARGE_MULT).abs() < FLOAT_EPSILON);
    }

    #[test]
    fn food_value_scales_with_gourmet_and_brittle() {
        let mut state = GameState::new_game(5);
        assert!((food_energy_value(&state, 10.0) - 10.0).abs() < FLOAT_EPSILON);
        state
            .prestige
            .repeatable_levels
            .insert(PrestigeRepeatable::Gourmet, 3);
        assert!((food_energy_value(&state, 10.0) - 13.0).abs() < FLOAT_EPSILON);
        state.harrow.active.insert(HarrowCard::Brittle);
        assert!((food_energy_value(&state, 10.0) - 6.5).abs() < FLOAT_EPSILON);
    }

    #[test]
    fn memory_gain_squares_past_zone_ten_with_unlock() {
        let mut state = GameState::new_game(6);
        assert!(energetic_memory_gain(&state).abs() < FLOAT_EPSILON);

        state.own_perk(PerkType::EnergeticMemory);
        state.current_zone = 8; // zone 9 on screen
        assert!((energetic_memory_gain(&state) - 0.9).abs() < FLOAT_EPSILON);

        state.current_zone = 14; // zone 15 on screen
        assert!((energetic_memory_gain(&state) - 1.5).abs() < FLOAT_EPSILON);
        state
            .prestige
            .owned_unlocks
            .insert(PrestigeUnlock::TranscendantMemory);
        assert!((energetic_memory_gain(&state) - 2.25).abs() < FLOAT_EPSILON);
    }
}
