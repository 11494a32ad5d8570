//! The energy reset: depletion snapshot, the soft reset itself, and the
//! Minor Time Compression zone fast-forward.

use std::collections::BTreeMap;

use crate::constants::{
    GRAVE_ITEM_DIVISOR, LOG_ENERGY_DEPLETED, LOG_ENERGY_RESET, LOG_FAST_FORWARD,
    RESET_ITEM_DIVISOR,
};
use crate::energy;
use crate::engine::tick::{self, TickOutcome};
use crate::engine::{EngineConfig, speed_breakdown};
use crate::event::EventKind;
use crate::harrow::HarrowCard;
use crate::item::ItemType;
use crate::numbers::ceil_f64_to_u32;
use crate::perk::PerkType;
use crate::state::{EnergyResetInfo, GameState};

/// Freeze the run at the moment energy hits zero and snapshot the summary
/// shown on the reset screen.
pub(crate) fn begin_energy_reset(state: &mut GameState) {
    state.energy_reset_info = Some(EnergyResetInfo {
        skill_gains: state.skill_gains_since_baseline(),
        power_at_start: state.run_baseline.power,
        power_at_end: state.power,
        attunement_at_start: state.run_baseline.attunement,
        attunement_at_end: state.attunement,
        energetic_memory_gain: energy::energetic_memory_gain(state),
    });
    state.is_in_energy_reset = true;
    state.active_task = None;
    state.logs.push(String::from(LOG_ENERGY_DEPLETED));
    state.events.push(state.tick, EventKind::EnergyDepleted);
}

/// Apply the pending energy reset and start the run over from zone one.
/// Refused while energy has not actually depleted.
pub fn do_energy_reset(state: &mut GameState, cfg: &EngineConfig) -> bool {
    if !state.is_in_energy_reset {
        return false;
    }
    // The snapshot was taken in the zone the run died in; recomputing after
    // the zone resets would under-reward Energetic Memory.
    let memory_gain = state
        .energy_reset_info
        .as_ref()
        .map_or_else(|| energy::energetic_memory_gain(state), |info| info.energetic_memory_gain);

    let divisor = if state.harrow.penalty_active(HarrowCard::Grave) {
        GRAVE_ITEM_DIVISOR
    } else {
        RESET_ITEM_DIVISOR
    };
    let mut kept: BTreeMap<ItemType, u32> = BTreeMap::new();
    for (&item, &count) in &state.items {
        let keep = ceil_f64_to_u32(f64::from(count) / divisor);
        if keep > 0 {
            kept.insert(item, keep);
        }
    }
    if state.has_perk(PerkType::CompulsiveNotetaking) {
        for &item in &state.items_found_this_energy_reset {
            kept.entry(item)
                .and_modify(|count| *count = (*count).max(1))
                .or_insert(1);
        }
    }
    state.items = kept;
    state.items_found_this_energy_reset.clear();

    // Used-item speed boosts disappear; levels and progress stay.
    for skill in &mut state.skills {
        skill.speed_modifier = 0.0;
    }
    state.queued_scrolls_of_haste = 0;
    state.queued_magic_rings = 0;
    state.queued_lightning = 0;

    state.energy.max += memory_gain;
    state.energy.current = state.energy.max;

    state.current_zone = 0;
    state.enter_zone(false);

    state.is_in_energy_reset = false;
    state.energy_reset_info = None;
    state.energy_reset_count += 1;
    state.capture_run_baseline();

    state.logs.push(String::from(LOG_ENERGY_RESET));
    state.events.push(state.tick, EventKind::EnergyResetApplied);

    fast_forward_instant_zones(state, cfg);
    true
}

/// Every task in the current zone finishes in one tick without one-shot
/// boosts.
fn zone_completes_instantly(state: &GameState, cfg: &EngineConfig) -> bool {
    state.zone_def().is_some_and(|zone| {
        zone.tasks
            .iter()
            .all(|def| speed_breakdown(state, cfg, def, false, false).instant)
    })
}

/// With Minor Time Compression, zones the player has trivially outgrown
/// complete for free as the new run begins, rewards included.
fn fast_forward_instant_zones(state: &mut GameState, cfg: &EngineConfig) {
    if !state.has_perk(PerkType::MinorTimeCompression) {
        return;
    }
    let mut skipped = false;
    let mut outcome = TickOutcome::default();
    while !state.is_at_end_of_content && zone_completes_instantly(state, cfg) {
        let Some(zone) = state.zone_def() else {
            break;
        };
        for def in &zone.tasks {
            while state
                .task_state(&def.id)
                .is_some_and(|task| task.reps < def.max_reps)
            {
                tick::complete_rep(state, cfg, def, &mut outcome);
            }
        }
        state.refresh_travel_gate();
        if state.zone_fully_completed() {
            state.prestige.highest_zone_fully_completed = state
                .prestige
                .highest_zone_fully_completed
                .max(state.current_zone);
        }
        tick::advance_zone(state);
        skipped = true;
    }
    if skipped {
        state.logs.push(String::from(LOG_FAST_FORWARD));
    }
}
