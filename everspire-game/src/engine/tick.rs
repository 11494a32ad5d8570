//! The per-tick pipeline: charge arming, speed resolution, progress,
//! rep completion, energy drain, zone advancement, automation refill,
//! and item auto-use.

use crate::automation;
use crate::constants::{
    ECLIPSE_ZONE_ADVANCE_COST, ENERGY_EPSILON, FROST_XP_FACTOR, GOTTA_GO_FAST_BASE,
    HASTE_PROGRESS_MULT, KNOWLEDGE_BOOST_XP_PER_LEVEL, LIGHTNING_BOSS_MULT, LOG_AUTOMATION_SKIP,
    LOG_END_OF_CONTENT, LOG_POWER_UNLOCKED, LOG_ZONE_ADVANCED, MAGIC_RING_XP_MULT,
    MAJOR_COMPRESSION_SPEED, UNIFIED_THEORY_EFFECT, UNLIMITED_POWER_BASE, VEIL_XP_BONUS,
    WRITING_XP_BONUS,
};
use crate::content::{TaskDefinition, TaskKind, zone_catalog};
use crate::energy;
use crate::engine::{EngineConfig, unified_theory_exponent};
use crate::event::EventKind;
use crate::harrow::{self, HarrowCard};
use crate::numbers::{ceil_f64_to_u64, floor_f64_to_u32, u64_to_f64};
use crate::perk::{PerkType, speed_product};
use crate::prestige::PrestigeRepeatable;
use crate::reset;
use crate::skill::{grant_xp, level_factor, shackled_cap};
use crate::state::GameState;

/// What a single call to [`advance`] did to the state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickOutcome {
    /// A task received progress this tick.
    pub worked: bool,
    pub reps_completed: u32,
    pub energy_spent: f64,
    pub zone_advanced: bool,
    pub energy_depleted: bool,
}

/// Resolved speed for one tick of one task.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedBreakdown {
    pub multiplier: f64,
    /// The current rep finishes within this tick.
    pub instant: bool,
    /// Major Time Compression boosted a rep that was too slow on its own.
    pub compression_applied: bool,
}

/// Projected cost of repeating a task, for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionEstimate {
    pub ticks: u64,
    pub energy: f64,
}

/// Advance the simulation by one tick.
///
/// While an energy reset is pending the world is frozen: the tick counter
/// does not move and nothing runs until the reset is applied.
pub fn advance(state: &mut GameState, cfg: &EngineConfig) -> TickOutcome {
    let mut outcome = TickOutcome::default();
    if state.is_in_energy_reset {
        return outcome;
    }
    state.tick = state.tick.wrapping_add(1);

    if let Some(id) = state.active_task.clone() {
        process_active_task(state, cfg, &id, &mut outcome);
    }

    // Depletion freezes the run before automation or auto-use can act.
    if state.is_in_energy_reset {
        return outcome;
    }

    if state.active_task.is_none()
        && let Some(next) = automation::select_next(state)
    {
        state.active_task = Some(next);
    }
    if state.auto_use_items && state.auto_use_unlocked() {
        crate::actions::auto_use_all(state);
    }
    // Tick-time gains never bank energy past the cap.
    state.energy.current = state.energy.current.min(state.energy.max);
    outcome
}

fn process_active_task(
    state: &mut GameState,
    cfg: &EngineConfig,
    id: &str,
    outcome: &mut TickOutcome,
) {
    let Some(def) = zone_catalog().find_task(id) else {
        // Stale id from an old save or a cleared zone.
        state.logs.push(String::from(LOG_AUTOMATION_SKIP));
        state.active_task = None;
        return;
    };
    if !state.task_state(id).is_some_and(|task| task.enabled) {
        state.active_task = None;
        return;
    }

    // The first worked tick locks the Harrow lineup for this run.
    if !state.harrow.run_started {
        state.harrow.run_started = true;
        harrow::roll_fool(state);
    }

    arm_charges(state, def);
    let (hasted, lightning) = state
        .task_state(id)
        .map_or((false, false), |task| (task.hasted, task.lightning));
    let breakdown = speed_breakdown(state, cfg, def, hasted, lightning);
    outcome.worked = true;

    let completed = match state.task_state_mut(id) {
        Some(task) => {
            task.progress += cfg.progress_per_tick * breakdown.multiplier;
            task.progress >= def.base_cost
        }
        None => false,
    };
    if completed {
        complete_rep(state, cfg, def, outcome);
        if breakdown.instant && state.has_perk(PerkType::MajorTimeCompression) {
            // Compression folds the remaining reps into this same tick.
            while state
                .task_state(id)
                .is_some_and(|task| task.reps < def.max_reps)
            {
                complete_rep(state, cfg, def, outcome);
            }
        }
    }

    let drain = energy::drain_per_tick(state, cfg, def, breakdown.instant);
    state.energy.current -= drain;
    outcome.energy_spent = drain;
    if state.energy.current <= ENERGY_EPSILON {
        state.energy.current = 0.0;
        reset::begin_energy_reset(state);
        outcome.energy_depleted = true;
        return;
    }

    state.refresh_travel_gate();
    if state.zone_fully_completed() {
        state.prestige.highest_zone_fully_completed = state
            .prestige
            .highest_zone_fully_completed
            .max(state.current_zone);
    }
    if def.kind == TaskKind::Travel
        && state
            .task_state(id)
            .is_some_and(|task| task.reps >= def.max_reps)
    {
        advance_zone(state);
        outcome.zone_advanced = true;
    }
}

/// One-shot charges bind when a rep starts and are spent regardless of
/// whether the rep ultimately helps.
fn arm_charges(state: &mut GameState, def: &TaskDefinition) {
    if !state
        .task_state(&def.id)
        .is_some_and(|task| task.progress == 0.0)
    {
        return;
    }
    let arm_haste = state.queued_scrolls_of_haste > 0;
    let arm_ring = state.queued_magic_rings > 0;
    let arm_lightning = def.kind == TaskKind::Boss && state.queued_lightning > 0;
    if !(arm_haste || arm_ring || arm_lightning) {
        return;
    }
    state.queued_scrolls_of_haste -= u32::from(arm_haste);
    state.queued_magic_rings -= u32::from(arm_ring);
    state.queued_lightning -= u32::from(arm_lightning);
    if let Some(task) = state.task_state_mut(&def.id) {
        task.hasted = arm_haste;
        task.ringed = arm_ring;
        task.lightning = arm_lightning;
    }
}

/// Resolve the speed multiplier one tick of `def` runs at.
#[must_use]
pub fn speed_breakdown(
    state: &GameState,
    cfg: &EngineConfig,
    def: &TaskDefinition,
    hasted: bool,
    lightning: bool,
) -> SpeedBreakdown {
    let level_product: f64 = def
        .skills
        .iter()
        .map(|skill| level_factor(state.skill(*skill).level))
        .product();
    // Multi-skill tasks take the geometric mean so stacking skills
    // never beats a dedicated one.
    let level_root = match def.skills.len() {
        0 | 1 => level_product,
        2 => level_product.sqrt(),
        _ => level_product.cbrt(),
    };

    let mut flat: f64 = def
        .skills
        .iter()
        .map(|skill| state.skill(*skill).speed_modifier)
        .sum();
    if def.skills.iter().any(|skill| skill.is_empowered()) {
        flat += state.power_speed_bonus();
    }
    if def.skills.iter().any(|skill| skill.is_attunement()) {
        flat += state.attunement_speed_bonus();
    }

    let mut multiplier =
        (level_root + flat) * speed_product(state.perks_owned.iter().copied(), &def.skills);
    let fast = state.prestige.repeatable_level(PrestigeRepeatable::GottaGoFast);
    multiplier *= GOTTA_GO_FAST_BASE.powf(f64::from(fast));
    multiplier *= (1.0 + UNIFIED_THEORY_EFFECT).powf(unified_theory_exponent(state));
    if hasted {
        multiplier *= HASTE_PROGRESS_MULT;
    }
    if lightning && def.kind == TaskKind::Boss {
        multiplier *= LIGHTNING_BOSS_MULT;
    }

    let instant_unaided = cfg.progress_per_tick * multiplier >= def.base_cost;
    let compression_applied = !instant_unaided && state.has_perk(PerkType::MajorTimeCompression);
    if compression_applied {
        multiplier *= MAJOR_COMPRESSION_SPEED;
    }
    let instant = cfg.progress_per_tick * multiplier >= def.base_cost;
    SpeedBreakdown {
        multiplier,
        instant,
        compression_applied,
    }
}

/// Projected ticks and energy for `reps` repetitions of a task at the
/// current multipliers. One-shot charges and mid-run level-ups are not
/// modeled.
#[must_use]
pub fn completion_estimate(
    state: &GameState,
    cfg: &EngineConfig,
    def: &TaskDefinition,
    reps: u32,
) -> CompletionEstimate {
    let speed = speed_breakdown(state, cfg, def, false, false);
    let per_tick = cfg.progress_per_tick * speed.multiplier;
    let ticks_per_rep = ceil_f64_to_u64(def.base_cost / per_tick).max(1);
    let ticks = ticks_per_rep.saturating_mul(u64::from(reps));
    let energy = energy::drain_per_tick(state, cfg, def, speed.instant) * u64_to_f64(ticks);
    CompletionEstimate { ticks, energy }
}

/// XP multiplier shared by every skill a completed rep trains.
#[must_use]
pub fn global_xp_mult(state: &GameState, ringed: bool) -> f64 {
    let knowledge = f64::from(
        state
            .prestige
            .repeatable_level(PrestigeRepeatable::KnowledgeBoost),
    );
    let mut mult = 1.0 + knowledge * KNOWLEDGE_BOOST_XP_PER_LEVEL;
    if state.has_perk(PerkType::Writing) {
        mult += WRITING_XP_BONUS;
    }
    if state.has_perk(PerkType::GazedBeyondTheVeil) {
        mult += VEIL_XP_BONUS;
    }
    if ringed {
        mult *= MAGIC_RING_XP_MULT;
    }
    if state.harrow.penalty_active(HarrowCard::Frost) {
        mult *= FROST_XP_FACTOR;
    }
    mult
}

pub(crate) fn complete_rep(
    state: &mut GameState,
    cfg: &EngineConfig,
    def: &TaskDefinition,
    outcome: &mut TickOutcome,
) {
    let ringed = state
        .task_state(&def.id)
        .is_some_and(|task| task.ringed);
    let (reps_done, fully) = {
        let Some(task) = state.task_state_mut(&def.id) else {
            return;
        };
        task.reps = task.reps.saturating_add(1).min(def.max_reps);
        task.progress = 0.0;
        task.clear_charges();
        (task.reps, task.reps >= def.max_reps)
    };

    grant_task_xp(state, cfg, def, ringed);
    if let Some(item) = def.item {
        state.add_item(item, 1);
    }
    if fully && let Some(perk) = def.perk {
        state.own_perk(perk);
    }
    if def.power_gain > 0 {
        let boost = f64::from(
            state
                .prestige
                .repeatable_level(PrestigeRepeatable::UnlimitedPower),
        );
        let gain = floor_f64_to_u32(f64::from(def.power_gain) * UNLIMITED_POWER_BASE.powf(boost));
        state.power = state.power.saturating_add(gain);
        if !state.has_unlocked_power {
            state.has_unlocked_power = true;
            state.logs.push(String::from(LOG_POWER_UNLOCKED));
            state.events.push(state.tick, EventKind::UnlockedPower);
        }
    }
    if def.attunement_gain > 0 {
        state.attunement = state.attunement.saturating_add(def.attunement_gain);
    }
    state.events.push(
        state.tick,
        EventKind::TaskCompleted {
            task: def.id.clone(),
            reps_done,
        },
    );
    if def.kind == TaskKind::Prestige && !state.prestige_available {
        state.prestige_available = true;
        state.events.push(state.tick, EventKind::PrestigeAvailable);
    }
    outcome.reps_completed += 1;

    if fully && let Some(task) = state.task_state_mut(&def.id) {
        task.enabled = false;
    }
    if (fully || !state.repeat_tasks) && state.active_task.as_deref() == Some(def.id.as_str()) {
        state.active_task = None;
    }
}

fn grant_task_xp(state: &mut GameState, cfg: &EngineConfig, def: &TaskDefinition, ringed: bool) {
    if def.skills.is_empty() {
        return;
    }
    #[allow(clippy::cast_precision_loss)]
    let share = def.skills.len() as f64;
    let per_skill = def.base_cost * def.xp_mult * global_xp_mult(state, ringed) / share;
    let shackled = state.harrow.penalty_active(HarrowCard::Shackled);
    for skill_type in def.skills.iter().copied() {
        let cap = shackled.then(|| shackled_cap(&state.skills, skill_type));
        let levels = grant_xp(state.skill_mut(skill_type), per_skill, cfg.xp_base_cost, cap);
        if levels > 0 {
            let new_level = state.skill(skill_type).level;
            state.events.push(
                state.tick,
                EventKind::SkillUp {
                    skill: skill_type,
                    levels_gained: levels,
                    new_level,
                },
            );
        }
    }
}

pub(crate) fn advance_zone(state: &mut GameState) {
    if state.harrow.penalty_active(HarrowCard::Eclipse) {
        state.energy.current *= 1.0 - ECLIPSE_ZONE_ADVANCE_COST;
    }
    state.current_zone += 1;
    if state.current_zone as usize >= zone_catalog().len() {
        state.is_at_end_of_content = true;
        state.active_task = None;
        state.tasks.clear();
        state.logs.push(String::from(LOG_END_OF_CONTENT));
        state.events.push(state.tick, EventKind::EndOfContent);
        return;
    }
    state.prestige.highest_zone = state.prestige.highest_zone.max(state.current_zone);
    state.enter_zone(true);
    state.logs.push(String::from(LOG_ZONE_ADVANCED));
    state.events.push(
        state.tick,
        EventKind::ZoneAdvanced {
            zone: state.zone_display_number(),
        },
    );
}
