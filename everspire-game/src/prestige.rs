//! Prestige: divine spark gain, the hard reset, and the persistent shop.

use serde::{Deserialize, Serialize};

use crate::constants::{
    AWAKENING_SPARK_BONUS, COMPLETIONISM_STEP, DEFIED_SPARK_BONUS, DIVINE_INSIGHT_STEP,
    HARROW_SPARK_BONUS_PER_CARD, HARROW_UNLOCK_PRESTIGE_COUNT, LOG_HARROW_UNLOCKED, LOG_PRESTIGE,
    REPEATABLE_COST_SCALING,
};
use crate::engine::EngineConfig;
use crate::event::EventKind;
use crate::perk::PerkType;
use crate::state::GameState;

/// One-time purchases that survive every reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PrestigeUnlock {
    PermanentAutomation,
    TranscendantMemory,
    LookInTheMirror,
    DivineSpeed,
}

impl PrestigeUnlock {
    pub const ALL: [Self; 4] = [
        Self::PermanentAutomation,
        Self::TranscendantMemory,
        Self::LookInTheMirror,
        Self::DivineSpeed,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::PermanentAutomation => "Permanent Automation",
            Self::TranscendantMemory => "Transcendant Memory",
            Self::LookInTheMirror => "Look in the Mirror",
            Self::DivineSpeed => "Divine Speed",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::PermanentAutomation => "Task automation and item auto-use are always unlocked",
            Self::TranscendantMemory => "Energetic Memory gains are squared past zone 10",
            Self::LookInTheMirror => "Improves the Reflections on the Journey discount",
            Self::DivineSpeed => "Ticks run faster while max energy exceeds its base",
        }
    }

    #[must_use]
    pub const fn cost(self) -> f64 {
        match self {
            Self::PermanentAutomation => 100.0,
            Self::TranscendantMemory => 2_500.0,
            Self::LookInTheMirror => 1_000.0,
            Self::DivineSpeed => 10_000.0,
        }
    }
}

impl std::fmt::Display for PrestigeUnlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Repeatable purchases whose cost compounds per level bought.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PrestigeRepeatable {
    KnowledgeBoost,
    UnlimitedPower,
    Gourmet,
    GottaGoFast,
    DivineInsight,
    Completionism,
}

impl PrestigeRepeatable {
    pub const ALL: [Self; 6] = [
        Self::KnowledgeBoost,
        Self::UnlimitedPower,
        Self::Gourmet,
        Self::GottaGoFast,
        Self::DivineInsight,
        Self::Completionism,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::KnowledgeBoost => "Knowledge Boost",
            Self::UnlimitedPower => "Unlimited Power",
            Self::Gourmet => "Gourmet",
            Self::GottaGoFast => "Gotta Go Fast",
            Self::DivineInsight => "Divine Insight",
            Self::Completionism => "Completionism",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::KnowledgeBoost => "+50% XP gain per level",
            Self::UnlimitedPower => "Power gains are doubled per level",
            Self::Gourmet => "+1 energy from food items per level",
            Self::GottaGoFast => "+5% task speed per level, compounding",
            Self::DivineInsight => "+0.1 spark gain exponent per level",
            Self::Completionism => "+0.25 full-completion spark weight per level",
        }
    }

    #[must_use]
    pub const fn initial_cost(self) -> f64 {
        match self {
            Self::KnowledgeBoost => 50.0,
            Self::UnlimitedPower => 200.0,
            Self::Gourmet => 75.0,
            Self::GottaGoFast => 100.0,
            Self::DivineInsight => 500.0,
            Self::Completionism => 400.0,
        }
    }
}

impl std::fmt::Display for PrestigeRepeatable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Spark cost of the next level of a repeatable.
#[must_use]
pub fn repeatable_cost(repeatable: PrestigeRepeatable, level: u32) -> f64 {
    repeatable.initial_cost() * REPEATABLE_COST_SCALING.powf(f64::from(level))
}

/// Zones are stored zero-based but scored by their displayed number.
fn display(zone: u32) -> f64 {
    f64::from(zone + 1)
}

/// Spark exponent at action time, including Divine Insight levels.
#[must_use]
pub fn spark_exponent(state: &GameState, cfg: &EngineConfig) -> f64 {
    let insight = state
        .prestige
        .repeatable_level(PrestigeRepeatable::DivineInsight);
    cfg.spark.base_exponent + DIVINE_INSIGHT_STEP * f64::from(insight)
}

/// Weight of the fully-completed metric, including Completionism levels.
#[must_use]
pub fn spark_weight(state: &GameState, cfg: &EngineConfig) -> f64 {
    let completionism = state
        .prestige
        .repeatable_level(PrestigeRepeatable::Completionism);
    cfg.spark.base_weight + COMPLETIONISM_STEP * f64::from(completionism)
}

/// Every repeatable level bought so far raises the gain divisor.
#[must_use]
pub fn spark_divisor(state: &GameState, cfg: &EngineConfig) -> f64 {
    cfg.spark
        .divisor_base
        .powf(f64::from(state.prestige.total_repeatable_levels()))
}

/// Spark earned for the highest zone reached, before run bonuses.
#[must_use]
pub fn spark_gain_from_highest_zone(state: &GameState, cfg: &EngineConfig, zone: u32) -> f64 {
    display(zone).powf(spark_exponent(state, cfg)) / spark_divisor(state, cfg)
}

/// Spark earned for the highest zone fully completed, before run bonuses.
#[must_use]
pub fn spark_gain_from_fully_completed(state: &GameState, cfg: &EngineConfig, zone: u32) -> f64 {
    spark_weight(state, cfg) * display(zone).powf(spark_exponent(state, cfg))
        / spark_divisor(state, cfg)
}

/// Multiplier from Awakening, Defied the Gods, and active Harrow cards.
#[must_use]
pub fn spark_bonus_mult(state: &GameState) -> f64 {
    let mut mult = 1.0;
    if state.has_perk(PerkType::Awakening) {
        mult *= 1.0 + AWAKENING_SPARK_BONUS;
    }
    if state.has_perk(PerkType::DefiedTheGods) {
        mult *= 1.0 + DEFIED_SPARK_BONUS;
    }
    mult * (1.0 + HARROW_SPARK_BONUS_PER_CARD).powf(f64::from(state.harrow.bonus_card_count()))
}

/// Total spark a prestige would grant right now.
#[must_use]
pub fn spark_gain(state: &GameState, cfg: &EngineConfig) -> f64 {
    let base = spark_gain_from_highest_zone(state, cfg, state.prestige.highest_zone)
        + spark_gain_from_fully_completed(
            state,
            cfg,
            state.prestige.highest_zone_fully_completed,
        );
    base * spark_bonus_mult(state)
}

/// Buy a one-time unlock. Refused when already owned or unaffordable.
pub fn add_unlock(state: &mut GameState, unlock: PrestigeUnlock) -> bool {
    if state.prestige.owns(unlock) || state.prestige.divine_spark < unlock.cost() {
        return false;
    }
    state.prestige.divine_spark -= unlock.cost();
    state.prestige.owned_unlocks.insert(unlock);
    true
}

/// Buy the next level of a repeatable. Refused when unaffordable.
pub fn raise_repeatable(state: &mut GameState, repeatable: PrestigeRepeatable) -> bool {
    let level = state.prestige.repeatable_level(repeatable);
    let cost = repeatable_cost(repeatable, level);
    if state.prestige.divine_spark < cost {
        return false;
    }
    state.prestige.divine_spark -= cost;
    state
        .prestige
        .repeatable_levels
        .insert(repeatable, level + 1);
    true
}

/// Bank spark and hard-reset the run. Gated on the prestige task.
pub fn do_prestige(state: &mut GameState, cfg: &EngineConfig) -> bool {
    if !state.prestige_available {
        return false;
    }
    // Gain is computed before anything resets; it reads perks and cards.
    let gain = spark_gain(state, cfg);
    state.prestige.divine_spark += gain;
    state.prestige.prestige_count += 1;

    for skill in &mut state.skills {
        skill.level = 0;
        skill.progress = 0.0;
        skill.speed_modifier = 0.0;
    }
    state.unlocked_skills.clear();
    state.perks_owned.clear();
    state.items.clear();
    state.items_found_this_energy_reset.clear();
    state.queued_scrolls_of_haste = 0;
    state.queued_magic_rings = 0;
    state.queued_lightning = 0;
    state.power = 0;
    state.has_unlocked_power = false;
    state.attunement = 0;
    state.energy.max = cfg.base_max_energy;
    state.energy.current = state.energy.max;
    state.prestige_available = false;
    state.is_at_end_of_content = false;
    state.is_in_energy_reset = false;
    state.energy_reset_info = None;

    // Actives carry over and stay toggleable until the new run starts.
    state.harrow.forfeited.clear();
    state.harrow.fool_selection = None;
    state.harrow.run_started = false;

    state.current_zone = 0;
    state.enter_zone(false);
    state.capture_run_baseline();

    state.logs.push(String::from(LOG_PRESTIGE));
    state.events.push(state.tick, EventKind::PrestigeApplied);
    if state.prestige.prestige_count == HARROW_UNLOCK_PRESTIGE_COUNT {
        state.logs.push(String::from(LOG_HARROW_UNLOCKED));
        state.events.push(state.tick, EventKind::HarrowUnlocked);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FLOAT_EPSILON;
    use crate::engine::SparkConfig;
    use crate::harrow::HarrowCard;
    use crate::item::ItemType;
    use crate::skill::SkillType;

    fn weightless_cfg() -> EngineConfig {
        EngineConfig {
            spark: SparkConfig {
                base_weight: 0.0,
                ..SparkConfig::default()
            },
            ..EngineConfig::default()
        }
    }

    #[test]
    fn repeatable_cost_compounds_per_level() {
        assert!(
            (repeatable_cost(PrestigeRepeatable::KnowledgeBoost, 0) - 50.0).abs() < FLOAT_EPSILON
        );
        assert!(
            (repeatable_cost(PrestigeRepeatable::KnowledgeBoost, 2) - 112.5).abs() < FLOAT_EPSILON
        );
    }

    #[test]
    fn spark_gain_squares_the_displayed_zone() {
        let mut state = GameState::new_game(1);
        state.prestige.highest_zone = 14;
        let gain = spark_gain(&state, &weightless_cfg());
        assert!((gain - 225.0).abs() < FLOAT_EPSILON);
    }

    #[test]
    fn spark_weight_counts_fully_completed_zones() {
        let mut state = GameState::new_game(1);
        state.prestige.highest_zone = 14;
        state.prestige.highest_zone_fully_completed = 9;
        let gain = spark_gain(&state, &EngineConfig::default());
        // 15^2 + 0.5 * 10^2
        assert!((gain - 275.0).abs() < FLOAT_EPSILON);
    }

    #[test]
    fn divisor_counts_every_repeatable_level() {
        let mut state = GameState::new_game(1);
        state
            .prestige
            .repeatable_levels
            .insert(PrestigeRepeatable::Gourmet, 2);
        state
            .prestige
            .repeatable_levels
            .insert(PrestigeRepeatable::UnlimitedPower, 1);
        let divisor = spark_divisor(&state, &EngineConfig::default());
        assert!((divisor - 1.05_f64.powi(3)).abs() < FLOAT_EPSILON);
    }

    #[test]
    fn insight_and_completionism_shift_the_formula() {
        let mut state = GameState::new_game(1);
        let cfg = EngineConfig::default();
        state
            .prestige
            .repeatable_levels
            .insert(PrestigeRepeatable::DivineInsight, 3);
        state
            .prestige
            .repeatable_levels
            .insert(PrestigeRepeatable::Completionism, 2);
        assert!((spark_exponent(&state, &cfg) - 2.3).abs() < FLOAT_EPSILON);
        assert!((spark_weight(&state, &cfg) - 1.0).abs() < FLOAT_EPSILON);
    }

    #[test]
    fn spark_bonuses_multiply_together() {
        let mut state = GameState::new_game(1);
        state.perks_owned.insert(PerkType::Awakening);
        state.perks_owned.insert(PerkType::DefiedTheGods);
        state.harrow.active.insert(HarrowCard::Grave);
        state.harrow.active.insert(HarrowCard::Frost);
        let expected = 1.5 * 2.0 * 1.25_f64.powi(2);
        assert!((spark_bonus_mult(&state) - expected).abs() < FLOAT_EPSILON);
    }

    #[test]
    fn forfeited_cards_earn_no_bonus() {
        let mut state = GameState::new_game(1);
        state.harrow.active.insert(HarrowCard::Grave);
        state.harrow.active.insert(HarrowCard::Frost);
        state.harrow.forfeited.insert(HarrowCard::Frost);
        assert!((spark_bonus_mult(&state) - 1.25).abs() < FLOAT_EPSILON);
    }

    #[test]
    fn unlock_purchase_spends_spark_once() {
        let mut state = GameState::new_game(1);
        state.prestige.divine_spark = 150.0;
        assert!(add_unlock(&mut state, PrestigeUnlock::PermanentAutomation));
        assert!((state.prestige.divine_spark - 50.0).abs() < FLOAT_EPSILON);
        assert!(!add_unlock(&mut state, PrestigeUnlock::PermanentAutomation));
        assert!(!add_unlock(&mut state, PrestigeUnlock::DivineSpeed));
    }

    #[test]
    fn raising_a_repeatable_charges_the_level_price() {
        let mut state = GameState::new_game(1);
        state.prestige.divine_spark = 130.0;
        assert!(raise_repeatable(&mut state, PrestigeRepeatable::KnowledgeBoost));
        assert_eq!(
            state
                .prestige
                .repeatable_level(PrestigeRepeatable::KnowledgeBoost),
            1
        );
        // Level two costs 75 of the remaining 80; level three is out of reach.
        assert!(raise_repeatable(&mut state, PrestigeRepeatable::KnowledgeBoost));
        assert!(!raise_repeatable(&mut state, PrestigeRepeatable::KnowledgeBoost));
    }

    #[test]
    fn prestige_resets_the_run_and_keeps_the_meta_layer() {
        let mut state = GameState::new_game(1);
        state.prestige_available = true;
        state.prestige.highest_zone = 14;
        state.skill_mut(SkillType::Survival).level = 12;
        state.perks_owned.insert(PerkType::Writing);
        state.perks_known.insert(PerkType::Writing);
        state.items.insert(ItemType::Food, 9);
        state.power = 40;
        state.has_unlocked_power = true;
        state.attunement = 17;
        state.current_zone = 14;
        state.energy.max = 180.0;

        assert!(do_prestige(&mut state, &weightless_cfg()));
        assert!((state.prestige.divine_spark - 225.0).abs() < FLOAT_EPSILON);
        assert_eq!(state.prestige.prestige_count, 1);
        assert_eq!(state.skill(SkillType::Survival).level, 0);
        assert!(state.perks_owned.is_empty());
        assert!(state.perks_known.contains(&PerkType::Writing));
        assert!(state.items.is_empty());
        assert_eq!(state.power, 0);
        assert!(!state.has_unlocked_power);
        assert_eq!(state.attunement, 0);
        assert_eq!(state.current_zone, 0);
        assert!((state.energy.current - 100.0).abs() < FLOAT_EPSILON);
        assert_eq!(state.prestige.highest_zone, 14);
        assert!(!do_prestige(&mut state, &weightless_cfg()));
    }

    #[test]
    fn fifth_prestige_unlocks_the_harrow() {
        let mut state = GameState::new_game(1);
        state.prestige.prestige_count = 4;
        state.prestige_available = true;
        assert!(do_prestige(&mut state, &EngineConfig::default()));
        assert_eq!(state.prestige.prestige_count, 5);
        assert!(state.logs.iter().any(|line| line == LOG_HARROW_UNLOCKED));
        assert!(
            state
                .events
                .iter()
                .any(|event| event.kind == EventKind::HarrowUnlocked)
        );
    }
}
