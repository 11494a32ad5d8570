//! Centralized balance and tuning constants for Everspire game logic.
//!
//! These values define the deterministic math for the core simulation.
//! Keeping them together ensures that gameplay can only be adjusted via
//! code changes reviewed in version control, rather than through external
//! JSON assets.

// Logging keys -------------------------------------------------------------
pub(crate) const DEBUG_ENV_VAR: &str = "EVERSPIRE_DEBUG_LOGS";
pub(crate) const LOG_ENERGY_DEPLETED: &str = "log.energy.depleted";
pub(crate) const LOG_ENERGY_RESET: &str = "log.reset.energy";
pub(crate) const LOG_PRESTIGE: &str = "log.reset.prestige";
pub(crate) const LOG_ZONE_ADVANCED: &str = "log.zone.advanced";
pub(crate) const LOG_END_OF_CONTENT: &str = "log.zone.end-of-content";
pub(crate) const LOG_POWER_UNLOCKED: &str = "log.power.unlocked";
pub(crate) const LOG_HARROW_UNLOCKED: &str = "log.harrow.unlocked";
pub(crate) const LOG_FAST_FORWARD: &str = "log.reset.fast-forward";
pub(crate) const LOG_AUTOMATION_SKIP: &str = "log.automation.skip";

// Skill & XP tuning --------------------------------------------------------
pub(crate) const XP_NEEDED_GROWTH: f64 = 1.02;
pub(crate) const SKILL_SPEED_PER_LEVEL: f64 = 1.01;
pub(crate) const WRITING_XP_BONUS: f64 = 0.5;
pub(crate) const VEIL_XP_BONUS: f64 = 1.0;
pub(crate) const MAGIC_RING_XP_MULT: f64 = 5.0;
pub(crate) const KNOWLEDGE_BOOST_XP_PER_LEVEL: f64 = 0.5;

// Task speed tuning --------------------------------------------------------
pub(crate) const HASTE_PROGRESS_MULT: f64 = 5.0;
pub(crate) const LIGHTNING_BOSS_MULT: f64 = 2.0;
pub(crate) const MAJOR_COMPRESSION_SPEED: f64 = 1.5;
pub(crate) const UNIFIED_THEORY_EFFECT: f64 = 0.05;
pub(crate) const GOTTA_GO_FAST_BASE: f64 = 1.05;
pub(crate) const POWER_SPEED_DIVISOR: f64 = 100.0;
pub(crate) const ATTUNEMENT_SPEED_DIVISOR: f64 = 1000.0;
pub(crate) const UNLIMITED_POWER_BASE: f64 = 2.0;

// Energy tuning ------------------------------------------------------------
pub(crate) const INSTANT_DRAIN_FACTOR: f64 = 0.2;
pub(crate) const HIGH_ALTITUDE_DRAIN_FACTOR: f64 = 0.8;
pub(crate) const REFLECTIONS_BASE: f64 = 0.95;
pub(crate) const REFLECTIONS_BOOSTED_BASE: f64 = 0.90;
pub(crate) const ENERGETIC_SPELL_BONUS: f64 = 50.0;
pub(crate) const ENERGETIC_MEMORY_ZONE_DIVISOR: f64 = 10.0;
pub(crate) const GOURMET_ENERGY_PER_LEVEL: f64 = 1.0;
/// Energy at or below this is treated as fully drained.
pub(crate) const ENERGY_EPSILON: f64 = 1e-9;

// Reset tuning -------------------------------------------------------------
pub(crate) const RESET_ITEM_DIVISOR: f64 = 2.0;
pub(crate) const GRAVE_ITEM_DIVISOR: f64 = 4.0;

// Prestige tuning ----------------------------------------------------------
pub(crate) const AWAKENING_SPARK_BONUS: f64 = 0.5;
pub(crate) const DEFIED_SPARK_BONUS: f64 = 1.0;
pub(crate) const REPEATABLE_COST_SCALING: f64 = 1.5;
pub(crate) const DIVINE_INSIGHT_STEP: f64 = 0.1;
pub(crate) const COMPLETIONISM_STEP: f64 = 0.25;

// Harrow tuning ------------------------------------------------------------
pub(crate) const HARROW_UNLOCK_PRESTIGE_COUNT: u32 = 5;
pub(crate) const HARROW_SPARK_BONUS_PER_CARD: f64 = 0.25;
pub(crate) const ECLIPSE_ZONE_ADVANCE_COST: f64 = 0.10;
pub(crate) const SERPENT_BOSS_DRAIN_MULT: f64 = 2.0;
pub(crate) const HOURGLASS_DRAIN_MULT: f64 = 3.0;
pub(crate) const REAPER_OVERCHARGE_MULT: f64 = 2.0;
pub(crate) const TEMPEST_MIN_DRAIN: f64 = 10.0;
pub(crate) const BRITTLE_FOOD_FACTOR: f64 = 0.5;
pub(crate) const FROST_XP_FACTOR: f64 = 0.2;
pub(crate) const SHACKLED_CAP_FACTOR: f64 = 1.1;

#[cfg(test)]
pub(crate) const FLOAT_EPSILON: f64 = 1e-9;
