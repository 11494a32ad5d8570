//! Simulation engine: tunable configuration, the tick algorithm, and the
//! session wrapper that binds a config to a running state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::perk::PerkType;
use crate::prestige::PrestigeUnlock;
use crate::state::GameState;

pub mod session;
pub mod tick;

pub use session::{GameSession, TickTotals};
pub use tick::{
    CompletionEstimate, SpeedBreakdown, TickOutcome, advance, completion_estimate, global_xp_mult,
    speed_breakdown,
};

/// Tunable engine parameters. Content never overrides these; drivers may,
/// via [`EngineConfigOverlay`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Base XP requirement for level 1, before per-skill multipliers.
    #[serde(default = "EngineConfig::default_xp_base_cost")]
    pub xp_base_cost: f64,
    #[serde(default = "EngineConfig::default_progress_per_tick")]
    pub progress_per_tick: f64,
    #[serde(default = "EngineConfig::default_base_drain_per_tick")]
    pub base_drain_per_tick: f64,
    /// Max energy a fresh prestige run starts with.
    #[serde(default = "EngineConfig::default_base_max_energy")]
    pub base_max_energy: f64,
    #[serde(default = "EngineConfig::default_base_tick_interval_ms")]
    pub base_tick_interval_ms: u32,
    /// Interval speedup per point of max energy above base, for the Divine
    /// Speed unlock.
    #[serde(default = "EngineConfig::default_divine_speed_per_unit")]
    pub divine_speed_per_unit: f64,
    #[serde(default)]
    pub spark: SparkConfig,
}

impl EngineConfig {
    #[must_use]
    pub const fn default_xp_base_cost() -> f64 {
        10.0
    }

    #[must_use]
    pub const fn default_progress_per_tick() -> f64 {
        1.0
    }

    #[must_use]
    pub const fn default_base_drain_per_tick() -> f64 {
        1.0
    }

    #[must_use]
    pub const fn default_base_max_energy() -> f64 {
        100.0
    }

    #[must_use]
    pub const fn default_base_tick_interval_ms() -> u32 {
        100
    }

    #[must_use]
    pub const fn default_divine_speed_per_unit() -> f64 {
        0.01
    }

    /// Validate configuration invariants before sanitization.
    ///
    /// # Errors
    ///
    /// Returns `EngineConfigError` when any field violates the documented
    /// bounds.
    pub fn validate(&self) -> Result<(), EngineConfigError> {
        if self.xp_base_cost < 1.0 {
            return Err(EngineConfigError::MinViolation {
                field: "xp_base_cost",
                min: 1.0,
                value: self.xp_base_cost,
            });
        }
        if !(0.01..=1_000.0).contains(&self.progress_per_tick) {
            return Err(EngineConfigError::RangeViolation {
                field: "progress_per_tick",
                min: 0.01,
                max: 1_000.0,
                value: self.progress_per_tick,
            });
        }
        if !(0.0..=1_000.0).contains(&self.base_drain_per_tick) {
            return Err(EngineConfigError::RangeViolation {
                field: "base_drain_per_tick",
                min: 0.0,
                max: 1_000.0,
                value: self.base_drain_per_tick,
            });
        }
        if !(1.0..=1_000_000.0).contains(&self.base_max_energy) {
            return Err(EngineConfigError::RangeViolation {
                field: "base_max_energy",
                min: 1.0,
                max: 1_000_000.0,
                value: self.base_max_energy,
            });
        }
        if !(10..=10_000).contains(&self.base_tick_interval_ms) {
            return Err(EngineConfigError::TickIntervalRange {
                min: 10,
                max: 10_000,
                value: self.base_tick_interval_ms,
            });
        }
        if !(0.0..=1.0).contains(&self.divine_speed_per_unit) {
            return Err(EngineConfigError::RangeViolation {
                field: "divine_speed_per_unit",
                min: 0.0,
                max: 1.0,
                value: self.divine_speed_per_unit,
            });
        }
        self.spark.validate()
    }

    /// Clamp every field into its documented range.
    pub fn sanitize(&mut self) {
        self.xp_base_cost = self.xp_base_cost.max(1.0);
        self.progress_per_tick = self.progress_per_tick.clamp(0.01, 1_000.0);
        self.base_drain_per_tick = self.base_drain_per_tick.clamp(0.0, 1_000.0);
        self.base_max_energy = self.base_max_energy.clamp(1.0, 1_000_000.0);
        self.base_tick_interval_ms = self.base_tick_interval_ms.clamp(10, 10_000);
        self.divine_speed_per_unit = self.divine_speed_per_unit.clamp(0.0, 1.0);
        self.spark.sanitize();
    }

    /// Produce a copy with overlay values replacing the corresponding
    /// fields.
    #[must_use]
    pub fn with_overlay(&self, overlay: &EngineConfigOverlay) -> Self {
        Self {
            xp_base_cost: overlay.xp_base_cost.unwrap_or(self.xp_base_cost),
            progress_per_tick: overlay.progress_per_tick.unwrap_or(self.progress_per_tick),
            base_drain_per_tick: overlay
                .base_drain_per_tick
                .unwrap_or(self.base_drain_per_tick),
            base_max_energy: overlay.base_max_energy.unwrap_or(self.base_max_energy),
            base_tick_interval_ms: overlay
                .base_tick_interval_ms
                .unwrap_or(self.base_tick_interval_ms),
            divine_speed_per_unit: overlay
                .divine_speed_per_unit
                .unwrap_or(self.divine_speed_per_unit),
            spark: self.spark.with_overlay(&overlay.spark),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            xp_base_cost: Self::default_xp_base_cost(),
            progress_per_tick: Self::default_progress_per_tick(),
            base_drain_per_tick: Self::default_base_drain_per_tick(),
            base_max_energy: Self::default_base_max_energy(),
            base_tick_interval_ms: Self::default_base_tick_interval_ms(),
            divine_speed_per_unit: Self::default_divine_speed_per_unit(),
            spark: SparkConfig::default(),
        }
    }
}

/// Divine spark gain tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparkConfig {
    #[serde(default = "SparkConfig::default_base_exponent")]
    pub base_exponent: f64,
    #[serde(default = "SparkConfig::default_base_weight")]
    pub base_weight: f64,
    #[serde(default = "SparkConfig::default_divisor_base")]
    pub divisor_base: f64,
}

impl SparkConfig {
    #[must_use]
    pub const fn default_base_exponent() -> f64 {
        2.0
    }

    #[must_use]
    pub const fn default_base_weight() -> f64 {
        0.5
    }

    #[must_use]
    pub const fn default_divisor_base() -> f64 {
        1.05
    }

    fn validate(&self) -> Result<(), EngineConfigError> {
        if !(1.0..=10.0).contains(&self.base_exponent) {
            return Err(EngineConfigError::RangeViolation {
                field: "spark.base_exponent",
                min: 1.0,
                max: 10.0,
                value: self.base_exponent,
            });
        }
        if !(0.0..=10.0).contains(&self.base_weight) {
            return Err(EngineConfigError::RangeViolation {
                field: "spark.base_weight",
                min: 0.0,
                max: 10.0,
                value: self.base_weight,
            });
        }
        if self.divisor_base < 1.0 {
            return Err(EngineConfigError::MinViolation {
                field: "spark.divisor_base",
                min: 1.0,
                value: self.divisor_base,
            });
        }
        Ok(())
    }

    fn sanitize(&mut self) {
        self.base_exponent = self.base_exponent.clamp(1.0, 10.0);
        self.base_weight = self.base_weight.clamp(0.0, 10.0);
        self.divisor_base = self.divisor_base.max(1.0);
    }

    #[must_use]
    fn with_overlay(&self, overlay: &SparkConfigOverlay) -> Self {
        Self {
            base_exponent: overlay.base_exponent.unwrap_or(self.base_exponent),
            base_weight: overlay.base_weight.unwrap_or(self.base_weight),
            divisor_base: overlay.divisor_base.unwrap_or(self.divisor_base),
        }
    }
}

impl Default for SparkConfig {
    fn default() -> Self {
        Self {
            base_exponent: Self::default_base_exponent(),
            base_weight: Self::default_base_weight(),
            divisor_base: Self::default_divisor_base(),
        }
    }
}

/// Partial configuration; `None` keeps the base value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfigOverlay {
    #[serde(default)]
    pub xp_base_cost: Option<f64>,
    #[serde(default)]
    pub progress_per_tick: Option<f64>,
    #[serde(default)]
    pub base_drain_per_tick: Option<f64>,
    #[serde(default)]
    pub base_max_energy: Option<f64>,
    #[serde(default)]
    pub base_tick_interval_ms: Option<u32>,
    #[serde(default)]
    pub divine_speed_per_unit: Option<f64>,
    #[serde(default)]
    pub spark: SparkConfigOverlay,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparkConfigOverlay {
    #[serde(default)]
    pub base_exponent: Option<f64>,
    #[serde(default)]
    pub base_weight: Option<f64>,
    #[serde(default)]
    pub divisor_base: Option<f64>,
}

/// Errors raised when engine configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum EngineConfigError {
    #[error("{field} must be at least {min:.2} (got {value:.2})")]
    MinViolation {
        field: &'static str,
        min: f64,
        value: f64,
    },
    #[error("{field} must be between {min:.2} and {max:.2} (got {value:.2})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("tick interval must be between {min} ms and {max} ms (got {value})")]
    TickIntervalRange { min: u32, max: u32, value: u32 },
}

/// Driver cadence in milliseconds. Divine Speed shortens it as max energy
/// grows past the base; scheduling only, tick semantics are untouched.
#[must_use]
pub fn tick_interval_ms(state: &GameState, cfg: &EngineConfig) -> u32 {
    let base = f64::from(cfg.base_tick_interval_ms);
    if !state.prestige.owns(PrestigeUnlock::DivineSpeed) {
        return cfg.base_tick_interval_ms;
    }
    let headroom = (state.energy.max - cfg.base_max_energy).max(0.0);
    let divisor = 1.0 + headroom * cfg.divine_speed_per_unit;
    crate::numbers::ceil_f64_to_u32(base / divisor).max(1)
}

/// Pure helper for render layers: highest zone the Unified Theory bonus is
/// scaled by, shared with the tick path.
#[must_use]
pub fn unified_theory_exponent(state: &GameState) -> f64 {
    if state.has_perk(PerkType::UnifiedTheoryOfMagic) {
        f64::from(state.prestige.highest_zone_fully_completed + 1)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FLOAT_EPSILON;

    #[test]
    fn default_config_is_valid() {
        let cfg = EngineConfig::default();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_flags_bad_interval() {
        let cfg = EngineConfig {
            base_tick_interval_ms: 5,
            ..EngineConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(EngineConfigError::TickIntervalRange {
                min: 10,
                max: 10_000,
                value: 5
            })
        );
    }

    #[test]
    fn sanitize_clamps_out_of_range_fields() {
        let mut cfg = EngineConfig {
            progress_per_tick: -3.0,
            base_tick_interval_ms: 0,
            ..EngineConfig::default()
        };
        cfg.sanitize();
        assert!((cfg.progress_per_tick - 0.01).abs() < FLOAT_EPSILON);
        assert_eq!(cfg.base_tick_interval_ms, 10);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn overlay_replaces_only_set_fields() {
        let base = EngineConfig::default();
        let overlay = EngineConfigOverlay {
            progress_per_tick: Some(4.0),
            spark: SparkConfigOverlay {
                base_weight: Some(0.0),
                ..SparkConfigOverlay::default()
            },
            ..EngineConfigOverlay::default()
        };
        let merged = base.with_overlay(&overlay);
        assert!((merged.progress_per_tick - 4.0).abs() < FLOAT_EPSILON);
        assert!(merged.spark.base_weight.abs() < FLOAT_EPSILON);
        assert!((merged.xp_base_cost - base.xp_base_cost).abs() < FLOAT_EPSILON);
        assert!((merged.spark.base_exponent - base.spark.base_exponent).abs() < FLOAT_EPSILON);
    }

    #[test]
    fn divine_speed_shortens_interval_above_base_energy() {
        let cfg = EngineConfig::default();
        let mut state = GameState::new_game(1);
        state.energy.max = 200.0;
        assert_eq!(tick_interval_ms(&state, &cfg), 100);

        state
            .prestige
            .owned_unlocks
            .insert(PrestigeUnlock::DivineSpeed);
        assert_eq!(tick_interval_ms(&state, &cfg), 50);

        state.energy.max = 50.0;
        assert_eq!(tick_interval_ms(&state, &cfg), 100);
    }
}
