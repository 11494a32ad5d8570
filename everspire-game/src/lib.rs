//! Everspire Game Engine
//!
//! Platform-agnostic core simulation for the Everspire incremental game.
//! This crate provides the tick engine, progression state, and meta-progression
//! lifecycle without UI or platform-specific dependencies.

pub mod actions;
pub mod automation;
mod constants;
pub mod content;
pub mod energy;
pub mod engine;
pub mod event;
pub mod harrow;
pub mod item;
pub mod modifier;
mod numbers;
pub mod perk;
pub mod prestige;
pub mod reset;
pub mod skill;
pub mod state;

// Re-export commonly used types
pub use actions::{
    add_prestige_unlock, click_item, click_task, do_energy_reset, do_prestige,
    increase_prestige_repeatable_level, purchase_harrow_card, set_automation_mode,
    toggle_auto_use_items, toggle_automation, toggle_harrow_card, toggle_repeat_tasks,
};
pub use automation::{AutomationMode, AutomationState};
pub use content::{ContentError, TaskDefinition, TaskKind, Zone, ZoneCatalog, zone_catalog};
pub use engine::{
    CompletionEstimate, EngineConfig, EngineConfigError, EngineConfigOverlay, GameSession,
    SparkConfig, SparkConfigOverlay, SpeedBreakdown, TickOutcome, TickTotals, advance,
    completion_estimate, global_xp_mult, speed_breakdown, tick_interval_ms,
    unified_theory_exponent,
};
pub use event::{Event, EventId, EventKind, EventQueue, EventSeverity, UiSurfaceHint};
pub use harrow::HarrowCard;
pub use item::{ItemDefinition, ItemEffect, ItemType};
pub use modifier::{SkillModifier, SkillModifierList};
pub use perk::{PerkDefinition, PerkType};
pub use prestige::{PrestigeRepeatable, PrestigeUnlock};
pub use skill::{Skill, SkillType};
pub use state::{
    EnergyPool, EnergyResetInfo, GameState, HarrowState, PrestigeProgress, RunBaseline, SaveError,
    SaveGame, TaskState,
};

/// Trait for abstracting save/load operations.
/// Platform-specific implementations should provide this.
pub trait GameStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save game state
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be saved.
    fn save_game(&self, save_name: &str, game_state: &GameState) -> Result<(), Self::Error>;

    /// Load game state
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be loaded.
    fn load_game(&self, save_name: &str) -> Result<Option<GameState>, Self::Error>;

    /// Delete saved game
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    fn delete_save(&self, save_name: &str) -> Result<(), Self::Error>;
}

/// Main entry point for managing game instances. Zone content ships
/// embedded in the crate and is validated the first time it is touched.
pub struct GameEngine<S>
where
    S: GameStorage,
{
    storage: S,
    config: EngineConfig,
}

impl<S> GameEngine<S>
where
    S: GameStorage,
{
    /// Create a new game engine with the provided storage backend.
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, EngineConfig::default())
    }

    /// Create a new game engine with custom tuning. Out-of-range config
    /// values are clamped.
    pub fn with_config(storage: S, mut config: EngineConfig) -> Self {
        config.sanitize();
        Self { storage, config }
    }

    /// Create a fresh game state for the given seed.
    #[must_use]
    pub fn create_game(&self, seed: u64) -> GameState {
        self.create_session(seed).into_state()
    }

    /// Construct a new session bound to this engine's tuning.
    #[must_use]
    pub fn create_session(&self, seed: u64) -> GameSession {
        GameSession::with_config(seed, self.config.clone())
    }

    /// Resume a saved state as a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be loaded.
    pub fn load_session(&self, save_name: &str) -> Result<Option<GameSession>, anyhow::Error>
    where
        S::Error: Into<anyhow::Error>,
    {
        Ok(self
            .load_game(save_name)?
            .map(|state| GameSession::from_state(state, self.config.clone())))
    }

    /// Save a game state
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be saved.
    pub fn save_game(&self, save_name: &str, game_state: &GameState) -> Result<(), S::Error> {
        self.storage.save_game(save_name, game_state)
    }

    /// Load a game state
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be loaded or rehydrated.
    pub fn load_game(&self, save_name: &str) -> Result<Option<GameState>, anyhow::Error>
    where
        S::Error: Into<anyhow::Error>,
    {
        if let Some(game_state) = self.storage.load_game(save_name).map_err(Into::into)? {
            // Rehydration rebuilds the RNG stream and heals stale references.
            Ok(Some(game_state.rehydrate()))
        } else {
            Ok(None)
        }
    }

    /// Delete a saved game
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    pub fn delete_save(&self, save_name: &str) -> Result<(), S::Error> {
        self.storage.delete_save(save_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::convert::Infallible;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct MemoryStorage {
        saves: Rc<RefCell<HashMap<String, GameState>>>,
    }

    impl GameStorage for MemoryStorage {
        type Error = Infallible;

        fn save_game(&self, save_name: &str, game_state: &GameState) -> Result<(), Self::Error> {
            self.saves
                .borrow_mut()
                .insert(save_name.to_string(), game_state.clone());
            Ok(())
        }

        fn load_game(&self, save_name: &str) -> Result<Option<GameState>, Self::Error> {
            Ok(self.saves.borrow().get(save_name).cloned())
        }

        fn delete_save(&self, save_name: &str) -> Result<(), Self::Error> {
            self.saves.borrow_mut().remove(save_name);
            Ok(())
        }
    }

    #[test]
    fn engine_creates_and_roundtrips_state() {
        let engine = GameEngine::new(MemoryStorage::default());
        let mut session = engine.create_session(0xABCD);
        session.with_state_mut(|state| {
            state.power = 250;
            state.has_unlocked_power = true;
        });
        let snapshot = session.into_state();
        engine.save_game("slot-one", &snapshot).unwrap();

        let loaded = engine.load_game("slot-one").unwrap().expect("save exists");
        assert_eq!(loaded.power, 250);
        assert_eq!(loaded.seed, 0xABCD);
        assert!(loaded.rng.is_some());
        assert!(engine.load_game("missing-slot").unwrap().is_none());

        engine.delete_save("slot-one").unwrap();
        assert!(engine.load_game("slot-one").unwrap().is_none());
    }

    #[test]
    fn engine_config_is_sanitized_on_construction() {
        let wild = EngineConfig {
            progress_per_tick: -3.0,
            ..EngineConfig::default()
        };
        let engine = GameEngine::with_config(MemoryStorage::default(), wild);
        let session = engine.create_session(7);
        assert!(session.config().progress_per_tick >= 0.01);
    }
}
