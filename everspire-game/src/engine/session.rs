//! High-level session wrapper binding an engine config to a running state.

use crate::engine::{EngineConfig, TickOutcome, advance, tick_interval_ms};
use crate::state::{GameState, SaveError, SaveGame};

/// Aggregated results from a batch of ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickTotals {
    pub ticks: u64,
    pub reps_completed: u64,
    pub energy_spent: f64,
    pub zones_advanced: u32,
    /// The batch stopped early because energy ran out.
    pub depleted: bool,
}

/// One playthrough: a game state plus the config that drives it.
#[derive(Debug, Clone)]
pub struct GameSession {
    config: EngineConfig,
    state: GameState,
}

impl GameSession {
    /// Construct a fresh session from a seed with default tuning.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, EngineConfig::default())
    }

    /// Construct a fresh session with custom tuning. Out-of-range config
    /// values are clamped rather than rejected.
    #[must_use]
    pub fn with_config(seed: u64, mut config: EngineConfig) -> Self {
        config.sanitize();
        Self {
            config,
            state: GameState::new_game(seed),
        }
    }

    /// Build a session around an existing game state.
    #[must_use]
    pub fn from_state(state: GameState, mut config: EngineConfig) -> Self {
        config.sanitize();
        Self { config, state }
    }

    /// Parse a saved payload and resume it under the given tuning.
    pub fn restore(payload: &str, config: EngineConfig) -> Result<Self, SaveError> {
        Ok(Self::from_state(SaveGame::decode(payload)?, config))
    }

    /// Serialize the current state for persistence.
    pub fn save(&self) -> Result<String, SaveError> {
        SaveGame::encode(&self.state)
    }

    /// Advance the simulation by one tick.
    pub fn advance(&mut self) -> TickOutcome {
        advance(&mut self.state, &self.config)
    }

    /// Advance up to `ticks` ticks, stopping early if energy depletes.
    pub fn advance_n(&mut self, ticks: u64) -> TickTotals {
        let mut totals = TickTotals::default();
        for _ in 0..ticks {
            let outcome = self.advance();
            totals.ticks += 1;
            totals.reps_completed += u64::from(outcome.reps_completed);
            totals.energy_spent += outcome.energy_spent;
            totals.zones_advanced += u32::from(outcome.zone_advanced);
            if outcome.energy_depleted {
                totals.depleted = true;
                break;
            }
        }
        totals
    }

    /// Wall-clock milliseconds the driver should wait between ticks.
    #[must_use]
    pub fn tick_interval_ms(&self) -> u32 {
        tick_interval_ms(&self.state, &self.config)
    }

    /// Borrow the underlying immutable game state.
    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// Borrow the underlying mutable game state.
    pub const fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// Apply a closure to the mutable game state.
    pub fn with_state_mut<R>(&mut self, f: impl FnOnce(&mut GameState) -> R) -> R {
        f(&mut self.state)
    }

    /// Active engine tuning.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Deterministically reseed the session, rebuilding the RNG stream.
    pub fn reseed(&mut self, seed: u64) {
        self.state.seed = seed;
        self.state = std::mem::take(&mut self.state).rehydrate();
    }

    /// Consume the session, returning the underlying game state.
    #[must_use]
    pub fn into_state(self) -> GameState {
        self.state
    }
}
