//! Policy-driven simulation sessions.
//!
//! Wraps the engine's [`GameSession`] and plays it the way a scripted player
//! would: pick a task when idle, spend items per strategy doctrine, apply the
//! energy reset the moment a run depletes, and prestige whenever it is
//! offered. Every run is fully reproducible from its seed.

use everspire_game::{
    EngineConfig, EventKind, GameSession, GameState, ItemType, TickOutcome, click_item,
    click_task, do_energy_reset, do_prestige,
};
use log::debug;
use serde::Serialize;

use crate::policy::{GameplayStrategy, PlayerPolicy};

/// Default tick budget for a plan that does not override it.
pub const DEFAULT_MAX_TICKS: u64 = 5_000;

/// Consecutive ticks without progress before a run is declared stalled.
const STALL_TICK_LIMIT: u64 = 1_000;

/// Tuning for one policy-driven run.
#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    pub seed: u64,
    pub strategy: GameplayStrategy,
    pub max_ticks: u64,
}

impl SimulationConfig {
    #[must_use]
    pub const fn new(strategy: GameplayStrategy, seed: u64) -> Self {
        Self {
            seed,
            strategy,
            max_ticks: DEFAULT_MAX_TICKS,
        }
    }

    #[must_use]
    pub const fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = max_ticks;
        self
    }
}

/// One task activation recorded during a run.
#[derive(Debug, Clone)]
pub struct DecisionRecord {
    pub tick: u64,
    pub task_id: String,
    pub rationale: Option<String>,
}

/// Why a run stopped advancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HaltReason {
    /// The player reached the end of authored content.
    EndOfContent,
    /// The tick budget ran out while the run was still healthy.
    TickBudget,
    /// Nothing progressed for [`STALL_TICK_LIMIT`] consecutive ticks.
    Stalled,
}

/// Counters accumulated over a full policy run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunMetrics {
    pub ticks: u64,
    pub reps_completed: u64,
    pub energy_resets: u32,
    pub prestiges: u32,
    pub zones_advanced: u32,
    pub items_gained: u64,
    pub perks_earned: u32,
    pub skill_ups: u32,
    pub first_reset_tick: Option<u64>,
    pub first_prestige_tick: Option<u64>,
    #[serde(skip)]
    pub decision_log: Vec<DecisionRecord>,
}

/// A live run: engine session plus the doctrine wrapped around it.
pub struct SimulationSession {
    session: GameSession,
    cfg: EngineConfig,
    strategy: GameplayStrategy,
    max_ticks: u64,
    idle_ticks: u64,
    metrics: RunMetrics,
}

impl SimulationSession {
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        let session = GameSession::new(config.seed);
        let cfg = session.config().clone();
        Self {
            session,
            cfg,
            strategy: config.strategy,
            max_ticks: config.max_ticks,
            idle_ticks: 0,
            metrics: RunMetrics::default(),
        }
    }

    #[must_use]
    pub const fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        self.session.state()
    }

    /// Mutate the underlying state, for scenario setup hooks.
    pub fn with_state_mut<R>(&mut self, f: impl FnOnce(&mut GameState) -> R) -> R {
        self.session.with_state_mut(f)
    }

    #[must_use]
    pub fn into_parts(self) -> (RunMetrics, GameState) {
        (self.metrics, self.session.into_state())
    }

    /// The halt condition the run has hit, if any.
    #[must_use]
    pub fn halted(&self) -> Option<HaltReason> {
        if self.session.state().is_at_end_of_content {
            return Some(HaltReason::EndOfContent);
        }
        if self.metrics.ticks >= self.max_ticks {
            return Some(HaltReason::TickBudget);
        }
        if self.idle_ticks >= STALL_TICK_LIMIT {
            return Some(HaltReason::Stalled);
        }
        None
    }

    /// One driver tick: meta decisions first, then the engine tick.
    pub fn step(&mut self, policy: &mut dyn PlayerPolicy) -> TickOutcome {
        self.take_prestige();
        self.apply_item_doctrine();
        if self.session.state().active_task.is_none() {
            self.pick_next(policy);
        }

        let outcome = self.session.advance();
        self.metrics.ticks += 1;
        self.metrics.reps_completed += u64::from(outcome.reps_completed);
        if outcome.zone_advanced {
            self.metrics.zones_advanced += 1;
        }
        if outcome.worked || outcome.reps_completed > 0 {
            self.idle_ticks = 0;
        } else {
            self.idle_ticks += 1;
        }
        self.harvest_events();

        if outcome.energy_depleted {
            self.metrics.energy_resets += 1;
            self.metrics.first_reset_tick.get_or_insert(self.metrics.ticks);
            if do_energy_reset(self.session.state_mut(), &self.cfg) {
                debug!("tick {}: run depleted, reset applied", self.metrics.ticks);
            }
        }
        outcome
    }

    /// Prestige is always worth taking in a sweep; the metrics measure the
    /// loop, not shop taste.
    fn take_prestige(&mut self) {
        let offered = self.session.state().prestige_available;
        if offered && do_prestige(self.session.state_mut(), &self.cfg) {
            self.metrics.prestiges += 1;
            self.metrics
                .first_prestige_tick
                .get_or_insert(self.metrics.ticks);
            debug!("tick {}: prestige applied", self.metrics.ticks);
        }
    }

    /// Strategy-flavored item spending.
    fn apply_item_doctrine(&mut self) {
        let (current, max, food, scrolls, rings) = {
            let state = self.session.state();
            (
                state.energy.current,
                state.energy.max,
                state.item_count(ItemType::Food),
                state.item_count(ItemType::ScrollOfHaste),
                state.item_count(ItemType::MagicRing),
            )
        };
        let hungry = current < max * 0.5;

        match self.strategy {
            // Hold rations for the back half of the run, one at a time.
            GameplayStrategy::Quartermaster => {
                if hungry && food > 0 {
                    let _ = click_item(self.session.state_mut(), ItemType::Food, false);
                }
            }
            GameplayStrategy::Rusher | GameplayStrategy::Wildcard => {
                if food > 0 && current < max {
                    let _ = click_item(self.session.state_mut(), ItemType::Food, true);
                }
                if scrolls > 0 {
                    let _ = click_item(self.session.state_mut(), ItemType::ScrollOfHaste, true);
                }
            }
            GameplayStrategy::Steady | GameplayStrategy::Balanced => {
                if hungry && food > 0 {
                    let _ = click_item(self.session.state_mut(), ItemType::Food, true);
                }
                if self.strategy == GameplayStrategy::Balanced && rings > 0 {
                    let _ = click_item(self.session.state_mut(), ItemType::MagicRing, true);
                }
            }
        }
    }

    fn pick_next(&mut self, policy: &mut dyn PlayerPolicy) {
        let Some(zone) = self.session.state().zone_def() else {
            return;
        };
        let decision = policy.pick_task(self.session.state(), zone);
        let Some(task_id) = decision.task_id else {
            return;
        };
        if click_task(self.session.state_mut(), &task_id) {
            debug!(
                "tick {}: {} picked {task_id}",
                self.metrics.ticks,
                policy.name()
            );
            self.metrics.decision_log.push(DecisionRecord {
                tick: self.metrics.ticks,
                task_id,
                rationale: decision.rationale,
            });
        }
    }

    fn harvest_events(&mut self) {
        for event in self.session.state_mut().events.drain() {
            match event.kind {
                EventKind::GainedItem { count, .. } => {
                    self.metrics.items_gained += u64::from(count);
                }
                EventKind::GainedPerk { .. } => self.metrics.perks_earned += 1,
                EventKind::SkillUp { levels_gained, .. } => {
                    self.metrics.skill_ups += levels_gained;
                }
                _ => {}
            }
        }
    }
}
