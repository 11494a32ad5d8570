//! Declarative simulation plans and the harness that runs them.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use everspire_game::GameState;
use log::debug;
use serde::Serialize;

use crate::policy::GameplayStrategy;
use crate::simulation::{
    DEFAULT_MAX_TICKS, HaltReason, RunMetrics, SimulationConfig, SimulationSession,
};

/// Skill spread for scenarios past the cold open.
pub const SEASONED_LEVEL: u32 = 25;
/// Skill spread that clears the early zones comfortably.
pub const VETERAN_LEVEL: u32 = 100;

pub fn seasoned_setup(state: &mut GameState) {
    for skill in &mut state.skills {
        skill.level = SEASONED_LEVEL;
    }
}

pub fn veteran_setup(state: &mut GameState) {
    for skill in &mut state.skills {
        skill.level = VETERAN_LEVEL;
    }
}

/// A run standing at the prestige door.
pub fn prestige_ready_setup(state: &mut GameState) {
    state.prestige_available = true;
}

/// Everything needed to reproduce one scripted run.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub strategy: GameplayStrategy,
    pub max_ticks: u64,
    pub setup: Option<fn(&mut GameState)>,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub fn new(strategy: GameplayStrategy) -> Self {
        Self {
            strategy,
            max_ticks: DEFAULT_MAX_TICKS,
            setup: None,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    #[must_use]
    pub fn with_setup(mut self, setup: fn(&mut GameState)) -> Self {
        self.setup = Some(setup);
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

/// Post-run assertion over a [`SimulationSummary`].
#[derive(Clone)]
pub struct SimulationExpectation(
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>,
);

impl fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    pub fn new(check: impl Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static) -> Self {
        Self(Arc::new(check))
    }

    /// Run the assertion.
    ///
    /// # Errors
    ///
    /// Returns the underlying check's error when the summary misses the bar.
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(check: F) -> Self {
        Self::new(check)
    }
}

/// Outcome of one completed run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub seed: u64,
    pub strategy: GameplayStrategy,
    pub halt: HaltReason,
    pub metrics: RunMetrics,
    #[serde(skip)]
    pub final_state: GameState,
}

/// Drives plans to completion and hands back summaries.
#[derive(Debug, Clone, Copy)]
pub struct GameTester {
    verbose: bool,
}

impl GameTester {
    #[must_use]
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    #[must_use]
    pub const fn verbose(&self) -> bool {
        self.verbose
    }

    /// Play one plan to its halt condition.
    #[must_use]
    pub fn run_plan(&self, plan: &SimulationPlan, seed: u64) -> SimulationSummary {
        let config = SimulationConfig::new(plan.strategy, seed).with_max_ticks(plan.max_ticks);
        let mut sim = SimulationSession::new(config);
        if let Some(setup) = plan.setup {
            sim.with_state_mut(setup);
        }

        let mut policy = plan.strategy.create_policy(seed);
        let halt = loop {
            if let Some(reason) = sim.halted() {
                break reason;
            }
            sim.step(policy.as_mut());
        };
        debug!(
            "plan {} seed {seed} halted {halt:?} after {} ticks in zone {}",
            plan.strategy,
            sim.metrics().ticks,
            sim.state().current_zone
        );

        let (metrics, final_state) = sim.into_parts();
        if self.verbose {
            println!(
                "  {} {} seed {}: {} ticks, {} reps, {} resets, {} prestiges, zone {}",
                "▸".cyan(),
                plan.strategy,
                seed,
                metrics.ticks,
                metrics.reps_completed,
                metrics.energy_resets,
                metrics.prestiges,
                final_state.prestige.highest_zone,
            );
        }
        SimulationSummary {
            seed,
            strategy: plan.strategy,
            halt,
            metrics,
            final_state,
        }
    }
}
