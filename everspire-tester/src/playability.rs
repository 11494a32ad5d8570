//! Cross-strategy playability sweeps.
//!
//! Runs every strategy over the seed set and aggregates per-strategy health
//! numbers. The targets here are tuning tripwires: a strategy that stalls,
//! never resets, or dies instantly means the pacing curve broke.

use anyhow::{Result, ensure};
use serde::Serialize;

use crate::game_tester::{GameTester, SimulationPlan};
use crate::policy::GameplayStrategy;
use crate::seeds::SeedInfo;
use crate::simulation::{HaltReason, RunMetrics};

/// Tick budget per playability run.
pub const PLAYABILITY_TICKS: u64 = 3_000;

/// A healthy strategy keeps a run alive at least this long on average.
const MIN_MEAN_TICKS: f64 = 500.0;

/// Share of runs that must reach at least one energy reset.
const MIN_RESET_RATE: f64 = 0.9;

/// One sweep run, metrics only. Final states are dropped to keep sweeps lean.
#[derive(Debug, Clone, Serialize)]
pub struct PlayabilityRecord {
    pub strategy: GameplayStrategy,
    pub seed: u64,
    pub halt: HaltReason,
    pub highest_zone: u32,
    pub metrics: RunMetrics,
}

/// Per-strategy aggregate over every sweep run.
#[derive(Debug, Clone, Serialize)]
pub struct PlayabilityAggregate {
    pub strategy: GameplayStrategy,
    pub runs: usize,
    pub mean_ticks: f64,
    pub std_ticks: f64,
    pub mean_reps: f64,
    pub mean_resets: f64,
    pub reset_rate: f64,
    pub mean_highest_zone: f64,
    pub zone_reach_rate: f64,
    pub stall_rate: f64,
    pub mean_first_reset_tick: f64,
}

/// Run the full strategy-by-seed-by-iteration grid.
#[must_use]
pub fn run_playability_analysis(
    tester: &GameTester,
    seeds: &[SeedInfo],
    iterations: usize,
) -> Vec<PlayabilityRecord> {
    let mut records = Vec::new();
    for strategy in GameplayStrategy::all() {
        let plan = SimulationPlan::new(strategy).with_max_ticks(PLAYABILITY_TICKS);
        for info in seeds {
            for i in 0..iterations {
                let seed = info.seed.wrapping_add(i as u64);
                let summary = tester.run_plan(&plan, seed);
                records.push(PlayabilityRecord {
                    strategy,
                    seed,
                    halt: summary.halt,
                    highest_zone: summary.final_state.prestige.highest_zone,
                    metrics: summary.metrics,
                });
            }
        }
    }
    records
}

/// Collapse records into one aggregate per strategy present.
#[must_use]
pub fn aggregate_playability(records: &[PlayabilityRecord]) -> Vec<PlayabilityAggregate> {
    GameplayStrategy::all()
        .into_iter()
        .filter_map(|strategy| {
            let group: Vec<&PlayabilityRecord> = records
                .iter()
                .filter(|record| record.strategy == strategy)
                .collect();
            if group.is_empty() {
                return None;
            }

            let denom = group.len() as f64;
            let ticks: Vec<f64> = group.iter().map(|r| r.metrics.ticks as f64).collect();
            let mean_ticks = mean(&ticks);
            let first_resets: Vec<f64> = group
                .iter()
                .filter_map(|r| r.metrics.first_reset_tick)
                .map(|t| t as f64)
                .collect();

            Some(PlayabilityAggregate {
                strategy,
                runs: group.len(),
                mean_ticks,
                std_ticks: std_dev(&ticks, mean_ticks),
                mean_reps: group.iter().map(|r| r.metrics.reps_completed as f64).sum::<f64>() / denom,
                mean_resets: group
                    .iter()
                    .map(|r| f64::from(r.metrics.energy_resets))
                    .sum::<f64>()
                    / denom,
                reset_rate: group.iter().filter(|r| r.metrics.energy_resets > 0).count() as f64
                    / denom,
                mean_highest_zone: group
                    .iter()
                    .map(|r| f64::from(r.highest_zone))
                    .sum::<f64>()
                    / denom,
                zone_reach_rate: group.iter().filter(|r| r.highest_zone >= 1).count() as f64
                    / denom,
                stall_rate: group
                    .iter()
                    .filter(|r| r.halt == HaltReason::Stalled)
                    .count() as f64
                    / denom,
                mean_first_reset_tick: mean(&first_resets),
            })
        })
        .collect()
}

/// Gate the sweep on the pacing tripwires.
///
/// # Errors
///
/// Returns the first target a strategy misses.
pub fn validate_playability_targets(aggregates: &[PlayabilityAggregate]) -> Result<()> {
    ensure!(
        !aggregates.is_empty(),
        "playability sweep produced no aggregates"
    );
    for agg in aggregates {
        ensure!(
            agg.mean_ticks >= MIN_MEAN_TICKS,
            "strategy {} averages only {:.0} ticks before halting",
            agg.strategy,
            agg.mean_ticks
        );
        ensure!(
            agg.stall_rate <= f64::EPSILON,
            "strategy {} stalled in {:.0}% of runs",
            agg.strategy,
            agg.stall_rate * 100.0
        );
        ensure!(
            agg.reset_rate >= MIN_RESET_RATE,
            "strategy {} hit a reset in only {:.0}% of runs",
            agg.strategy,
            agg.reset_rate * 100.0
        );
        ensure!(
            agg.mean_reps > 0.0,
            "strategy {} completed no work at all",
            agg.strategy
        );
    }
    Ok(())
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
        / (values.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweeps_cover_every_strategy_and_pass_targets() {
        let tester = GameTester::new(false);
        let seeds = [SeedInfo::literal(5)];
        let records = run_playability_analysis(&tester, &seeds, 1);
        assert_eq!(records.len(), GameplayStrategy::all().len());
        let aggregates = aggregate_playability(&records);
        assert_eq!(aggregates.len(), GameplayStrategy::all().len());
        validate_playability_targets(&aggregates).unwrap();
    }

    #[test]
    fn aggregates_summarize_group_counts() {
        let record = |ticks: u64, resets: u32| PlayabilityRecord {
            strategy: GameplayStrategy::Steady,
            seed: 1,
            halt: HaltReason::TickBudget,
            highest_zone: 0,
            metrics: RunMetrics {
                ticks,
                reps_completed: 10,
                energy_resets: resets,
                ..RunMetrics::default()
            },
        };
        let records = vec![record(100, 1), record(300, 0)];
        let aggregates = aggregate_playability(&records);
        assert_eq!(aggregates.len(), 1);

        let agg = &aggregates[0];
        assert_eq!(agg.runs, 2);
        assert!((agg.mean_ticks - 200.0).abs() < f64::EPSILON);
        assert!((agg.reset_rate - 0.5).abs() < f64::EPSILON);
        assert!((agg.std_ticks - 20_000_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn empty_sweeps_fail_validation() {
        assert!(validate_playability_targets(&[]).is_err());
    }
}
