//! Scenario execution and per-seed result accounting.

use std::time::{Duration, Instant};

use colored::Colorize;
use serde::Serialize;

use crate::game_tester::{GameTester, SimulationPlan, SimulationSummary};
use crate::scenarios::TestScenario;
use crate::simulation::DecisionRecord;

/// Outcome of one scenario under one base seed.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub strategy: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

mod duration_serde {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(
        duration: &Duration,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_u128(duration.as_millis())
    }
}

mod duration_vec_serde {
    use std::time::Duration;

    use serde::Serializer;
    use serde::ser::SerializeSeq;

    pub fn serialize<S: Serializer>(
        durations: &[Duration],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(durations.len()))?;
        for duration in durations {
            seq.serialize_element(&duration.as_millis())?;
        }
        seq.end()
    }
}

/// Runs catalog scenarios across seeds and iterations.
pub struct ScenarioRunner {
    tester: GameTester,
}

impl ScenarioRunner {
    #[must_use]
    pub const fn new(tester: GameTester) -> Self {
        Self { tester }
    }

    pub fn run_scenario(
        &self,
        scenario: &TestScenario,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        seeds
            .iter()
            .map(|&seed| self.run_single(scenario, seed, iterations))
            .collect()
    }

    fn run_single(&self, scenario: &TestScenario, seed: u64, iterations: usize) -> ScenarioResult {
        let mut successes = 0;
        let mut failures = Vec::new();
        let mut performance_data = Vec::with_capacity(iterations);

        for i in 0..iterations {
            let iteration_seed = seed.wrapping_add(i as u64);
            let started = Instant::now();
            let summary = self.tester.run_plan(&scenario.plan, iteration_seed);
            performance_data.push(started.elapsed());

            match evaluate_expectations(&scenario.plan, &summary) {
                None => successes += 1,
                Some(message) => failures.push(format!(
                    "iteration {i} (strategy {}, seed {iteration_seed}): {message} \
                     [halt {:?}, {} ticks, zone {}] last picks: {}",
                    summary.strategy,
                    summary.halt,
                    summary.metrics.ticks,
                    summary.final_state.prestige.highest_zone,
                    summarize_decisions(&summary.metrics.decision_log),
                )),
            }
        }

        let total: Duration = performance_data.iter().sum();
        let average_duration = if performance_data.is_empty() {
            Duration::ZERO
        } else {
            total / performance_data.len() as u32
        };
        let passed = iterations > 0 && successes == iterations;

        if self.tester.verbose() || !passed {
            let flag = if passed { "✅".green() } else { "❌".red() };
            println!(
                "{flag} {} seed {}: {}/{} iterations passed",
                scenario.name, seed, successes, iterations
            );
            for failure in &failures {
                println!("    {}", failure.red());
            }
        }

        ScenarioResult {
            scenario_name: scenario.name.clone(),
            strategy: scenario.plan.strategy.label().to_string(),
            seed,
            passed,
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            average_duration,
            performance_data,
        }
    }
}

fn evaluate_expectations(plan: &SimulationPlan, summary: &SimulationSummary) -> Option<String> {
    for expectation in &plan.expectations {
        if let Err(err) = expectation.evaluate(summary) {
            return Some(err.to_string());
        }
    }
    None
}

/// The last few task picks, newest first, for failure context.
fn summarize_decisions(log: &[DecisionRecord]) -> String {
    if log.is_empty() {
        return String::from("none");
    }
    let tail: Vec<String> = log
        .iter()
        .rev()
        .take(3)
        .map(|d| match &d.rationale {
            Some(reason) => format!("{}@{} ({reason})", d.task_id, d.tick),
            None => format!("{}@{}", d.task_id, d.tick),
        })
        .collect();
    tail.join(", ")
}
