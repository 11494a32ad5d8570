//! Named scenario catalog.
//!
//! Each scenario is a [`SimulationPlan`] plus the expectations that make it
//! a pass/fail test. Names are matched case-insensitively and most carry a
//! short alias.

use anyhow::{Result, ensure};

use crate::game_tester::{
    SimulationPlan, SimulationSummary, prestige_ready_setup, seasoned_setup, veteran_setup,
};
use crate::policy::GameplayStrategy;
use crate::simulation::HaltReason;

/// A catalog entry ready to run.
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: SimulationPlan,
}

impl TestScenario {
    fn new(name: &str, plan: SimulationPlan) -> Self {
        Self {
            name: name.to_string(),
            plan,
        }
    }
}

/// Baseline health: the run ticked and actually finished work.
fn expect_survival(summary: &SimulationSummary) -> Result<()> {
    ensure!(summary.metrics.ticks > 0, "run never ticked");
    ensure!(
        summary.metrics.reps_completed > 0,
        "no task reps completed in {} ticks",
        summary.metrics.ticks
    );
    Ok(())
}

fn smoke_scenario() -> TestScenario {
    TestScenario::new(
        "smoke",
        SimulationPlan::new(GameplayStrategy::Balanced)
            .with_max_ticks(2_000)
            .with_expectation(expect_survival),
    )
}

fn reset_cycle_scenario() -> TestScenario {
    TestScenario::new(
        "reset-cycle",
        SimulationPlan::new(GameplayStrategy::Steady)
            .with_max_ticks(5_000)
            .with_expectation(expect_survival)
            .with_expectation(|summary: &SimulationSummary| {
                ensure!(
                    summary.metrics.energy_resets >= 1,
                    "never depleted in {} ticks",
                    summary.metrics.ticks
                );
                let first = summary.metrics.first_reset_tick.unwrap_or(u64::MAX);
                ensure!(
                    summary.metrics.ticks > first,
                    "run stopped at its first depletion"
                );
                Ok(())
            }),
    )
}

fn zone_crawl_scenario() -> TestScenario {
    TestScenario::new(
        "zone-crawl",
        SimulationPlan::new(GameplayStrategy::Steady)
            .with_max_ticks(20_000)
            .with_setup(veteran_setup)
            .with_expectation(expect_survival)
            .with_expectation(|summary: &SimulationSummary| {
                ensure!(
                    summary.final_state.prestige.highest_zone >= 1,
                    "veteran skills never escaped the first zone"
                );
                ensure!(
                    summary.metrics.perks_earned >= 1,
                    "no perks earned while crawling"
                );
                Ok(())
            }),
    )
}

fn travel_rush_scenario() -> TestScenario {
    TestScenario::new(
        "travel-rush",
        SimulationPlan::new(GameplayStrategy::Rusher)
            .with_max_ticks(20_000)
            .with_setup(veteran_setup)
            .with_expectation(expect_survival)
            .with_expectation(|summary: &SimulationSummary| {
                ensure!(
                    summary.final_state.prestige.highest_zone >= 1,
                    "rusher never advanced a zone"
                );
                ensure!(
                    summary.metrics.energy_resets >= 1,
                    "rusher never looped through a reset"
                );
                Ok(())
            }),
    )
}

fn quartermaster_scenario() -> TestScenario {
    TestScenario::new(
        "quartermaster",
        SimulationPlan::new(GameplayStrategy::Quartermaster)
            .with_max_ticks(10_000)
            .with_setup(seasoned_setup)
            .with_expectation(expect_survival)
            .with_expectation(|summary: &SimulationSummary| {
                ensure!(
                    summary.metrics.items_gained > 0,
                    "quartermaster gathered nothing"
                );
                ensure!(
                    summary.metrics.energy_resets >= 1,
                    "quartermaster never cycled a reset"
                );
                Ok(())
            }),
    )
}

fn wildcard_scenario() -> TestScenario {
    TestScenario::new(
        "wildcard",
        SimulationPlan::new(GameplayStrategy::Wildcard)
            .with_max_ticks(10_000)
            .with_expectation(expect_survival)
            .with_expectation(|summary: &SimulationSummary| {
                ensure!(
                    summary.halt != HaltReason::Stalled,
                    "random clicks wedged the engine"
                );
                Ok(())
            }),
    )
}

fn prestige_loop_scenario() -> TestScenario {
    TestScenario::new(
        "prestige-loop",
        SimulationPlan::new(GameplayStrategy::Balanced)
            .with_max_ticks(2_000)
            .with_setup(prestige_ready_setup)
            .with_expectation(|summary: &SimulationSummary| {
                ensure!(
                    summary.metrics.prestiges >= 1,
                    "offered prestige was never taken"
                );
                let first = summary.metrics.first_prestige_tick.unwrap_or(u64::MAX);
                ensure!(
                    summary.metrics.ticks >= first.saturating_add(500),
                    "the run fizzled right after prestige"
                );
                Ok(())
            }),
    )
}

/// Look up a scenario by name or alias, case-insensitively.
#[must_use]
pub fn get_scenario(name: &str) -> Option<TestScenario> {
    match name.to_lowercase().as_str() {
        "smoke" => Some(smoke_scenario()),
        "reset-cycle" | "reset" => Some(reset_cycle_scenario()),
        "zone-crawl" | "crawl" => Some(zone_crawl_scenario()),
        "travel-rush" | "rush" => Some(travel_rush_scenario()),
        "quartermaster" | "rations" => Some(quartermaster_scenario()),
        "wildcard" | "chaos" => Some(wildcard_scenario()),
        "prestige-loop" | "prestige" => Some(prestige_loop_scenario()),
        _ => None,
    }
}

/// Canonical names and descriptions for `--list-scenarios`.
#[must_use]
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    vec![
        ("smoke", "Balanced policy sanity pass over a short fresh run"),
        (
            "reset-cycle",
            "Steady grind into depletion and through the energy reset",
        ),
        (
            "zone-crawl",
            "Veteran-skill crawl that must escape the starting zone",
        ),
        (
            "travel-rush",
            "Gate-first rusher that must advance zones and loop resets",
        ),
        (
            "quartermaster",
            "Item-hoarding run that must keep the satchel busy",
        ),
        (
            "wildcard",
            "Seeded random clicks; the engine must never wedge",
        ),
        (
            "prestige-loop",
            "Takes an offered prestige and keeps playing after it",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_tester::GameTester;

    #[test]
    fn every_listed_scenario_resolves() {
        for (name, _) in list_scenarios() {
            assert!(get_scenario(name).is_some(), "catalog entry {name} missing");
        }
    }

    #[test]
    fn aliases_reach_the_same_plans() {
        assert_eq!(get_scenario("RESET").unwrap().name, "reset-cycle");
        assert_eq!(get_scenario("chaos").unwrap().name, "wildcard");
        assert!(get_scenario("nonsense").is_none());
    }

    #[test]
    fn smoke_expectations_hold_on_a_real_run() {
        let scenario = get_scenario("smoke").unwrap();
        let tester = GameTester::new(false);
        let summary = tester.run_plan(&scenario.plan, 1337);
        for expectation in &scenario.plan.expectations {
            expectation.evaluate(&summary).unwrap();
        }
    }

    #[test]
    fn prestige_loop_takes_the_offer() {
        let scenario = get_scenario("prestige-loop").unwrap();
        let tester = GameTester::new(false);
        let summary = tester.run_plan(&scenario.plan, 7);
        assert!(summary.metrics.prestiges >= 1);
        assert_eq!(summary.metrics.first_prestige_tick, Some(0));
    }
}
