//! Report rendering for scenario results and playability sweeps.
//!
//! Every generator writes to a caller-supplied sink so the CLI can point
//! them at stdout or a file without the renderers caring.

use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use colored::Colorize;

use crate::playability::{PlayabilityAggregate, PlayabilityRecord};
use crate::runner::ScenarioResult;

pub fn generate_console_report(
    out: &mut dyn Write,
    results: &[ScenarioResult],
    aggregates: Option<&[PlayabilityAggregate]>,
    elapsed: Duration,
) -> Result<()> {
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;

    writeln!(out)?;
    writeln!(out, "📊 {}", "Everspire QA Summary".bold())?;
    writeln!(out, "{}", "=====================".dimmed())?;
    writeln!(out, "   Scenario runs: {}", results.len())?;
    writeln!(out, "   Passed: {}", passed.to_string().green())?;
    writeln!(out, "   Failed: {}", failed.to_string().red())?;
    if !results.is_empty() {
        let rate = passed as f64 / results.len() as f64 * 100.0;
        writeln!(out, "   Success rate: {rate:.1}%")?;
    }
    writeln!(out)?;

    for result in results {
        let flag = if result.passed { "✅" } else { "❌" };
        writeln!(
            out,
            "{flag} {} [{}] seed {}: {}/{} iterations, avg {}ms",
            result.scenario_name,
            result.strategy,
            result.seed,
            result.successful_iterations,
            result.iterations_run,
            result.average_duration.as_millis(),
        )?;
        for failure in &result.failures {
            writeln!(out, "     {}", failure.red())?;
        }
    }

    if let Some((fastest, slowest)) = performance_spread(results) {
        writeln!(out)?;
        writeln!(out, "⚡ Performance")?;
        writeln!(
            out,
            "   Fastest: {} ({}ms avg)",
            fastest.scenario_name,
            fastest.average_duration.as_millis()
        )?;
        writeln!(
            out,
            "   Slowest: {} ({}ms avg)",
            slowest.scenario_name,
            slowest.average_duration.as_millis()
        )?;
    }

    if let Some(aggregates) = aggregates {
        writeln!(out)?;
        writeln!(out, "🎯 {}", "Playability".bold())?;
        for agg in aggregates {
            writeln!(
                out,
                "   {:14} {:3} runs | {:7.1} mean ticks (±{:.1}) | {:4.1} resets | first reset @{:.0} | zone reach {:.0}%",
                agg.strategy.label(),
                agg.runs,
                agg.mean_ticks,
                agg.std_ticks,
                agg.mean_resets,
                agg.mean_first_reset_tick,
                agg.zone_reach_rate * 100.0,
            )?;
        }
    }

    writeln!(out)?;
    writeln!(out, "🏁 Completed in {:.2}s", elapsed.as_secs_f64())?;
    Ok(())
}

pub fn generate_json_report(
    out: &mut dyn Write,
    results: &[ScenarioResult],
    records: Option<&[PlayabilityRecord]>,
    aggregates: Option<&[PlayabilityAggregate]>,
) -> Result<()> {
    let payload = serde_json::json!({
        "results": results,
        "playability": records.map(|records| {
            serde_json::json!({
                "records": records,
                "aggregates": aggregates.unwrap_or(&[]),
            })
        }),
    });
    writeln!(out, "{}", serde_json::to_string_pretty(&payload)?)?;
    Ok(())
}

pub fn generate_markdown_report(
    out: &mut dyn Write,
    results: &[ScenarioResult],
    aggregates: Option<&[PlayabilityAggregate]>,
) -> Result<()> {
    writeln!(out, "# Everspire QA Report")?;
    writeln!(out)?;
    writeln!(out, "| Scenario | Strategy | Seed | Result | Iterations | Avg ms |")?;
    writeln!(out, "|----------|----------|------|--------|------------|--------|")?;
    for result in results {
        writeln!(
            out,
            "| {} | {} | {} | {} | {}/{} | {} |",
            result.scenario_name,
            result.strategy,
            result.seed,
            if result.passed { "pass" } else { "fail" },
            result.successful_iterations,
            result.iterations_run,
            result.average_duration.as_millis(),
        )?;
    }

    let failing: Vec<&ScenarioResult> = results.iter().filter(|r| !r.passed).collect();
    if !failing.is_empty() {
        writeln!(out)?;
        writeln!(out, "## Failures")?;
        for result in failing {
            writeln!(out)?;
            writeln!(out, "### {} (seed {})", result.scenario_name, result.seed)?;
            for failure in &result.failures {
                writeln!(out, "- {failure}")?;
            }
        }
    }

    if let Some(aggregates) = aggregates {
        writeln!(out)?;
        writeln!(out, "## Playability")?;
        writeln!(out)?;
        writeln!(
            out,
            "| Strategy | Runs | Mean ticks | Std | Mean resets | Zone reach |"
        )?;
        writeln!(
            out,
            "|----------|------|------------|-----|-------------|------------|"
        )?;
        for agg in aggregates {
            writeln!(
                out,
                "| {} | {} | {:.1} | {:.1} | {:.1} | {:.0}% |",
                agg.strategy.label(),
                agg.runs,
                agg.mean_ticks,
                agg.std_ticks,
                agg.mean_resets,
                agg.zone_reach_rate * 100.0,
            )?;
        }
    }
    Ok(())
}

pub fn generate_csv_report(out: &mut dyn Write, results: &[ScenarioResult]) -> Result<()> {
    writeln!(out, "scenario,strategy,seed,passed,iterations,successes,avg_ms")?;
    for result in results {
        writeln!(
            out,
            "{},{},{},{},{},{},{}",
            result.scenario_name,
            result.strategy,
            result.seed,
            result.passed,
            result.iterations_run,
            result.successful_iterations,
            result.average_duration.as_millis(),
        )?;
    }
    Ok(())
}

fn performance_spread(results: &[ScenarioResult]) -> Option<(&ScenarioResult, &ScenarioResult)> {
    let fastest = results.iter().min_by_key(|r| r.average_duration)?;
    let slowest = results.iter().max_by_key(|r| r.average_duration)?;
    Some((fastest, slowest))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result(name: &str, passed: bool) -> ScenarioResult {
        ScenarioResult {
            scenario_name: name.to_string(),
            strategy: String::from("Steady"),
            seed: 42,
            passed,
            iterations_run: 3,
            successful_iterations: if passed { 3 } else { 1 },
            failures: if passed {
                Vec::new()
            } else {
                vec![String::from("iteration 1: went sideways")]
            },
            average_duration: Duration::from_millis(12),
            performance_data: vec![Duration::from_millis(12); 3],
        }
    }

    #[test]
    fn console_report_renders_counts_and_failures() {
        let results = vec![sample_result("smoke", true), sample_result("chaos", false)];
        let mut buf = Vec::new();
        generate_console_report(&mut buf, &results, None, Duration::from_millis(1_500)).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Everspire QA Summary"));
        assert!(text.contains("Scenario runs: 2"));
        assert!(text.contains("went sideways"));
    }

    #[test]
    fn json_report_is_parseable() {
        let results = vec![sample_result("smoke", true)];
        let mut buf = Vec::new();
        generate_json_report(&mut buf, &results, None, None).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert!(value["results"].is_array());
        assert_eq!(value["results"][0]["scenario_name"], "smoke");
        assert!(value["playability"].is_null());
    }

    #[test]
    fn markdown_report_tables_every_result() {
        let results = vec![sample_result("smoke", true), sample_result("chaos", false)];
        let mut buf = Vec::new();
        generate_markdown_report(&mut buf, &results, None).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("| smoke |"));
        assert!(text.contains("## Failures"));
    }

    #[test]
    fn csv_report_emits_one_row_per_result() {
        let results = vec![sample_result("smoke", true), sample_result("chaos", false)];
        let mut buf = Vec::new();
        generate_csv_report(&mut buf, &results).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.starts_with("scenario,strategy,seed"));
    }
}
