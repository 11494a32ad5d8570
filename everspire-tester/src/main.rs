//! Everspire QA tester.
//!
//! Plays the engine through scripted policies: named scenarios with
//! expectations, plus a cross-strategy playability sweep with pacing
//! targets. Exits non-zero when any scenario or target fails.

mod game_tester;
mod playability;
mod policy;
mod reports;
mod runner;
mod scenarios;
mod seeds;
mod simulation;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use log::info;

use crate::game_tester::GameTester;
use crate::playability::{
    PlayabilityAggregate, PlayabilityRecord, aggregate_playability, run_playability_analysis,
    validate_playability_targets,
};
use crate::reports::{
    generate_console_report, generate_csv_report, generate_json_report, generate_markdown_report,
};
use crate::runner::{ScenarioResult, ScenarioRunner};
use crate::scenarios::{get_scenario, list_scenarios};
use crate::seeds::resolve_seed_inputs;

/// Acceptance sweeps raise the iteration count so rates stabilize.
const ACCEPTANCE_MIN_ITERATIONS: usize = 100;

#[derive(Debug, Parser)]
#[command(name = "everspire-tester", version)]
#[command(about = "Automated QA for the Everspire engine - scripted policies over the tick loop")]
struct Args {
    /// Scenarios to run (comma-separated; `all` expands the catalog)
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated; integers, `a..b` ranges, `random:N`)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Iterations per scenario and seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Extended acceptance sweep (at least 100 playability iterations)
    #[arg(long)]
    acceptance: bool,

    /// Skip the playability sweep and its target validation
    #[arg(long)]
    no_playability: bool,

    /// Report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["console", "json", "markdown", "csv"])]
    report: String,

    /// Verbose per-run output
    #[arg(short, long)]
    verbose: bool,

    /// Write the report to a file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.list_scenarios {
        let mut target = OutputTarget::new(args.output.as_ref())?;
        writeln!(target, "Available scenarios:")?;
        for (name, description) in list_scenarios() {
            writeln!(target, "  {name:<14} - {description}")?;
        }
        return target.flush_inner();
    }

    announce_banner();
    let start = Instant::now();

    let scenario_names = expand_scenarios(&args.scenarios);
    let seed_infos = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let seed_values: Vec<u64> = seed_infos.iter().map(|info| info.seed).collect();
    let generated = seed_infos.iter().filter(|info| info.generated).count();
    info!(
        "running {} scenario(s) over {} seed(s) ({generated} generated)",
        scenario_names.len(),
        seed_values.len()
    );

    let tester = GameTester::new(args.verbose);
    let results = run_scenarios(&tester, &scenario_names, &seed_values, args.iterations);

    let (records, aggregates) = if args.no_playability {
        (None, None)
    } else {
        println!();
        println!("🎯 {}", "Playability sweep".bold());
        let records = run_playability_analysis(&tester, &seed_infos, playability_iterations(&args));
        let aggregates = aggregate_playability(&records);
        (Some(records), Some(aggregates))
    };

    write_reports(
        &args,
        &results,
        records.as_deref(),
        aggregates.as_deref(),
        start,
    )?;

    if let Some(aggregates) = aggregates.as_deref() {
        validate_playability_targets(aggregates)?;
    }

    if results.iter().any(|result| !result.passed) {
        std::process::exit(1);
    }
    Ok(())
}

fn announce_banner() {
    println!("{}", "🎮 Everspire Automated Tester".bright_cyan().bold());
}

fn playability_iterations(args: &Args) -> usize {
    if args.acceptance {
        args.iterations.max(ACCEPTANCE_MIN_ITERATIONS)
    } else {
        args.iterations
    }
}

fn run_scenarios(
    tester: &GameTester,
    names: &[String],
    seeds: &[u64],
    iterations: usize,
) -> Vec<ScenarioResult> {
    let runner = ScenarioRunner::new(*tester);
    let mut results = Vec::new();
    println!();
    println!("🧪 {}", "Scenario runs".bold());
    for name in names {
        match get_scenario(name) {
            Some(scenario) => {
                println!("  {} {}", "•".cyan(), scenario.name);
                results.extend(runner.run_scenario(&scenario, seeds, iterations));
            }
            None => eprintln!("{} unknown scenario: {name}", "⚠️".yellow()),
        }
    }
    results
}

fn expand_scenarios(raw: &str) -> Vec<String> {
    let tokens = split_csv(raw);
    if tokens.iter().any(|token| token.eq_ignore_ascii_case("all")) {
        return list_scenarios()
            .into_iter()
            .map(|(name, _)| name.to_string())
            .collect();
    }
    tokens
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn write_reports(
    args: &Args,
    results: &[ScenarioResult],
    records: Option<&[PlayabilityRecord]>,
    aggregates: Option<&[PlayabilityAggregate]>,
    start: Instant,
) -> Result<()> {
    let mut target = OutputTarget::new(args.output.as_ref())?;
    match args.report.as_str() {
        "json" => generate_json_report(&mut target, results, records, aggregates)?,
        "markdown" => generate_markdown_report(&mut target, results, aggregates)?,
        "csv" => generate_csv_report(&mut target, results)?,
        _ => generate_console_report(&mut target, results, aggregates, start.elapsed())?,
    }
    target.flush_inner()
}

/// Where report bytes land: stdout by default, a file with `--output`.
enum OutputTarget {
    Stdout(BufWriter<io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("creating report file {}", path.display()))?;
                Ok(Self::File(BufWriter::new(file)))
            }
            None => Ok(Self::Stdout(BufWriter::new(io::stdout()))),
        }
    }

    fn flush_inner(&mut self) -> Result<()> {
        match self {
            Self::Stdout(writer) => writer.flush()?,
            Self::File(writer) => writer.flush()?,
        }
        Ok(())
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout(writer) => writer.write(buf),
            Self::File(writer) => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout(writer) => writer.flush(),
            Self::File(writer) => writer.flush(),
        }
    }
}
