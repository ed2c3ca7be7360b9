use nucascade::{ScenarioConfig, Scenario, EvolutionStatus, ParticleStatus};
use nucascade::{EventSink, HistogramCollection};
use nucascade::{bench_evolve, bench_step_curve};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short, default_value = "carbon.yaml")]
    file_name: String,

    /// Run the timing benchmarks instead of a scenario
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name);
    let text = fs::read_to_string(&config_path)
        .with_context(|| format!("failed to read scenario {}", config_path.display()))?;
    let scenario_cfg = ScenarioConfig::from_yaml(&text)
        .with_context(|| format!("failed to decode scenario {}", config_path.display()))?;
    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.bench {
        bench_evolve()?;
        bench_step_curve()?;
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let scenario = Scenario::build_scenario(scenario_cfg)?;
    let outcomes = scenario.run();

    let mut escaped = 0;
    let mut captured = 0;
    let mut interacted = 0;
    let mut truncated = 0;
    let mut distance = 0.0;
    for outcome in &outcomes {
        escaped += outcome.event.count(ParticleStatus::Escaped);
        captured += outcome.event.count(ParticleStatus::Captured);
        interacted += outcome.event.count(ParticleStatus::Interacted);
        distance += outcome.event.nucleus().nucleons()[outcome.kicked].distance_traveled;
        if let EvolutionStatus::StepLimit { .. } = outcome.status {
            truncated += 1;
        }
    }

    let events = outcomes.len().max(1) as f64;
    info!("{} events: {escaped} escaped, {captured} captured, {interacted} interacted", outcomes.len());
    info!("average distance traveled by the kicked nucleon: {:.4} fm", distance / events);
    if truncated > 0 {
        warn!("{truncated} events stopped at the step ceiling");
    }

    if let Some(output) = &scenario.output {
        let mut histograms = HistogramCollection::new(output.bins, output.min, output.max)?;
        for outcome in &outcomes {
            let (pids, momenta) = outcome.event.final_state();
            histograms.fill(&pids, &momenta, outcome.event.weight());
        }
        histograms.finalize();

        let dir = PathBuf::from(&output.path);
        histograms
            .save(&dir)
            .with_context(|| format!("failed to write histograms to {}", dir.display()))?;
        info!("histograms written to {}", dir.display());
    }

    Ok(())
}
