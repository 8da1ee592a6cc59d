use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use imperium::{
    engine::{SimulatorBuilder, SimulatorSettings},
    observer::{LogViewer, TrackLog},
    scenario::{ScenarioLoader, DEFAULT_MAX_STEPS},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Competing empires on a grid")]
struct Cli {
    /// Path to a scenario YAML file (built-in defaults when omitted)
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Override field depth
    #[arg(long)]
    depth: Option<usize>,

    /// Override field width
    #[arg(long)]
    width: Option<usize>,

    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the step budget
    #[arg(long)]
    max_steps: Option<u64>,

    /// Pause between steps in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Log the census every N steps
    #[arg(long, default_value_t = 1)]
    log_every: u64,

    /// Print the final frame as JSON
    #[arg(long)]
    json: bool,

    /// Tracing filter used when RUST_LOG is unset
    #[arg(long, default_value = "imperium=info")]
    log_filter: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let (name, mut settings, max_steps, delay_ms) = match &cli.scenario {
        Some(path) => {
            let scenario = ScenarioLoader::new(".").load(path)?;
            (
                scenario.name.clone(),
                scenario.settings(),
                scenario.max_steps(cli.max_steps),
                scenario.step_delay_ms,
            )
        }
        None => (
            "default".to_string(),
            SimulatorSettings::default(),
            cli.max_steps.unwrap_or(DEFAULT_MAX_STEPS),
            50,
        ),
    };
    if let Some(depth) = cli.depth {
        settings.depth = depth;
    }
    if let Some(width) = cli.width {
        settings.width = width;
    }
    if let Some(seed) = cli.seed {
        settings.seed = seed;
    }
    let delay = Duration::from_millis(cli.delay_ms.unwrap_or(delay_ms));

    tracing::info!(scenario = %name, seed = settings.seed, max_steps, "starting simulation");
    let mut simulator = SimulatorBuilder::new(settings)
        .with_viewer(LogViewer::every(cli.log_every))
        .with_soundtrack(TrackLog::new())
        .build();

    let steps = simulator.run_with_hook(max_steps, |_| {
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    });

    if cli.json {
        let frame = serde_json::to_string_pretty(&simulator.frame())
            .context("Failed to serialize final frame")?;
        println!("{frame}");
    } else {
        println!(
            "Scenario '{}' stopped after {} steps at {}. {}",
            name,
            steps,
            simulator.clock(),
            simulator.stats()
        );
    }
    Ok(())
}
