use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crossway::simulation::{reference_scenario, Engine, Report};

#[derive(Parser)]
#[command(name = "crossway")]
#[command(about = "Discrete-event simulation of traffic through signalized intersections")]
struct Cli {
    /// Total simulated time in seconds
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    execution_time_s: u64,

    /// Seconds between signal phase changes
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    phase_duration_s: u64,

    /// Random seed for reproducible runs
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() {
    // Diagnostics go to stderr so the result block on stdout stays
    // clean; RUST_LOG selects verbosity.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(report) => print!("{report}"),
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<Report> {
    info!(
        execution_time_s = cli.execution_time_s,
        phase_duration_s = cli.phase_duration_s,
        seed = cli.seed,
        "starting simulation"
    );

    let mut engine = Engine::new(
        reference_scenario(),
        cli.execution_time_s,
        cli.phase_duration_s,
        cli.seed,
    )?;
    engine.run()?;

    Ok(engine.report())
}
