use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use env_logger::Builder;
use log::{error, info};

use hedge_model::config::ExperimentConfig;
use hedge_model::output::write_csv;
use hedge_model::parallel::generate_parallel;
use hedge_model::stats::Summary;

#[derive(Parser, Debug)]
#[command(about, long_about = None)]
/// Generates request latency traces for a set of hedging policies
struct Args {
    /// Path to YAML or JSON file with experiment configuration
    #[arg(short, long)]
    config: PathBuf,

    /// Directory for the produced CSV file (overrides output_path from config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Random seed (overrides seed from config)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of threads to use (default - use all available cores)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Print per-technique summary
    #[arg(long)]
    summary: bool,
}

fn run(args: Args) -> hedge_model::error::Result<()> {
    let start = Instant::now();
    let mut config = ExperimentConfig::load(&args.config)?;
    if let Some(output) = args.output {
        config.output_path = output;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    let threads = args
        .threads
        .or_else(|| std::thread::available_parallelism().ok().map(|n| n.get()))
        .unwrap_or(1);
    info!(
        "Generating {} requests for {} functions with {} hedging policies (seed {})",
        config.requests_count,
        config.functions.len(),
        config.hedges.len(),
        config.seed
    );

    let rows = generate_parallel(&config, threads)?;
    let path = write_csv(&config.output_path, &config.output_file, &rows)?;
    info!("Wrote {} rows to {}", rows.len(), path.display());

    if args.summary {
        Summary::from_rows(&rows).print_summary(&args.config.display().to_string());
    }
    info!("Total time of simulation: {:.2?}", start.elapsed());
    Ok(())
}

fn main() -> ExitCode {
    Builder::from_default_env()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
