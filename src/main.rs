use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use stigmergy_lib::app::{load_config, RunOptions, Runner};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Number of ticks to simulate
    #[arg(short, long, default_value_t = 5000)]
    ticks: u64,

    /// Override the RNG seed from the config
    #[arg(long)]
    seed: Option<u64>,

    /// Ticks between progress reports (0 disables them)
    #[arg(long, default_value_t = 500)]
    report_every: u64,

    /// Print reports as JSON lines
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    stigmergy_core::init_logging();

    let mut config = load_config(&args.config)?;
    if let Some(seed) = args.seed {
        config.world.seed = Some(seed);
    }

    let options = RunOptions {
        ticks: args.ticks,
        report_every: args.report_every,
        json: args.json,
    };
    let mut runner = Runner::new(config, options)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    runner.run(&mut out)?;
    Ok(())
}
