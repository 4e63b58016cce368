//! Hawkes LOB simulation entry point.
//!
//! Wires a parameter bundle into the simulator, streams every event into a
//! CSV file and logs a live-market line per event. The bundle can be loaded
//! from a JSON file; missing fields fall back to the built-in demo regime.
//!
//! Usage:
//!   cargo run --bin simulate -- --events 800 --output lob_events.csv
//!   cargo run --bin simulate -- --params regime.json --seed 7

use std::fs::File;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::info;

use hawkes_lob::{
    CsvLogger, Error, EventProcess, HawkesUnivariate, PoissonProcess, SimulationParams, Simulator,
};

#[derive(Parser, Debug)]
#[command(name = "simulate")]
#[command(about = "Hawkes-driven limit order book simulator")]
struct Args {
    /// Number of events to simulate
    #[arg(long, default_value_t = 800)]
    events: usize,

    /// Parameter bundle JSON file (fields missing from the file keep their
    /// defaults)
    #[arg(long)]
    params: Option<PathBuf>,

    /// Output CSV path
    #[arg(long, default_value = "lob_events.csv")]
    output: PathBuf,

    /// Override the Hawkes RNG seed from the bundle
    #[arg(long)]
    seed: Option<u64>,

    /// Override the placement RNG seed from the bundle
    #[arg(long)]
    placement_seed: Option<u64>,

    /// Generator family driving the book
    #[arg(long, value_enum, default_value = "hawkes-multi")]
    process: ProcessKind,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProcessKind {
    /// State-dependent six-dimensional Hawkes (the hybrid simulation)
    HawkesMulti,
    /// Univariate Hawkes with a built-in price model
    HawkesUni,
    /// Homogeneous Poisson null model
    Poisson,
}

fn main() -> Result<(), Error> {
    env_logger::init();
    let args = Args::parse();

    let mut params = match &args.params {
        Some(path) => serde_json::from_reader(File::open(path)?)?,
        None => SimulationParams::default(),
    };
    if let Some(seed) = args.seed {
        params.seed = seed;
    }
    if let Some(seed) = args.placement_seed {
        params.placement_seed = seed;
    }

    let mut sim = match args.process {
        ProcessKind::HawkesMulti => Simulator::new(&params)?,
        ProcessKind::HawkesUni => {
            let process = HawkesUnivariate::new(
                1.5,
                0.6,
                1.5,
                params.price_center,
                params.tick_size,
                params.qty_min,
                params.qty_max,
                params.seed,
            )?;
            Simulator::with_process(
                EventProcess::HawkesUnivariate(process),
                params.price_center,
                params.tick_size,
                params.placement_seed,
            )
        }
        ProcessKind::Poisson => {
            let process = PoissonProcess::new(
                6.0,
                params.price_center,
                params.tick_size,
                params.qty_min,
                params.qty_max,
                params.seed,
            )?;
            Simulator::with_process(
                EventProcess::Poisson(process),
                params.price_center,
                params.tick_size,
                params.placement_seed,
            )
        }
    };

    let mut logger = CsvLogger::create(&args.output)?;

    for _ in 0..args.events {
        let obs = sim.step();
        logger.log(&obs)?;

        if let (Some(mid), Some(spread)) = (obs.mid, obs.spread) {
            let displayed_spread = if spread < 1e-8 { 0.0 } else { spread };
            info!(
                "t={:.4} mid={:.4} spread={:.4} evt={} side={} qty={}",
                obs.t, mid, displayed_spread, obs.event_type, obs.side, obs.quantity
            );
        }
    }
    logger.flush()?;

    info!(
        "Wrote {} events to {}",
        args.events,
        args.output.display()
    );
    Ok(())
}
