mod types;

use std::env;
use std::path::Path;
use std::process;

use channel::{endpoints, ChannelWriter};
use logger::{Color, Logger};
use types::config::SimConfig;
use types::reporter::ViolationReporter;
use types::scheduler::Scheduler;
use types::sim_error::SimError;

/// Args: an optional run length in simulated minutes and the word `quiet`
/// to suppress per-phase console output.
fn parse_args(config: &mut SimConfig) -> Result<(), SimError> {
    for arg in env::args().skip(1) {
        if arg == "quiet" {
            config.verbose = false;
        } else if let Ok(minutes) = arg.parse::<u32>() {
            config.duration_mins = if minutes == 0 { 60 } else { minutes };
        } else {
            return Err(SimError::InvalidInput);
        }
    }
    Ok(())
}

fn run() -> Result<(), SimError> {
    let mut config = SimConfig::default();
    parse_args(&mut config)?;

    let logger = Logger::new(Path::new("logs"), "atc-sim")?;

    // The notice service must already be listening; without it every
    // violation would be lost, so a refused connection aborts the run.
    let writer = ChannelWriter::connect(endpoints::SIM_TO_AVN)?;
    let reporter = ViolationReporter::start(writer, logger.clone());

    logger.info(
        &format!("Control tower up, simulating {} minutes", config.duration_mins),
        Color::Green,
        true,
    )?;

    let scheduler = Scheduler::new(config, logger.clone());
    scheduler.run(reporter.sender())?;
    reporter.shutdown();

    logger.info("Simulation finished", Color::Green, true)?;
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("atc-sim failed: {}", e);
        process::exit(1);
    }
}
