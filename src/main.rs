//! Neutralizer headless runner
//!
//! Loads a level, plays it with the seeded demo driver for a number of fixed
//! ticks and prints the final level snapshot as JSON.
//!
//! Usage: `neutralizer <level> [--ticks N] [--seed S] [--tuning FILE]`

#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use clap::Parser;
    use neutralizer::consts::SIM_DT;
    use neutralizer::sim::{DemoDriver, SimEvent};
    use neutralizer::tuning::TuningError;
    use neutralizer::{Level, LevelError, Tuning, tick};
    use thiserror::Error;

    /// Ticks to run a player life before putting it back on the start point
    const RESPAWN_DELAY_TICKS: u32 = 60;

    #[derive(Debug, Error)]
    pub enum RunError {
        #[error(transparent)]
        Tuning(#[from] TuningError),
        #[error(transparent)]
        Level(#[from] LevelError),
        #[error("failed to encode snapshot: {0}")]
        Snapshot(#[from] serde_json::Error),
    }

    /// Play a level headless with seeded demo inputs and print the final snapshot as JSON
    #[derive(Debug, Parser)]
    #[command(author, version, about, long_about = None)]
    pub struct Args {
        /// Level file to load
        level: PathBuf,
        /// Number of fixed ticks to run
        #[arg(long, default_value_t = 600)]
        ticks: u64,
        /// Seed for the demo input driver
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// JSON tuning file; defaults are used when absent
        #[arg(long, value_name = "FILE")]
        tuning: Option<PathBuf>,
    }

    pub fn run(args: Args) -> Result<(), RunError> {
        let tuning = Tuning::load_or_default(args.tuning.as_deref())?;
        let mut level = Level::load(&args.level, tuning)?;
        let mut driver = DemoDriver::new(args.seed);
        let mut dead_for = 0;

        log::info!("Running {} ticks with seed {}", args.ticks, args.seed);

        for _ in 0..args.ticks {
            let input = driver.next_input(&level);
            tick(&mut level, &input, SIM_DT);

            for event in level.drain_events() {
                match event {
                    SimEvent::Impact(impact) => log::info!("t={} {impact:?}", level.time_ticks),
                    SimEvent::ProjectileLeftLevel | SimEvent::Jumped => {
                        log::trace!("t={} {event:?}", level.time_ticks)
                    }
                    _ => log::debug!("t={} {event:?}", level.time_ticks),
                }
            }

            if level.has_reached_exit() {
                break;
            }
            if !level.is_player_alive() {
                dead_for += 1;
                if dead_for >= RESPAWN_DELAY_TICKS {
                    level.restart();
                    dead_for = 0;
                }
            }
        }

        log::info!(
            "Stopped at tick {} (exit reached: {}, {} charges left)",
            level.time_ticks,
            level.has_reached_exit(),
            level.entities().charge_count()
        );
        println!("{}", serde_json::to_string_pretty(&level.snapshot())?);
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Neutralizer (headless) starting...");

    let args = headless::Args::parse();
    if let Err(err) = headless::run(args) {
        log::error!("{err}");
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is driven by the embedding host on the web
}
