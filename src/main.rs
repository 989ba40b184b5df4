//! Horde Run headless runner
//!
//! Plays a lane to the end with a scripted pointer and prints the final
//! snapshot as JSON.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use horde_run::{Lane, LaneConfig, LaneState, Tunables};

#[derive(Parser, Debug)]
#[command(name = "horde-run")]
#[command(about = "Play a horde-runner lane headlessly and print the final snapshot")]
struct Cli {
    /// Level JSON file; the demo lane is used when omitted
    level: Option<PathBuf>,
    /// Seed for spawn jitter
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Tunables JSON file; defaults are used when omitted
    #[arg(long)]
    tunables: Option<PathBuf>,
    /// Hard stop for levels that never reach their end
    #[arg(long, default_value_t = 100_000)]
    max_frames: u32,
}

fn read_json(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn load_level(path: Option<&Path>) -> Result<LaneConfig> {
    match path {
        Some(path) => {
            log::info!("Loading level from {}", path.display());
            LaneConfig::from_json(&read_json(path)?)
                .with_context(|| format!("invalid level {}", path.display()))
        }
        None => {
            log::info!("No level given, using the demo lane");
            Ok(LaneConfig::default())
        }
    }
}

fn load_tunables(path: Option<&Path>) -> Result<Tunables> {
    match path {
        Some(path) => Tunables::from_json(&read_json(path)?)
            .with_context(|| format!("invalid tunables {}", path.display())),
        None => Ok(Tunables::default()),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = load_level(cli.level.as_deref())?;
    let tunables = load_tunables(cli.tunables.as_deref())?;
    let mut lane = Lane::new(&config, tunables, cli.seed).context("failed to build lane")?;

    let (left, right) = config.pointer_band();
    let center = config.view * 0.5;
    lane.start();

    let mut frame = 0;
    while lane.state() != LaneState::End && frame < cli.max_frames {
        // Sweep the pointer across the lane
        let sway = (frame as f32 * 0.02).sin() * (right - left) * 0.5;
        let x = (center.x + sway).clamp(left, right);
        lane.set_pointer(Vec2::new(x, center.y));
        lane.update(1.0);
        frame += 1;

        if frame % 200 == 0 {
            log::info!(
                "Frame {}: scroll {:.0}/{:.0}, squad {}",
                frame,
                lane.scroll(),
                lane.length(),
                lane.squad_size()
            );
        }
    }

    if lane.state() != LaneState::End {
        log::warn!("Stopped after {} frames without reaching the end", frame);
        lane.end();
    }
    log::info!("Finished in {} frames with {} soldiers", frame, lane.squad_size());

    println!("{}", serde_json::to_string_pretty(&lane.snapshot())?);
    Ok(())
}
