//! Vessel Sim headless runner
//!
//! Runs one episode of a registered scenario with a simple line-of-sight
//! autopilot and logs the outcome.

use clap::Parser;
use std::f64::consts::PI;
use std::path::PathBuf;

use vessel_sim::renderer::DrawList;
use vessel_sim::sim::Action;
use vessel_sim::{EnvError, Environment, Settings};

/// Hard stop for runaway episodes (steps)
const MAX_STEPS: u64 = 40_000;
/// Steer per radian of heading error
const STEER_GAIN: f64 = 4.0;

/// Run one path-following episode headless
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Registered scenario name
    #[arg(default_value = "curved_path")]
    scenario: String,

    /// Episode seed
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Settings JSON; defaults are used for anything left out
    #[arg(short = 'c', long)]
    settings: Option<PathBuf>,

    /// Write the resolved settings to this file
    #[arg(long)]
    save_settings: Option<PathBuf>,

    /// Write the final frame's draw commands as JSON
    #[arg(short, long)]
    frame: Option<PathBuf>,
}

fn autopilot(observation: &[f64]) -> Action {
    let heading_error = observation[1] * PI;
    Action::new(1.0, (STEER_GAIN * heading_error).clamp(-1.0, 1.0))
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(path) = &args.save_settings {
        settings.save(path)?;
    }
    let mut env = Environment::new(settings, &args.scenario)?;

    let mut observation = env.reset(args.seed)?;
    loop {
        let result = match env.step(autopilot(&observation)) {
            Ok(result) => result,
            Err(EnvError::EpisodeFinished) => break,
            Err(e) => return Err(e.into()),
        };
        observation = result.observation;
        if env.steps() % 200 == 0 {
            let state = env.state();
            log::debug!(
                "t = {:.1} s, pos ({:.1}, {:.1}), surge {:.2}",
                env.time(),
                state.x,
                state.y,
                state.surge
            );
        }
        if result.done {
            break;
        }
        if env.steps() >= MAX_STEPS {
            log::warn!("Stopping after {} steps without termination", MAX_STEPS);
            break;
        }
    }

    let mut frame = DrawList::new();
    env.render(&mut frame);
    log::info!(
        "Scenario {} seed {}: {} steps, {:.1} s simulated, return {:.2}, final frame {} draw commands",
        args.scenario,
        args.seed,
        env.steps(),
        env.time(),
        env.cumulative_reward(),
        frame.len()
    );
    if let Some(path) = &args.frame {
        std::fs::write(path, frame.to_json()?)?;
        log::info!("Final frame written to {}", path.display());
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    env_logger::init();
    log::info!("Vessel Sim starting...");

    if let Err(e) = run(args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
