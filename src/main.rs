//! `noesis`: drive the geometry engine from a script of input events.

mod output;
mod script;

use std::fs::File;
use std::io::{self, BufRead, BufReader};

use clap::{Args, Parser, Subcommand};
use geometry::config::{EngineConfig, SnapPolicy};
use geometry::engine::Engine;
use tracing::{debug, info};

use crate::output::SceneWriter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("scene encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("script line {line}: {message}")]
    Script { line: usize, message: String },
}

#[derive(Parser, Debug)]
#[command(name = "noesis", about = "Interactive geometry engine, driven from the command line")]
struct Cli {
    /// Log engine transitions at debug level on stderr.
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a JSON-lines event script and print the resulting scene.
    Replay(ReplayArgs),
}

#[derive(Args, Debug)]
struct ReplayArgs {
    #[arg(long, env = "NOESIS_SCRIPT", default_value = "-", help = "Script file path, or - for stdin")]
    input: String,

    #[arg(long, default_value_t = 800.0)]
    width: f64,

    #[arg(long, default_value_t = 600.0)]
    height: f64,

    #[arg(long, help = "Initial pixels per model unit")]
    scale: Option<f64>,

    #[arg(long, help = "Pick tolerance in pixels")]
    tolerance: Option<f64>,

    #[arg(long, help = "Grid snap step in model units")]
    snap_step: Option<f64>,

    #[arg(long, default_value_t = false, help = "Snap created and dragged points to the grid")]
    snap: bool,

    #[arg(long, help = "Zoom factor per wheel notch")]
    zoom_step: Option<f64>,

    #[arg(long, default_value_t = false, help = "Print a scene after every event that changed something")]
    every: bool,
}

impl ReplayArgs {
    /// Environment-derived config with any flags layered on top.
    fn config(&self) -> EngineConfig {
        let base = EngineConfig::from_env();
        let snap = match (self.snap, self.snap_step, base.snap) {
            (_, Some(step), _) | (true, None, SnapPolicy::Grid { step }) => SnapPolicy::Grid { step },
            (true, None, SnapPolicy::Off) => SnapPolicy::grid(),
            (false, None, policy) => policy,
        };
        EngineConfig {
            pick_tolerance_px: self.tolerance.unwrap_or(base.pick_tolerance_px),
            snap,
            zoom_step: self.zoom_step.unwrap_or(base.zoom_step),
            initial_scale: self.scale.unwrap_or(base.initial_scale),
        }
    }
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt().with_writer(io::stderr).with_max_level(level).init();

    match cli.command {
        Command::Replay(args) => run_replay(&args),
    }
}

fn run_replay(args: &ReplayArgs) -> Result<(), CliError> {
    let reader: Box<dyn BufRead> = if args.input == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(File::open(&args.input)?))
    };

    let mut engine = Engine::new(SceneWriter::new(io::stdout().lock()), args.config());
    engine.core.set_viewport(args.width, args.height);

    let mut applied = 0_usize;
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let event = script::parse_line(&line).map_err(|error| CliError::Script {
            line: index + 1,
            message: error.to_string(),
        })?;
        let Some(event) = event else {
            continue;
        };

        let actions = script::apply(&mut engine.core, &event);
        debug!(line = index + 1, ?event, ?actions, "event applied");
        applied += 1;
        if args.every {
            engine.frame()?;
        }
    }

    if !args.every || engine.renderer().frames() == 0 {
        engine.frame()?;
    }

    info!(
        events = applied,
        frames = engine.renderer().frames(),
        objects = engine.core.store.len(),
        "replay complete"
    );
    Ok(())
}
