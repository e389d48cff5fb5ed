//! # GLYPHRAIN Headless Runner
//!
//! Runs the rain field without a renderer and prints frame statistics.
//!
//! ```bash
//! glyphrain_headless                       # defaults, 600 frames
//! glyphrain_headless rain.toml --frames 3600
//! glyphrain_headless --print-default-config > rain.toml
//! RUST_LOG=glyphrain=debug glyphrain_headless
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use glyphrain::{run_frames, FrameClock, FrameTiming, RainConfig, RainEngine, Viewport};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_FRAMES: u64 = 600;
const FIXED_DT: f32 = 1.0 / 60.0;
const VIEWPORT: Viewport = Viewport::new(1920.0, 1080.0);
const USAGE: &str = "usage: glyphrain_headless [config.toml] [--frames N] [--print-default-config]";

/// Parsed command line.
#[derive(Debug, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    frames: u64,
    print_default_config: bool,
    help: bool,
}

fn parse_args(argv: impl IntoIterator<Item = String>) -> Result<Args, String> {
    let mut args = Args {
        config: None,
        frames: DEFAULT_FRAMES,
        print_default_config: false,
        help: false,
    };
    let mut iter = argv.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--frames" => {
                let value = iter.next().ok_or("--frames needs a value")?;
                args.frames = value
                    .parse()
                    .map_err(|e| format!("invalid --frames value {value:?}: {e}"))?;
            }
            "--print-default-config" => args.print_default_config = true,
            "-h" | "--help" => args.help = true,
            flag if flag.starts_with('-') => return Err(format!("unknown flag {flag}")),
            path => args.config = Some(PathBuf::from(path)),
        }
    }
    Ok(args)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    if args.help {
        println!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    if args.print_default_config {
        return match RainConfig::default().to_toml_string() {
            Ok(toml) => {
                print!("{toml}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!(error = %e, "failed to serialize default config");
                ExitCode::FAILURE
            }
        };
    }

    let config = match &args.config {
        Some(path) => match RainConfig::from_path(path) {
            Ok(config) => config,
            Err(e) => {
                error!(error = %e, "failed to load config");
                return ExitCode::FAILURE;
            }
        },
        None => RainConfig::default(),
    };

    println!("═══════════════════════════════════════════════════════════════════");
    println!("                    GLYPHRAIN HEADLESS");
    println!("═══════════════════════════════════════════════════════════════════");

    let mut engine = RainEngine::for_viewport(config, VIEWPORT);
    info!(
        viewport = ?VIEWPORT,
        streams = engine.streams().len(),
        lanes_dropped = engine.layout().dropped(),
        particles = engine.particles().len(),
        frames = args.frames,
        "running"
    );

    let mut clock = FrameClock::new(FrameTiming::Fixed(FIXED_DT), engine.config().engine.max_dt);
    let stats = run_frames(&mut engine, &mut clock, args.frames);
    stats.print_summary();

    let summary = engine.dispose();
    println!();
    println!(
        "Simulated {:.1} s over {} ticks: {} recycles, {} travel cycles",
        summary.time, summary.ticks, summary.recycles, summary.travel_cycles
    );
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Result<Args, String> {
        parse_args(argv.iter().map(|s| (*s).to_string()))
    }

    #[test]
    fn test_help_is_not_an_error() {
        assert!(parse(&["--help"]).expect("help parses").help);
        assert!(parse(&["rain.toml", "-h"]).expect("help parses").help);
    }

    #[test]
    fn test_config_and_frames() {
        let args = parse(&["rain.toml", "--frames", "42"]).expect("valid args");
        assert_eq!(args.config, Some(PathBuf::from("rain.toml")));
        assert_eq!(args.frames, 42);
        assert!(!args.help);
    }

    #[test]
    fn test_bad_arguments_are_errors() {
        assert!(parse(&["--frames"]).is_err());
        assert!(parse(&["--frames", "many"]).is_err());
        assert!(parse(&["--verbose"]).is_err());
    }
}
