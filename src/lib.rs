// Recital - Performance Comparison
// Main library entry point

pub mod commands;
pub mod config;
pub mod conversion;
pub mod similarity;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use serde::Serialize;

use crate::commands::ErrorPayload;
use crate::config::Config;

const USAGE: &str = "\
Usage:
  recital compare <file1.mid> <file2.mid>
  recital convert <audio-file>
  recital convert-video <video-file>

Options:
  --config <path>   Config file (default: <config dir>/recital/config.toml)
  --verbose         Extra debug output";

/// Parse command-line arguments, run one request and print its JSON result
pub fn run() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let verbose = args.iter().any(|a| a == "--verbose");
    let config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from);

    // Init logging
    let log_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let positional = positional_args(&args);
    let config_path = config_path.unwrap_or_else(config::default_config_path);
    let config = Config::load_or_default(&config_path);
    log::debug!("Using config from {}", config_path.display());

    let outcome = match positional.as_slice() {
        ["compare", a, b] => render(
            commands::compare_midi_files(Path::new(a), Path::new(b), &config),
            &config,
        ),
        ["convert", audio] => {
            render(commands::convert_audio_file(Path::new(audio), &config), &config)
        }
        ["convert-video", video] => {
            render(commands::convert_video_file(Path::new(video), &config), &config)
        }
        _ => {
            eprintln!("{}", USAGE);
            return ExitCode::from(2);
        }
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log::error!("Failed to write output: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Arguments that are neither flags nor flag values
fn positional_args(args: &[String]) -> Vec<&str> {
    let mut positional = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                iter.next();
            }
            "--verbose" => {}
            other => positional.push(other),
        }
    }
    positional
}

/// Print the result or its error payload; returns whether the request succeeded
fn render<T: Serialize>(result: Result<T, ErrorPayload>, config: &Config) -> anyhow::Result<bool> {
    let (json, ok) = match &result {
        Ok(value) => (to_json(value, config.pretty_json)?, true),
        Err(payload) => (to_json(payload, config.pretty_json)?, false),
    };
    println!("{}", json);
    Ok(ok)
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}
