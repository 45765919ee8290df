//! Shake Gesture Engine replay tool
//!
//! Runs a recorded accelerometer log through the detector and prints one JSON
//! line per recognized gesture. Useful for tuning thresholds against real
//! captures before shipping them to the host app.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::{error, info};
use thiserror::Error;

use shake_sensing::replay;
use shake_sensing::{
    ConfigError, DetectorConfig, GestureDetector, RecognitionPolicy, ReplayError, Sensitivity,
};

/// Replay an accelerometer log through the shake detector
#[derive(Parser, Debug)]
#[command(name = "shake-replay", author, version, about, long_about = None)]
struct Cli {
    /// CSV log with `timestamp_ms,x,y,z` columns
    #[arg(short, long)]
    input: PathBuf,

    /// TOML detector config; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Recognition policy
    #[arg(short, long, value_enum)]
    policy: Option<PolicyArg>,

    /// Delta magnitude threshold in raw sensor units
    #[arg(short, long, conflicts_with = "sensitivity")]
    threshold: Option<f32>,

    /// Host sensitivity slider position (0 to 50)
    #[arg(short, long)]
    sensitivity: Option<u32>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    SingleJolt,
    DoubleShake,
}

impl From<PolicyArg> for RecognitionPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::SingleJolt => RecognitionPolicy::SingleJolt,
            PolicyArg::DoubleShake => RecognitionPolicy::DoubleShake,
        }
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Replay(#[from] ReplayError),

    #[error("encoding event: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("shake-replay: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = match &cli.config {
        Some(path) => DetectorConfig::from_file(path)?,
        None => DetectorConfig::default(),
    };

    if let Some(policy) = cli.policy {
        config.policy = policy.into();
    }
    if let Some(threshold) = cli.threshold {
        config.threshold = threshold;
    }
    if let Some(progress) = cli.sensitivity {
        config.threshold = Sensitivity::new(progress)?.threshold();
    }

    let samples = replay::load_samples(&cli.input)?;
    info!(
        "replaying {} samples from {} ({}, threshold {:.2})",
        samples.len(),
        cli.input.display(),
        config.policy.as_str(),
        config.threshold,
    );

    let mut detector = GestureDetector::new(config, || {})?;
    let events = replay::replay(&mut detector, &samples);

    for event in &events {
        println!("{}", serde_json::to_string(event)?);
    }

    info!(
        "{} gesture(s) in {} samples, torch {}",
        events.len(),
        detector.samples_seen(),
        if events.last().is_some_and(|e| e.torch_on) { "on" } else { "off" },
    );

    Ok(())
}
