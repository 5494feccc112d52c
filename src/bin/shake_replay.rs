use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use flate2::read::GzDecoder;
use log::{info, warn};
use musicplayer_jni::{AccelSample, ActionKind, ShakeConfig, ShakeDetector};
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[command(name = "shake_replay")]
#[command(about = "Replay a recorded accelerometer log through the shake detector", long_about = None)]
struct Args {
    /// Path to a sensor log (*.json or *.json.gz)
    #[arg(long)]
    log: PathBuf,

    /// Shake threshold in tenths, as stored in the shake_threshold preference
    #[arg(long, default_value = "80")]
    threshold: i32,

    /// Action to emit (Nothing, PlayPause, NextSong, PreviousSong)
    #[arg(long, default_value = "NextSong", value_parser = parse_action)]
    action: ActionKind,

    /// Minimum milliseconds between shake actions
    #[arg(long, default_value = "500")]
    min_period_ms: i64,

    /// Print the report as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn parse_action(s: &str) -> Result<ActionKind, String> {
    s.parse().map_err(|e: musicplayer_jni::MusicPlayerError| e.to_string())
}

#[derive(Deserialize)]
struct AccelData {
    x: f64,
    y: f64,
    z: f64,
}

#[derive(Deserialize)]
struct Reading {
    /// Seconds
    timestamp: f64,
    accel: Option<AccelData>,
}

#[derive(Deserialize)]
struct LogFile {
    readings: Vec<Reading>,
}

#[derive(Debug, Serialize, PartialEq)]
struct Trigger {
    timestamp_ms: i64,
    action: ActionKind,
    filtered_jerk: f64,
}

#[derive(Debug, Serialize)]
struct Report {
    config: ShakeConfig,
    accel_samples: usize,
    skipped_samples: usize,
    triggers: Vec<Trigger>,
}

fn load_log(path: &Path) -> anyhow::Result<LogFile> {
    let file = File::open(path)?;
    let reader: Box<dyn Read> = if path.extension().map(|e| e == "gz").unwrap_or(false) {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(serde_json::from_reader(BufReader::new(reader))?)
}

fn replay(log: &LogFile, config: ShakeConfig) -> Report {
    let mut detector = ShakeDetector::new(Arc::new(config.clone()));
    let mut accel_samples = 0;
    let mut skipped_samples = 0;
    let mut triggers = Vec::new();

    for reading in &log.readings {
        let Some(accel) = &reading.accel else {
            continue;
        };
        let timestamp_ms = (reading.timestamp * 1000.0).round() as i64;
        let sample = AccelSample::new(accel.x, accel.y, accel.z, timestamp_ms);
        if !sample.is_finite() {
            skipped_samples += 1;
            continue;
        }
        accel_samples += 1;

        if let Some(action) = detector.on_sample(&sample, timestamp_ms) {
            triggers.push(Trigger {
                timestamp_ms,
                action,
                filtered_jerk: detector.state().filtered_jerk,
            });
        }
    }

    Report {
        config,
        accel_samples,
        skipped_samples,
        triggers,
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = ShakeConfig::new(
        f64::from(args.threshold) / 10.0,
        args.min_period_ms,
        args.action,
    );
    info!("Replaying {} with {:?}", args.log.display(), config);

    let log = load_log(&args.log)?;
    let report = replay(&log, config);
    if report.skipped_samples > 0 {
        warn!("Skipped {} non-finite samples", report.skipped_samples);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{} accel samples, {} shakes (threshold {:.1}, period {} ms)",
            report.accel_samples,
            report.triggers.len(),
            report.config.threshold,
            report.config.min_period_ms
        );
        for trigger in &report.triggers {
            println!(
                "  t={:>8} ms  jerk={:>6.2}  {}",
                trigger.timestamp_ms, trigger.filtered_jerk, trigger.action
            );
        }
    }

    Ok(())
}
