//! Synthetic report-document generator for demos and benchmarks.
//!
//! Writes one JSON report document per simulated run, with timestamped
//! filenames so lexicographic order matches run order. Sample values follow
//! slow sinusoids plus seeded pseudo-noise, giving charts with visible
//! structure while staying fully reproducible.
//!
//! Usage:
//!   cargo run --release --bin generate-demo-reports -- --output-dir demo-reports
//!   cargo run --release --bin generate-demo-reports -- --reports 100 --interval-secs 300
//!   cargo run --release --bin generate-demo-reports -- --help

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use clap::Parser;

use report_stats_viewer::store::{ReportDocument, SampleDocument};

#[derive(Parser)]
#[command(name = "generate-demo-reports")]
#[command(about = "Generate synthetic report documents for demos and benchmarks")]
struct Args {
    /// Output directory for report documents
    #[arg(short, long, default_value = "demo-reports")]
    output_dir: PathBuf,

    /// Number of report documents to generate
    #[arg(short, long, default_value = "20")]
    reports: usize,

    /// Seconds between consecutive run starts
    #[arg(long, default_value = "300")]
    interval_secs: u64,

    /// Seed for the pseudo-noise generator
    #[arg(long, default_value = "1")]
    seed: u64,
}

/// Signals emitted per run. Display names carry the unit suffix the
/// identifier transform expects.
const SIGNAL_NAMES: &[&str] = &[
    "runtime (s)",
    "package energy (J)",
    "frequency (Hz)",
    "power (W)",
    "ipc (insn/cycle)",
];

/// Observations aggregated into each sample.
const OBSERVATIONS_PER_SAMPLE: u64 = 8;

/// Splitmix-style pseudo-random stream, deterministic per seed.
struct Noise(u64);

impl Noise {
    /// Next value uniform in [0, 1).
    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_add(0x9e3779b97f4a7c15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
        (z ^ (z >> 31)) as f64 / u64::MAX as f64
    }
}

/// Baseline mean and spread per signal, varied per run by a slow sinusoid.
fn signal_profile(signal: &str) -> (f64, f64) {
    match signal {
        "runtime (s)" => (120.0, 6.0),
        "package energy (J)" => (18_000.0, 900.0),
        "frequency (Hz)" => (2.4e9, 5e7),
        "power (W)" => (180.0, 8.0),
        "ipc (insn/cycle)" => (1.6, 0.08),
        _ => (1.0, 0.1),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    fs::create_dir_all(&args.output_dir).with_context(|| {
        format!("failed to create output directory {}", args.output_dir.display())
    })?;

    let mut noise = Noise(args.seed);
    let base_sec: i64 = 1_760_000_000;

    for i in 0..args.reports {
        let begin_sec = base_sec + (i as u64 * args.interval_secs) as i64;
        let phase = i as f64 / 12.0;

        let samples: Vec<SampleDocument> = SIGNAL_NAMES
            .iter()
            .map(|&signal| {
                let (baseline, spread) = signal_profile(signal);
                let drift = (2.0 * std::f64::consts::PI * phase).sin() * 0.05;
                let jitter = (noise.next_f64() - 0.5) * 0.04;
                SampleDocument {
                    signal: signal.to_string(),
                    mean: baseline * (1.0 + drift + jitter),
                    std: spread * (0.5 + noise.next_f64()),
                    count: OBSERVATIONS_PER_SAMPLE,
                }
            })
            .collect();

        let runtime = samples[0].mean;
        let doc = ReportDocument {
            profile: Some("demo-workload".to_string()),
            host: Some(format!("node-{}", i % 4)),
            begin_sec: Some(begin_sec as f64),
            end_sec: Some(begin_sec as f64 + runtime),
            samples,
        };

        let stamp = Utc
            .timestamp_opt(begin_sec, 0)
            .single()
            .context("demo timestamp out of range")?
            .format("%Y%m%dT%H%M%SZ");
        let path = args.output_dir.join(format!("report-{}.json", stamp));
        let json = serde_json::to_string_pretty(&doc)?;
        fs::write(&path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    eprintln!(
        "Wrote {} report documents to {}",
        args.reports,
        args.output_dir.display()
    );

    Ok(())
}
