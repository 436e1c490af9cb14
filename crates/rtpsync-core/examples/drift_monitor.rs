use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use rand::Rng;
use rtpsync_core::{
    ClockSyncConfig, ClockSyncMetrics, ClockSynchronizer, DriftReader, SharedClockSynchronizer,
    SyncOutcome,
};
use rtpsync_types::traits::time::clock::{ManualClock, MonotonicClockSource};

/// Feeds a simulated 90kHz video stream into a synchronizer and reports the drift
#[derive(Parser)]
struct CmdLine {
    /// TOML file with synchronizer options
    #[clap(short, long)]
    config: Option<String>,

    /// Number of frames to simulate
    #[clap(short, long, default_value_t = 900)]
    frames: u32,

    /// Frames per second of the stream
    #[clap(long, default_value_t = 30)]
    fps: u32,

    /// Rate error of the local clock in parts per million
    #[clap(long, default_value_t = 50.0, allow_hyphen_values = true)]
    skew_ppm: f64,

    /// Maximum network jitter in microseconds
    #[clap(long, default_value_t = 2_000)]
    jitter_us: u64,

    /// Restart the stream with a new random timestamp after this many frames
    #[clap(long)]
    restart_at: Option<u32>,

    #[clap(long, short, default_value = "info")]
    log_level: tracing::Level,
}

fn load_config(path: &str) -> Result<ClockSyncConfig> {
    toml::from_str(
        &fs::read_to_string(path)
            .with_context(|| format!("failed to read config file from: {}", path))?,
    )
    .with_context(|| format!("failed to parse config file from: {}", path))
}

fn report(reader: &DriftReader, metrics: &ClockSyncMetrics, ts: u32, tc: u64) {
    tracing::info!(
        "drift: {:>9.1}us [anchor: {}] [samples: {}] [neg: {}] [gap: {}]",
        reader.duration(ts, tc),
        reader.version(),
        metrics.samples,
        metrics.negative_drift_resyncs,
        metrics.gap_resyncs,
    );
}

fn main() -> Result<()> {
    let args = CmdLine::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ClockSyncConfig::default(),
    }
    .validate()
    .context("invalid synchronizer config")?;
    tracing::info!(
        "server clock {} ({:.3} ticks/us), gap threshold {} ticks",
        config.server_clock_rate(),
        config.server_frequency(),
        config.gap_threshold_ticks()
    );

    // 100ns ticks, like a performance counter
    let clock = ManualClock::new(10_000_000);
    let mut sync = SharedClockSynchronizer::new(ClockSynchronizer::new(&config, &clock)?);
    let reader = sync.reader();

    let mut rng = rand::thread_rng();
    let mut ts_origin: u32 = rng.gen();
    let frame_us = 1.0e6 / args.fps.max(1) as f64;
    let local_ticks_per_us =
        clock.query_frequency() as f64 / 1.0e6 * (1.0 + args.skew_ppm / 1.0e6);

    let mut last_local = 0u64;
    for frame in 0..args.frames {
        if Some(frame) == args.restart_at {
            ts_origin = rng.gen();
            tracing::info!("stream restarted at frame {frame}");
        }
        let true_us = frame as f64 * frame_us;
        // truncate to 32 bits so long runs wrap like a real stream
        let ticks = (true_us * config.server_frequency()).round() as u64;
        let ts = ts_origin.wrapping_add(ticks as u32);

        let jitter = rng.gen_range(0..=args.jitter_us) as f64;
        let arrival = ((true_us + jitter) * local_ticks_per_us) as u64;
        // packets can arrive out of order, the counter cannot go back
        if arrival > last_local {
            clock.advance(arrival - last_local);
            last_local = arrival;
        }

        if let SyncOutcome::Resynced(reason) = sync.sync_now(ts, &clock) {
            tracing::debug!("frame {frame}: {reason:?}");
        }
        if frame % args.fps.max(1) == 0 {
            report(&reader, &sync.metrics(), ts, clock.query_counter());
        }
    }

    let metrics = sync.metrics();
    tracing::info!(
        "done: {} samples, {} resyncs ({} negative drift, {} gap)",
        metrics.samples,
        metrics.resyncs(),
        metrics.negative_drift_resyncs,
        metrics.gap_resyncs
    );
    Ok(())
}
