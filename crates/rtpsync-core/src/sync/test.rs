use rand::{rngs::StdRng, Rng, SeedableRng};
use rtpsync_types::{time::rate::ClockRate, traits::time::clock::ManualClock};

use super::*;
use crate::config::{ClockSyncConfig, GapThreshold};

const TS0: u32 = 1_000_000;
const TC0: u64 = 5_000_000;

/// Initialize the test environment
fn test_init() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

/// 90kHz remote clock, local clock ticking once per microsecond
fn synchronizer() -> ClockSynchronizer {
    test_init();
    ClockSynchronizer::new(&ValidatedConfig::default(), &ManualClock::new(1_000_000)).unwrap()
}

/// A synchronizer anchored at (TS0, TC0)
fn anchored() -> ClockSynchronizer {
    let mut sync = synchronizer();
    sync.resync(TS0, TC0);
    sync
}

/// Remote ticks of a 90kHz clock after `us` microseconds, rounded
fn ticks_after(us: u64) -> u32 {
    (us as f64 * 0.09).round() as u32
}

#[test]
fn first_sample_replaces_bootstrap_anchor() {
    let mut sync = synchronizer();
    assert_eq!(sync.anchor(), Anchor::default());
    assert!(!sync.is_anchored());

    let outcome = sync.sync(TS0, TC0);
    assert_eq!(outcome, SyncOutcome::Resynced(ResyncReason::Initial));
    assert!(sync.is_anchored());
    assert_eq!(sync.anchor(), Anchor::new(TS0, TC0));
    assert_eq!(sync.duration(TS0, TC0), 0.0);
    assert_eq!(sync.metrics().initial_anchors, 1);
}

#[test]
fn first_sample_close_to_bootstrap_anchor() {
    let mut sync = synchronizer();
    // neither a gap nor negative drift relative to (0, 0)
    assert_eq!(
        sync.sync(100, 1_000_000),
        SyncOutcome::Resynced(ResyncReason::Initial)
    );
    assert_eq!(sync.anchor(), Anchor::new(100, 1_000_000));
}

#[test]
fn first_sample_in_upper_half() {
    let mut sync = synchronizer();
    // reads as negative relative to the bootstrap timestamp 0
    let ts0 = 0x9000_0000u32;
    assert!(sync.sync(ts0, 1_000_000).is_resync());
    assert_eq!(sync.anchor(), Anchor::new(ts0, 1_000_000));

    // 30fps, local clock slightly fast
    for k in 1..=1000u32 {
        let ts = ts0.wrapping_add(3000 * k);
        let tc = 1_000_000 + 33_334 * k as u64;
        assert_eq!(sync.sync(ts, tc), SyncOutcome::Kept);
        let drift = sync.duration(ts, tc);
        assert!((0.0..1_000.0).contains(&drift), "drift {drift}");
    }
    assert_eq!(sync.anchor().server, ts0);
    assert_eq!(sync.metrics().resyncs(), 1);
}

#[test]
fn manual_resync_anchors() {
    let mut sync = synchronizer();
    sync.resync(0xF000_0000, TC0);
    assert!(sync.is_anchored());
    assert_eq!(sync.sync(0xF000_0000 + 3_000, TC0 + 33_334), SyncOutcome::Kept);
    assert_eq!(sync.metrics().initial_anchors, 0);
}

#[test]
fn consistent_extrapolation() {
    let sync = anchored();
    // half a remote tick in microseconds
    let tolerance = 0.5 / 0.09 + 1e-6;
    for delta in [0u64, 1, 999, 33_333, 100_000, 199_999, 10_000_000] {
        let drift = sync.duration(TS0.wrapping_add(ticks_after(delta)), TC0 + delta);
        assert!(
            drift.abs() <= tolerance,
            "drift {drift} after {delta}us exceeds {tolerance}"
        );
    }
}

#[test]
fn steady_stream_keeps_anchor() {
    let mut sync = anchored();
    // 30fps video, local clock slightly fast
    for k in 1..=1000u64 {
        let ts = TS0.wrapping_add(3000 * k as u32);
        let tc = TC0 + 33_334 * k;
        assert_eq!(sync.sync(ts, tc), SyncOutcome::Kept);
        assert_eq!(sync.last_timestamp(), ts);
    }
    assert_eq!(sync.anchor(), Anchor::new(TS0, TC0));
    assert_eq!(sync.metrics().resyncs(), 1);
}

#[test]
fn gap_resync() {
    let mut sync = anchored();
    assert_eq!(sync.gap_threshold_ticks(), 18_000);

    assert!(sync.sync(TS0 + 20_000, TC0 + 1).is_resync());
    assert_eq!(sync.anchor(), Anchor::new(TS0 + 20_000, TC0 + 1));
    assert_eq!(sync.duration(TS0 + 20_000, TC0 + 1), 0.0);
}

#[test]
fn gap_resync_with_positive_drift() {
    let mut sync = anchored();
    let outcome = sync.sync(TS0 + 20_000, TC0 + 300_000);
    assert_eq!(
        outcome,
        SyncOutcome::Resynced(ResyncReason::Gap { delta_ticks: 20_000 })
    );
    assert_eq!(sync.metrics().gap_resyncs, 1);
}

#[test]
fn gap_is_measured_from_last_timestamp() {
    let mut sync = anchored();
    // many small steps add up to far more than the threshold
    for k in 1..=10u32 {
        let outcome = sync.sync(TS0 + 9_000 * k, TC0 + 100_001 * k as u64);
        assert_eq!(outcome, SyncOutcome::Kept);
    }
}

#[test]
fn negative_drift_resync() {
    let mut sync = anchored();
    // 10ms on the remote clock, only 5ms locally
    match sync.sync(TS0 + 900, TC0 + 5_000) {
        SyncOutcome::Resynced(ResyncReason::NegativeDrift { drift_us }) => {
            assert!((drift_us + 5_000.0).abs() < 1e-6)
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(sync.anchor(), Anchor::new(TS0 + 900, TC0 + 5_000));
    assert_eq!(sync.metrics().negative_drift_resyncs, 1);
}

#[test]
fn wraparound_keeps_anchor() {
    let mut sync = synchronizer();
    sync.resync(0xFFFF_FF00, TC0);

    // 356 ticks (~3956us) across the wrap, 4000us locally
    assert_eq!(sync.sync(100, TC0 + 4_000), SyncOutcome::Kept);
    assert_eq!(sync.last_timestamp(), 100);
    let drift = sync.duration(100, TC0 + 4_000);
    assert!(drift > 0.0 && drift < 50.0, "drift {drift}");
}

#[test]
fn wraparound_gap_resync() {
    let mut sync = synchronizer();
    sync.resync(0xFFFF_F000, TC0);
    // 24096 ticks across the wrap
    let outcome = sync.sync(20_000, TC0 + 1_000_000);
    assert_eq!(
        outcome,
        SyncOutcome::Resynced(ResyncReason::Gap { delta_ticks: 24_096 })
    );
}

#[test]
fn large_backward_jump_resyncs() {
    let mut sync = synchronizer();
    sync.resync(0x8000_0010, TC0);
    assert!(sync.sync(0, TC0 + 1_000).is_resync());
    assert_eq!(sync.anchor().server, 0);
}

#[test]
fn small_backward_step_keeps_anchor() {
    let mut sync = anchored();
    // reordered frame, timestamp slightly behind the last one
    assert_eq!(sync.sync(TS0 - 3_000, TC0 + 1_000), SyncOutcome::Kept);
    assert_eq!(sync.last_timestamp(), TS0 - 3_000);
}

#[test]
fn repeated_sample_is_idempotent() {
    let mut sync = synchronizer();
    assert!(sync.sync(TS0, TC0).is_resync());
    let anchor = sync.anchor();
    assert_eq!(sync.sync(TS0, TC0), SyncOutcome::Kept);
    assert_eq!(sync.anchor(), anchor);

    let metrics = sync.metrics();
    assert_eq!(metrics.samples, 2);
    assert_eq!(metrics.resyncs(), 1);
}

#[test]
fn duration_is_pure() {
    let sync = anchored();
    let before = sync.anchor();
    let _ = sync.duration(TS0 + 900, TC0 + 5_000);
    assert_eq!(sync.anchor(), before);
    assert_eq!(sync.last_timestamp(), TS0);
}

#[test]
fn rejects_zero_client_frequency() {
    let err = ClockSynchronizer::new(&ValidatedConfig::default(), &ManualClock::new(0)).unwrap_err();
    assert_eq!(err, ConfigError::InvalidClientFrequency(0));
}

#[test]
fn sync_now_queries_clock() {
    test_init();
    // 100ns ticks, like a performance counter
    let clock = ManualClock::starting_at(10_000_000, 42);
    let mut sync = ClockSynchronizer::new(&ValidatedConfig::default(), &clock).unwrap();
    assert_eq!(sync.client_frequency(), 10.0);

    assert!(sync.sync_now(TS0, &clock).is_resync());
    assert_eq!(sync.anchor(), Anchor::new(TS0, 42));

    clock.advance(333_340);
    assert_eq!(sync.sync_now(TS0 + 3_000, &clock), SyncOutcome::Kept);
    let drift = sync.duration(TS0 + 3_000, clock.query_counter());
    assert!((drift - 0.6667).abs() < 1e-3, "drift {drift}");
}

#[test]
fn audio_clock_with_wall_clock_threshold() {
    test_init();
    let config = ClockSyncConfig::new(ClockRate::hz(48_000), GapThreshold::Micros(100_000))
        .validate()
        .unwrap();
    let mut sync = ClockSynchronizer::with_client_frequency(&config, 1_000_000).unwrap();
    assert_eq!(sync.gap_threshold_ticks(), 4_800);

    sync.resync(TS0, TC0);
    // 20ms audio frames
    assert_eq!(sync.sync(TS0 + 960, TC0 + 20_001), SyncOutcome::Kept);
    assert!(matches!(
        sync.sync(TS0 + 960 + 5_000, TC0 + 1_000_000),
        SyncOutcome::Resynced(ResyncReason::Gap { delta_ticks: 5_000 })
    ));
}

/// Jittery 90kHz streams fed to fresh synchronizers from random starting
/// points: the first sample anchors and the drift stays within the jitter
#[test]
fn randomized_stream_from_random_start() {
    let mut rng = StdRng::seed_from_u64(0xa11c);

    for _ in 0..16 {
        let mut sync = synchronizer();
        let ts0: u32 = rng.gen();
        let tc0: u64 = rng.gen_range(0..1u64 << 40);

        let mut true_us = 0u64;
        for i in 0..500 {
            let ts = ts0.wrapping_add(ticks_after(true_us));
            let tc = tc0 + true_us + rng.gen_range(0..200);

            let outcome = sync.sync(ts, tc);
            if i == 0 {
                assert_eq!(outcome, SyncOutcome::Resynced(ResyncReason::Initial));
            }
            let drift = sync.duration(ts, tc);
            assert!(
                (0.0..250.0).contains(&drift),
                "drift {drift} at sample {i}, ts0 {ts0:#x}"
            );
            true_us += rng.gen_range(30_000..36_000);
        }

        let metrics = sync.metrics();
        assert_eq!(metrics.initial_anchors, 1);
        assert_eq!(metrics.gap_resyncs, 0);
    }
}

/// Jittery 90kHz stream crossing the 32 bit wrap: the drift to the latest
/// sample stays within the jitter bounds and frame steps never count as gaps
#[test]
fn randomized_stream_across_wrap() {
    let mut sync = synchronizer();
    let mut rng = StdRng::seed_from_u64(0x5eed);

    let start_ts = u32::MAX - 500_000;
    sync.resync(start_ts, TC0);

    let mut true_us = 0u64;
    for _ in 0..5_000 {
        true_us += rng.gen_range(30_000..36_000);
        let ts = start_ts.wrapping_add(ticks_after(true_us));
        let tc = TC0 + true_us + rng.gen_range(0..200);

        let outcome = sync.sync(ts, tc);
        assert!(!matches!(
            outcome,
            SyncOutcome::Resynced(ResyncReason::Gap { .. })
        ));
        let drift = sync.duration(ts, tc);
        assert!((0.0..250.0).contains(&drift), "drift {drift}");
        assert_eq!(sync.last_timestamp(), ts);
    }

    let metrics = sync.metrics();
    assert_eq!(metrics.samples, 5_000);
    assert_eq!(metrics.gap_resyncs, 0);
    // the stream passed the wrap
    assert!(sync.last_timestamp() < start_ts);
}
