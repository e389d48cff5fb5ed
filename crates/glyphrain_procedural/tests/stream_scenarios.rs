//! # Stream Scenario Tests
//!
//! Hand-built streams driven through exact tick sequences: falling and slot
//! shifting, bursts, the recycle boundary, and long-run symbol invariants.

use glyphrain_core::{RainConfig, RainSeed, SimRng, ViewingVolume};
use glyphrain_procedural::{Burst, LaneSlot, Stream, StreamInit};

fn volume() -> ViewingVolume {
    ViewingVolume::new(10.0, 9.0, -9.0, -6.0, -28.0)
}

/// Configuration with every stochastic event disabled.
fn quiet_config() -> RainConfig {
    let mut config = RainConfig::default();
    config.flicker.rate = 0.0;
    config.sparkle.rate = 0.0;
    config.burst.rate = 0.0;
    config
}

fn init(head_y: f32, fall_speed: f32) -> StreamInit {
    StreamInit {
        lane: LaneSlot {
            index: 0,
            center: 0.0,
            max_jitter: 0.0,
        },
        x: 0.0,
        depth: -10.0,
        head_y,
        fall_speed,
        glyph_size: 1.0,
        slot_step: 1.0,
        tail_len: 10,
        base_opacity: 0.5,
        hue_jitter: 0.0,
    }
}

#[test]
fn test_fall_shifts_two_slots() {
    let config = quiet_config();
    let volume = volume();
    let mut stream = Stream::from_init(init(volume.top, 2.0), &config, SimRng::from_seed(RainSeed::new(1)));
    let glyphs_before: Vec<_> = stream.glyphs().collect();

    let step = stream.tick(1.0, &volume, &config);

    assert_eq!(stream.head_y(), volume.top - 2.0);
    assert_eq!(step.shifts, 2);
    assert_eq!(stream.distance_accumulator(), 0.0);
    assert!(!step.recycled);

    // Old head and its neighbour moved two slots toward the tail.
    let glyphs_after: Vec<_> = stream.glyphs().collect();
    assert_eq!(&glyphs_after[2..], &glyphs_before[..8]);
}

#[test]
fn test_partial_distance_accumulates() {
    let config = quiet_config();
    let volume = volume();
    let mut stream = Stream::from_init(init(volume.top, 2.0), &config, SimRng::from_seed(RainSeed::new(2)));

    assert_eq!(stream.tick(0.25, &volume, &config).shifts, 0);
    assert_eq!(stream.distance_accumulator(), 0.5);
    assert_eq!(stream.tick(0.25, &volume, &config).shifts, 1);
    assert_eq!(stream.distance_accumulator(), 0.0);
}

#[test]
fn test_burst_lasts_its_duration() {
    let mut burst = Burst::idle();
    assert!(burst.fire(0.5, 1.75));

    let mut active = Vec::new();
    for _ in 0..3 {
        burst.advance(0.2);
        active.push(burst.is_active());
    }

    assert_eq!(active, vec![true, true, false]);
    assert!(burst.elapsed() >= burst.duration());
}

#[test]
fn test_stream_burst_speeds_up_then_ends() {
    let mut config = quiet_config();
    config.burst.min_duration = 0.5;
    config.burst.max_duration = 0.5;
    config.burst.speed_multiplier = 2.0;
    let volume = volume();
    let mut stream = Stream::from_init(init(volume.top, 1.0), &config, SimRng::from_seed(RainSeed::new(3)));

    assert!(stream.force_burst(&config));
    assert!(!stream.force_burst(&config), "no second burst while active");

    let mut active = Vec::new();
    let mut multipliers = Vec::new();
    let mut ended = Vec::new();
    for _ in 0..3 {
        let step = stream.tick(0.2, &volume, &config);
        active.push(stream.burst().is_active());
        multipliers.push(stream.speed_multiplier());
        ended.push(step.burst_ended);
    }

    assert_eq!(active, vec![true, true, false]);
    assert_eq!(ended, vec![false, false, true]);
    assert!(multipliers[0] > 1.0);
    assert!(multipliers[1] > multipliers[0]);
    assert!(stream.burst().elapsed() >= stream.burst().duration());
}

#[test]
fn test_recycle_exactly_at_boundary() {
    let config = quiet_config();
    let volume = volume();
    // head_y + (tail_len - 1) * slot_step == bottom
    let boundary = volume.bottom - 9.0;

    let mut parked = Stream::from_init(init(boundary, 0.0), &config, SimRng::from_seed(RainSeed::new(4)));
    assert!(!parked.is_below(volume.bottom));
    for _ in 0..10 {
        assert!(!parked.tick(0.1, &volume, &config).recycled, "recycled too early");
    }

    let mut falling = Stream::from_init(init(boundary, 0.5), &config, SimRng::from_seed(RainSeed::new(5)));
    let mut recycles = 0;
    for _ in 0..5 {
        if falling.tick(0.1, &volume, &config).recycled {
            recycles += 1;
        }
    }
    assert_eq!(recycles, 1);
    assert_eq!(falling.recycles(), 1);
    assert!(falling.head_y() > volume.top);
    assert_eq!(falling.distance_accumulator(), 0.0);
    assert!(!falling.burst().is_active());
    assert!(!falling.sparkle().is_active());
}

#[test]
fn test_recycled_stream_stays_in_lane_and_depth() {
    let config = RainConfig::default();
    let volume = volume();
    let lane = LaneSlot {
        index: 3,
        center: 2.0,
        max_jitter: 0.2,
    };
    let mut stream = Stream::spawn(lane, &volume, &config, SimRng::from_seed(RainSeed::new(6)));

    for _ in 0..20_000 {
        stream.tick(1.0 / 60.0, &volume, &config);
        assert!((stream.x() - 2.0).abs() <= 0.2);
        assert!(stream.depth() <= volume.near && stream.depth() >= volume.far);
    }
    assert!(stream.recycles() > 0);
}

#[test]
fn test_adjacent_symbols_never_repeat() {
    let mut config = RainConfig::default();
    config.flicker.rate = 30.0;
    config.sparkle.rate = 5.0;
    let volume = volume();
    let lane = LaneSlot {
        index: 0,
        center: 0.0,
        max_jitter: 0.0,
    };
    let mut stream = Stream::spawn(lane, &volume, &config, SimRng::from_seed(RainSeed::new(7)));

    for _ in 0..5_000 {
        stream.tick(1.0 / 60.0, &volume, &config);
        let glyphs: Vec<_> = stream.glyphs().collect();
        assert!(glyphs.windows(2).all(|w| w[0] != w[1]), "{glyphs:?}");
    }
}

#[test]
fn test_sparkle_invariant_over_long_run() {
    let mut config = RainConfig::default();
    config.sparkle.rate = 20.0;
    config.fall.min_tail = 2;
    config.fall.max_tail = 4;
    let volume = volume();
    let lane = LaneSlot {
        index: 0,
        center: 0.0,
        max_jitter: 0.0,
    };

    for seed in 0..20 {
        let mut stream = Stream::spawn(lane, &volume, &config, SimRng::from_seed(RainSeed::new(seed)));
        let mut started = 0;
        for _ in 0..600 {
            started += u32::from(stream.tick(1.0 / 60.0, &volume, &config).sparkle_started);
            if stream.sparkle().is_active() {
                assert!(stream.sparkle().start_index() < stream.tail_len() - 1);
            }
        }
        assert!(started > 0);
    }
}

#[test]
fn test_same_seed_same_stream() {
    let config = RainConfig::default();
    let volume = volume();
    let lane = LaneSlot {
        index: 0,
        center: 0.0,
        max_jitter: 0.3,
    };
    let mut a = Stream::spawn(lane, &volume, &config, SimRng::from_seed(RainSeed::new(8)));
    let mut b = Stream::spawn(lane, &volume, &config, SimRng::from_seed(RainSeed::new(8)));

    for i in 0..3_000 {
        let dt = if i % 7 == 0 { 0.05 } else { 1.0 / 60.0 };
        assert_eq!(a.tick(dt, &volume, &config), b.tick(dt, &volume, &config));
    }
    assert_eq!(a.head_y().to_bits(), b.head_y().to_bits());
    assert_eq!(a.glyphs().collect::<Vec<_>>(), b.glyphs().collect::<Vec<_>>());
}
