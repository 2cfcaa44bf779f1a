//! Benchmarks for the per-frame decision logic

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use head_mouse::{
    calibration::{CalibrationBaseline, CalibrationState, CalibrationWindow},
    config::Settings,
    geometry::{Point, Region, Size},
    gesture::{GestureRecognizer, ManualClock},
    motion::MotionMapper,
    utils::expand_eye_pair,
};
use std::time::Duration;

/// Benchmark pointer delta mapping over jittery nose positions
fn bench_motion_mapping(c: &mut Criterion) {
    let mut group = c.benchmark_group("motion");
    let reference = Point::new(320, 240);

    // Nose jitter around the reference point, with occasional large moves
    let positions: Vec<Point> = (0..1000)
        .map(|_| {
            let spread = if rand::random::<f64>() < 0.1 { 120.0 } else { 24.0 };
            Point::new(
                reference.x + ((rand::random::<f64>() - 0.5) * spread) as i32,
                reference.y + ((rand::random::<f64>() - 0.5) * spread) as i32,
            )
        })
        .collect();

    for speed in [0, 5, 10] {
        let settings = Settings {
            speed,
            ..Settings::default()
        };
        group.bench_with_input(BenchmarkId::new("map", speed), &settings, |b, settings| {
            let mapper = MotionMapper::new();
            b.iter(|| {
                for position in &positions {
                    black_box(mapper.map(*position, reference, settings));
                }
            });
        });
    }

    group.finish();
}

/// Benchmark gesture recognition on a noisy salience signal
fn bench_gesture_recognition(c: &mut Criterion) {
    let mut group = c.benchmark_group("gesture");
    let baseline = CalibrationBaseline {
        min_signal: 20,
        max_signal: 40,
        frames_observed: 40,
        state: CalibrationState::Complete,
    };
    let settings = Settings::default();

    let signals: Vec<u32> = (0..1000).map(|_| 10 + (rand::random::<f64>() * 40.0) as u32).collect();

    group.bench_function("observe", |b| {
        let clock = ManualClock::default();
        let mut recognizer = GestureRecognizer::new(&clock);
        b.iter(|| {
            for signal in &signals {
                clock.advance(Duration::from_millis(200));
                black_box(recognizer.observe(*signal, &baseline, &settings));
            }
        });
    });

    group.bench_function("calibrate", |b| {
        b.iter(|| {
            let mut window = CalibrationWindow::default();
            for signal in &signals[..40] {
                black_box(window.observe(*signal));
            }
        });
    });

    group.finish();
}

/// Benchmark the region arithmetic done on every tracked frame
fn bench_region_geometry(c: &mut Criterion) {
    let bounds = Size::new(640, 480);
    let frame = Region::from_size(bounds);
    let detection = Region::new(270, 200, 100, 30);

    c.bench_function("expand_eye_pair", |b| {
        b.iter(|| black_box(expand_eye_pair(black_box(detection), bounds)));
    });

    c.bench_function("search_window", |b| {
        let face = expand_eye_pair(detection, bounds);
        b.iter(|| black_box(black_box(face).search_window().intersect(&frame)));
    });
}

criterion_group!(benches, bench_motion_mapping, bench_gesture_recognition, bench_region_geometry);
criterion_main!(benches);
