//! Easing, timeline and scroll observer benchmarks.
// criterion_group! expands to an undocumented pub fn
#![allow(missing_docs)]

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vitrine::animation::{Ease, Position, Property, PropertyStore, TargetId, Timeline, Tween};
use vitrine::scroll::{Mode, Rect, ScrollObserver, ScrollTrigger, Viewport};
use web_time::Instant;

const VIEW: Viewport = Viewport::new(1280.0, 800.0);

fn easing_benchmark(c: &mut Criterion) {
    let f = Ease::CubicHermite { c1: 0.33, c2: 1.0 };
    c.bench_function("cubic_hermite_easing", |b| {
        b.iter(|| black_box(f.evaluate(black_box(0.5))))
    });
    let f = Ease::ElasticOut {
        amplitude: 1.0,
        period: 0.3,
    };
    c.bench_function("elastic_out_easing", |b| {
        b.iter(|| black_box(f.evaluate(black_box(0.5))))
    });
}

fn staggered(count: u32) -> Timeline<()> {
    let mut timeline = Timeline::new();
    let targets = (0..count).map(|i| TargetId::indexed("particle", i));
    let _ = timeline.add(
        Tween::to(targets)
            .prop(Property::Y, -20.0)
            .prop(Property::Opacity, 0.5)
            .duration(2.0)
            .stagger(0.01)
            .ease(Ease::SineInOut),
        Position::End,
    );
    timeline
}

fn timeline_seek_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("timeline_seek");

    for count in [10, 50, 100, 500] {
        let mut timeline = staggered(count);
        let mut store = PropertyStore::new();
        let mut t = 0.0;
        group.bench_function(format!("{count}_targets"), |b| {
            b.iter(|| {
                t = (t + 0.016) % 2.0;
                black_box(timeline.seek(black_box(t), &mut store))
            })
        });
    }
    group.finish();
}

fn timeline_advance_benchmark(c: &mut Criterion) {
    let mut timeline = staggered(100);
    let mut store = PropertyStore::new();
    let t0 = Instant::now();
    timeline.play(t0);
    let mut frame = 0u32;
    c.bench_function("timeline_advance_100_targets", |b| {
        b.iter(|| {
            frame += 1;
            let now = t0 + Duration::from_millis(u64::from(frame % 120) * 16);
            if !timeline.is_playing() {
                timeline.play(now);
            }
            black_box(timeline.advance(now, &mut store))
        })
    });
}

fn scroll_update_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("scroll_update");

    for count in [4, 16, 64] {
        let mut observer = ScrollObserver::new(VIEW);
        for i in 0..count {
            let rect = Rect::new(i as f32 * 800.0, 0.0, 1280.0, 800.0);
            let mode = if i % 2 == 0 {
                Mode::Scrub(Some(0.6))
            } else {
                Mode::Toggle("play none none reverse".parse().unwrap())
            };
            let _ = observer
                .register(ScrollTrigger::new(rect, "top center", "bottom center", mode).unwrap())
                .unwrap();
        }
        let t0 = Instant::now();
        let mut frame = 0u32;
        group.bench_function(format!("{count}_bindings"), |b| {
            b.iter(|| {
                frame += 1;
                let scroll = (frame % 500) as f32 * 10.0;
                let now = t0 + Duration::from_millis(u64::from(frame) * 16);
                black_box(observer.update(black_box(scroll), VIEW, now))
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    easing_benchmark,
    timeline_seek_benchmark,
    timeline_advance_benchmark,
    scroll_update_benchmark
);
criterion_main!(benches);
