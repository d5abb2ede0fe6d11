use criterion::{black_box, criterion_group, criterion_main, Criterion};

use dhakira_core::chat::{Sender, Transcript};
use dhakira_core::progress::{LevelProgress, ProgressTable};
use dhakira_core::quiz::events::DateShape;
use dhakira_core::router::Route;
use dhakira_core::stages::next_stage;

fn bench_unlock(c: &mut Criterion) {
    let table = ProgressTable::from_levels((1..=3).map(|l| {
        (
            l,
            LevelProgress {
                progress: 70.0 + f64::from(l) * 5.0,
                ..Default::default()
            },
        )
    }));

    c.bench_function("is_level_unlocked", |b| {
        b.iter(|| {
            (1..=3)
                .filter(|l| table.is_level_unlocked(black_box(*l)))
                .count()
        })
    });

    c.bench_function("next_stage", |b| {
        b.iter(|| next_stage(black_box("HSL3")))
    });
}

fn bench_transcript(c: &mut Criterion) {
    let mut group = c.benchmark_group("transcript_push");

    for size in [10usize, 100, 500] {
        let mut base = Transcript::new();
        for i in 0..size {
            base.push(Sender::User, format!("سؤال رقم {i}"));
        }
        group.bench_function(format!("n={size}"), |b| {
            b.iter(|| {
                let mut t = base.clone();
                t.push(Sender::Bot, black_box("سؤال رقم 0"))
            })
        });
    }

    group.finish();
}

fn bench_parsing(c: &mut Criterion) {
    c.bench_function("route_parse", |b| {
        b.iter(|| {
            black_box("/topicchat/%D9%85%D8%A4%D8%AA%D9%85%D8%B1")
                .parse::<Route>()
                .ok()
        })
    });

    c.bench_function("date_shape", |b| {
        b.iter(|| DateShape::of(black_box("1954/11/01-1962/07/05")))
    });
}

criterion_group!(benches, bench_unlock, bench_transcript, bench_parsing);
criterion_main!(benches);
