//! Duel throughput benchmarks: fights per second for short and capped duels.
//!
//! Run with: `cargo bench --bench simulator`

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use bestiary::battle::{simulate_fight, simulate_seeded, FixedRandom, Rng};
use bestiary::data::{BaseStats, Creature};

fn fighter(id: &str, hp: u32, attack: u32, defense: u32, speed: u32) -> Creature {
    Creature::new(
        id,
        id,
        BaseStats {
            hp,
            attack,
            defense,
            speed,
            ..BaseStats::default()
        },
    )
}

fn bench_simulator(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulator");
    group.sample_size(100);
    group.throughput(Throughput::Elements(1));

    // Knock-out within a handful of rounds
    let striker = fighter("striker", 60, 150, 40, 90);
    let target = fighter("target", 50, 40, 30, 20);
    group.bench_function("knockout_duel", |b| {
        b.iter_batched(
            || Rng::new(7),
            |mut rng| black_box(simulate_fight(Some(&striker), Some(&target), &mut rng)),
            BatchSize::SmallInput,
        );
    });

    // Two walls that always run to the turn cap
    let wall = fighter("wall", 255, 10, 255, 50);
    group.bench_function("turn_cap_duel", |b| {
        b.iter_batched(
            || FixedRandom::constant(0.01),
            |mut rng| black_box(simulate_fight(Some(&wall), Some(&wall), &mut rng)),
            BatchSize::SmallInput,
        );
    });

    let a = fighter("a", 90, 85, 60, 70);
    let b_side = fighter("b", 95, 80, 65, 60);
    group.bench_function("seeded_duel", |b| {
        b.iter(|| black_box(simulate_seeded(&a, &b_side, black_box(42))));
    });

    group.finish();
}

criterion_group!(benches, bench_simulator);
criterion_main!(benches);
