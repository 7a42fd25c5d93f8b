use criterion::{black_box, criterion_group, criterion_main, Criterion};

use arena_core::connectivity::{analyze, analyze_and_repair, RepairPolicy};
use arena_core::generation::backrooms::{generate_backrooms, BackroomsParams};
use arena_core::generation::cave::{generate_cave, CaveParams};
use arena_core::generation::maze::generate_maze;
use arena_core::generation::office::{generate_office, OfficeParams};
use arena_core::generation::rng_from_seed;
use arena_core::generation::tunnels::{generate_tunnels, WormParams};
use arena_core::{ArenaEngine, EngineConfig, MapRequest, SizeClass};

fn bench_generators(c: &mut Criterion) {
    c.bench_function("maze_61", |b| {
        b.iter(|| {
            let mut rng = rng_from_seed(42);
            generate_maze(black_box(61), black_box(61), 0.15, &mut rng).unwrap()
        })
    });

    let cave = CaveParams::default();
    c.bench_function("cave_61", |b| {
        b.iter(|| {
            let mut rng = rng_from_seed(42);
            generate_cave(black_box(61), black_box(61), &cave, &mut rng).unwrap()
        })
    });

    let worm = WormParams::default();
    c.bench_function("tunnels_61", |b| {
        b.iter(|| {
            let mut rng = rng_from_seed(42);
            generate_tunnels(black_box(61), black_box(61), &worm, &mut rng).unwrap()
        })
    });

    let office = OfficeParams::default();
    c.bench_function("office_61", |b| {
        b.iter(|| {
            let mut rng = rng_from_seed(42);
            generate_office(black_box(61), black_box(61), &office, &mut rng).unwrap()
        })
    });

    let backrooms = BackroomsParams::default();
    c.bench_function("backrooms_61", |b| {
        b.iter(|| {
            let mut rng = rng_from_seed(42);
            generate_backrooms(black_box(61), black_box(61), &backrooms, &mut rng).unwrap()
        })
    });
}

fn bench_connectivity(c: &mut Criterion) {
    let mut rng = rng_from_seed(7);
    let cave = generate_cave(61, 61, &CaveParams::default(), &mut rng).unwrap();

    c.bench_function("analyze_cave_61", |b| b.iter(|| analyze(black_box(&cave))));

    c.bench_function("repair_cave_61", |b| {
        b.iter(|| {
            let mut grid = cave.clone();
            analyze_and_repair(&mut grid, RepairPolicy::ReconnectOrSeal { min_size: 20 })
        })
    });
}

fn bench_round_pipeline(c: &mut Criterion) {
    let engine = ArenaEngine::new(EngineConfig::default()).unwrap();
    let request = MapRequest::random(SizeClass::Medium);
    let mut round = 0u32;

    c.bench_function("generate_round_medium", |b| {
        b.iter(|| {
            round = round.wrapping_add(1);
            engine.generate_round(black_box(round), &request).unwrap()
        })
    });
}

criterion_group!(benches, bench_generators, bench_connectivity, bench_round_pipeline);
criterion_main!(benches);
