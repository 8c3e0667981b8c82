//! Curve sampling across both solver tiers, and flood fill on an expert board.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use toybox_core::econ::{AgentId, BoxDimensions, SamplerConfig, UtilityFunction, indifference_curve};
use toybox_core::*;

fn bench_curves(c: &mut Criterion) {
    let dims = BoxDimensions::new(10.0, 10.0);
    let config = SamplerConfig::default();
    let mut group = c.benchmark_group("indifference_curve");

    // closed form, isolation, bisection
    for source in ["x * y", "ln(x) + ln(y)", "x^0.3 * y^0.7", "min(x, 2y)", "y + ln(y) + x"] {
        let utility = UtilityFunction::parse(source).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(source), &utility, |b, utility| {
            b.iter(|| indifference_curve(utility, black_box(4.0), dims, AgentId::One, &config))
        });
    }
    group.finish();

    c.bench_function("parse_utility", |b| {
        b.iter(|| UtilityFunction::parse(black_box("3x^1/2 y2 + ln(x) - min(x, y) / 2")))
    });
}

fn bench_flood_fill(c: &mut Criterion) {
    let config = Preset::Expert.config();
    let seeds: Vec<Seed> = (0..16)
        .map(|rng_seed| RandomSeedGenerator::new(rng_seed).generate(config))
        .collect();

    c.bench_function("expert_first_zero_reveal", |b| {
        b.iter(|| {
            for seed in &seeds {
                let mut game = Minesweeper::from_seed(seed.clone());
                let zero = first_zero_cell(game.board());
                if let Some(coords) = zero {
                    black_box(game.reveal(coords).unwrap());
                }
            }
        })
    });
}

fn first_zero_cell(board: &Board) -> Option<Coord2> {
    let (width, height) = board.size();
    (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .find(|&coords| board.cell(coords) == Some(0))
}

criterion_group!(benches, bench_curves, bench_flood_fill);
criterion_main!(benches);
