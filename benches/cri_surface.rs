use criterion::{criterion_group, criterion_main, Criterion};

use pitchspace::analysis::Analysis;
use pitchspace::control::{SpearmanModel, VoronoiModel};
use pitchspace::counterfactual::Modification;
use pitchspace::domain::{EventId, EventSnapshot, PlayerId, PlayerState, Side};
use pitchspace::evaluate::evaluate;
use pitchspace::field::{FieldDimensions, FieldGrid};
use pitchspace::geom::Vec2;

fn eleven_a_side() -> EventSnapshot {
    let mut players = vec![];
    for (side, direction) in [(Side::Home, -1.0), (Side::Away, 1.0)] {
        for number in 1..=11u8 {
            let column = (number - 1) / 4;
            let row = (number - 1) % 4;
            let position = Vec2::new(
                direction * (10.0 + 12.0 * column as f64),
                -24.0 + 16.0 * row as f64,
            );
            let velocity = Vec2::new(-direction * 1.5, 0.5 * (row as f64 - 1.5));
            players.push(
                PlayerState::new(PlayerId::new(side, number), position, velocity).with_goalkeeper(number == 1),
            );
        }
    }
    EventSnapshot::new(EventId(1), 0, Some(Vec2::new(5.0, 3.0)), Side::Away, players).unwrap()
}

fn criterion_benchmark(c: &mut Criterion) {
    let grid = FieldGrid::with_cells_x(FieldDimensions::default(), 50).unwrap();
    let snapshot = eleven_a_side();

    let spearman = SpearmanModel::default();
    c.bench_function("cri_surface_spearman", |b| {
        b.iter(|| evaluate(&spearman, &snapshot, &grid));
    });

    let voronoi = VoronoiModel::with_lookahead(0.5);
    c.bench_function("cri_surface_voronoi", |b| {
        b.iter(|| evaluate(&voronoi, &snapshot, &grid));
    });

    let analysis = Analysis::new(&spearman, snapshot.clone(), grid.clone(), 5.0).unwrap();
    analysis.baseline_surface();
    let player = PlayerId::new(Side::Home, 4);
    c.bench_function("cri_surface_space_created", |b| {
        b.iter(|| analysis.space_created(player, &Modification::stationary()).unwrap());
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
