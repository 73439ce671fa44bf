use criterion::{black_box, criterion_group, criterion_main, Criterion};
use match3::{
    Board, BoardConfig, CatalogConfig, DeterministicRng, Direction, EngineConfig, PatternSet,
    board::Spawner,
    rules::{PieceDefinition, PieceKind},
};

fn catalog() -> CatalogConfig {
    CatalogConfig::new(vec![
        PieceDefinition::basic(PieceKind(1), "Red"),
        PieceDefinition::basic(PieceKind(2), "Green"),
        PieceDefinition::basic(PieceKind(3), "Blue"),
        PieceDefinition::basic(PieceKind(4), "Yellow"),
        PieceDefinition::basic(PieceKind(5), "Purple"),
    ])
}

fn board(seed: u64) -> Board {
    let config = BoardConfig::uniform(8, 8, Direction::Down).with_spawner_row(0, Spawner::UniformRandomBasic);
    Board::new(&config, &catalog(), &PatternSet::classic(), EngineConfig::default(), DeterministicRng::new(seed))
        .unwrap()
}

fn bench_find_patterns(c: &mut Criterion) {
    let board = board(12345);

    c.bench_function("find_patterns_8x8", |b| {
        b.iter(|| black_box(board.find_patterns()))
    });
}

fn bench_run_board_phases(c: &mut Criterion) {
    c.bench_function("run_board_phases_8x8", |b| {
        b.iter(|| {
            let mut board = board(black_box(12345));
            black_box(board.run_board_phases())
        })
    });
}

fn bench_swap(c: &mut Criterion) {
    let mut settled = board(777);
    settled.run_board_phases();
    let hint = settled
        .find_patterns()
        .hints
        .iter()
        .find_map(|hint| hint.hint_swap());

    c.bench_function("swap_and_settle", |b| {
        b.iter(|| {
            let mut board = settled.clone();
            if let Some((from, to)) = hint {
                if board.swap(from, to) {
                    board.run_board_phases();
                }
            }
            black_box(board.compute_hash())
        })
    });
}

fn bench_shuffle(c: &mut Criterion) {
    let mut board = board(99);

    c.bench_function("shuffle_8x8", |b| {
        b.iter(|| black_box(board.shuffle()))
    });
}

criterion_group!(
    benches,
    bench_find_patterns,
    bench_run_board_phases,
    bench_swap,
    bench_shuffle,
);
criterion_main!(benches);
