use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tetris_arena::core::{Board, GameState};
use tetris_arena::engine::{
    Autoplayer, Difficulty, HeuristicPolicy, ModeConfig, ModeEngine, ModeKind,
};
use tetris_arena::types::{Material, PieceKind};

fn bench_tick(c: &mut Criterion) {
    let mut state = GameState::new(12345);
    state.start();

    c.bench_function("game_tick_16ms", |b| {
        b.iter(|| {
            state.tick(black_box(16), false);
        })
    });
}

fn bench_line_clear(c: &mut Criterion) {
    c.bench_function("clear_4_lines", |b| {
        b.iter(|| {
            let mut board = Board::new();
            for y in 16..20 {
                for x in 0..10 {
                    board.set(x, y, Some(Material::Piece(PieceKind::I)));
                }
            }
            board.clear_full_rows();
        })
    });
}

fn bench_garbage_injection(c: &mut Criterion) {
    c.bench_function("inject_4_garbage_rows", |b| {
        b.iter(|| {
            let mut state = GameState::new(12345);
            state.start();
            state.inject_garbage(black_box(4))
        })
    });
}

fn bench_policy(c: &mut Criterion) {
    let board = Board::from_rows(&["##.#####..", "####.#####", "#.########"]);
    let medium = HeuristicPolicy::new(Difficulty::Medium);
    let hard = HeuristicPolicy::new(Difficulty::Hard);

    c.bench_function("policy_best_placement", |b| {
        b.iter(|| medium.best_placement(black_box(&board), PieceKind::T, None))
    });
    c.bench_function("policy_best_placement_lookahead", |b| {
        b.iter(|| hard.best_placement(black_box(&board), PieceKind::T, Some(PieceKind::I)))
    });
}

fn bench_mode_tick(c: &mut Criterion) {
    let mut engine = ModeEngine::new(ModeConfig::new(ModeKind::Battle.as_str(), 7));
    let mut player = Autoplayer::new(Difficulty::Medium);
    engine.start();

    c.bench_function("battle_mode_tick", |b| {
        b.iter(|| {
            if !engine.state().is_active() {
                engine = ModeEngine::new(ModeConfig::new(ModeKind::Battle.as_str(), 7));
                player = Autoplayer::new(Difficulty::Medium);
                engine.start();
            }
            if let Some(action) = player.next_action(engine.game()) {
                engine.push_action(action);
            }
            engine.tick();
            engine.drain_notifications().len()
        })
    });
}

criterion_group!(
    benches,
    bench_tick,
    bench_line_clear,
    bench_garbage_injection,
    bench_policy,
    bench_mode_tick
);
criterion_main!(benches);
