//! Random playouts and short searches on the classic rules.

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use hexz::core::GameRng;
use hexz::games::ClassicGame;
use hexz::mcts::{MCTSConfig, MCTSSearch};
use hexz::rules::{GameEngine, SearchableGame};

fn started() -> ClassicGame {
    let mut game = ClassicGame::with_seed(1);
    game.start();
    game
}

fn bench_random_playout(c: &mut Criterion) {
    let base = started();
    let mut rng = GameRng::new(9);
    c.bench_function("random_playout", |b| {
        b.iter_batched(
            || base.fork(rng.fork()),
            |mut game| {
                while !game.is_done() {
                    let Some(mv) = game.random_move() else { break };
                    let _ = game.make_move(mv);
                }
                black_box(game.winner())
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_fork(c: &mut Criterion) {
    let base = started();
    let mut rng = GameRng::new(9);
    c.bench_function("fork", |b| b.iter(|| black_box(base.fork(rng.fork()))));
}

fn bench_search(c: &mut Criterion) {
    let game = started();
    let config = MCTSConfig::default().with_seed(3).with_budget_check_interval(256);
    c.bench_function("search_256_iterations", |b| {
        b.iter(|| {
            let mut search = MCTSSearch::new(config.clone());
            black_box(search.suggest_move(&game, Duration::ZERO))
        });
    });
}

criterion_group!(benches, bench_random_playout, bench_fork, bench_search);
criterion_main!(benches);
