use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::Serialize;
use tracing::warn;

use crate::battle::engine::{simulate_seeded, Termination, Winner};
use crate::data::Creature;

pub const DEFAULT_MATCHUP_ITERATIONS: usize = 1000;
/// Upper bound accepted from the CLI and HTTP surfaces.
pub const MAX_MATCHUP_ITERATIONS: usize = 100_000;

/// Thread budget for a batch of duels. Zero leaves the work on Rayon's global pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    pub fn with_workers(workers: usize) -> Self {
        Self { workers }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    fn run<R: Send>(&self, job: impl FnOnce() -> R + Send) -> R {
        if self.workers == 0 {
            return job();
        }
        let built = ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("bestiary-duel-{i}"))
            .build();
        match built {
            Ok(pool) => pool.install(job),
            Err(err) => {
                warn!(workers = self.workers, %err, "dedicated duel pool unavailable, using global pool");
                job()
            }
        }
    }
}

/// Aggregate of many seeded duels between the same pair.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MatchupSummary {
    pub iterations: usize,
    pub seed: u64,
    pub a_wins: usize,
    pub b_wins: usize,
    pub draws: usize,
    pub turn_cap_draws: usize,
    pub a_win_rate: f64,
    pub b_win_rate: f64,
    pub draw_rate: f64,
    pub avg_rounds: f64,
    pub avg_hp_remaining_a: f64,
    pub avg_hp_remaining_b: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    a_wins: usize,
    b_wins: usize,
    draws: usize,
    turn_cap_draws: usize,
    rounds: u64,
    hp_a: f64,
    hp_b: f64,
}

impl Tally {
    fn merge(self, other: Self) -> Self {
        Self {
            a_wins: self.a_wins + other.a_wins,
            b_wins: self.b_wins + other.b_wins,
            draws: self.draws + other.draws,
            turn_cap_draws: self.turn_cap_draws + other.turn_cap_draws,
            rounds: self.rounds + other.rounds,
            hp_a: self.hp_a + other.hp_a,
            hp_b: self.hp_b + other.hp_b,
        }
    }
}

fn run_one(a: &Creature, b: &Creature, seed: u64) -> Tally {
    let result = simulate_seeded(a, b, seed);
    let mut tally = Tally {
        rounds: u64::from(result.rounds),
        hp_a: result.final_hp.a,
        hp_b: result.final_hp.b,
        ..Tally::default()
    };
    match result.winner {
        Some(Winner::A) => tally.a_wins = 1,
        Some(Winner::B) => tally.b_wins = 1,
        Some(Winner::Draw) => {
            tally.draws = 1;
            if result.termination == Termination::TurnCap {
                tally.turn_cap_draws = 1;
            }
        }
        None => {}
    }
    tally
}

/// Run `iterations` duels, iteration `i` seeded with `seed + i`, across all cores.
/// Counts do not depend on thread scheduling.
pub fn estimate_matchup(a: &Creature, b: &Creature, iterations: usize, seed: u64) -> MatchupSummary {
    let tally = (0..iterations)
        .into_par_iter()
        .map(|i| run_one(a, b, seed.wrapping_add(i as u64)))
        .reduce(Tally::default, Tally::merge);
    summarize(tally, iterations, seed)
}

/// Single-threaded [`estimate_matchup`]; used as the baseline in benchmarks.
pub fn estimate_matchup_sequential(
    a: &Creature,
    b: &Creature,
    iterations: usize,
    seed: u64,
) -> MatchupSummary {
    let tally = (0..iterations)
        .map(|i| run_one(a, b, seed.wrapping_add(i as u64)))
        .fold(Tally::default(), Tally::merge);
    summarize(tally, iterations, seed)
}

/// [`estimate_matchup`] on a pool with a fixed worker count.
pub fn estimate_matchup_with_pool(
    a: &Creature,
    b: &Creature,
    iterations: usize,
    seed: u64,
    pool: &WorkerPool,
) -> MatchupSummary {
    pool.run(|| estimate_matchup(a, b, iterations, seed))
}

fn summarize(tally: Tally, iterations: usize, seed: u64) -> MatchupSummary {
    if iterations == 0 {
        return MatchupSummary {
            seed,
            ..MatchupSummary::default()
        };
    }
    let n = iterations as f64;
    MatchupSummary {
        iterations,
        seed,
        a_wins: tally.a_wins,
        b_wins: tally.b_wins,
        draws: tally.draws,
        turn_cap_draws: tally.turn_cap_draws,
        a_win_rate: tally.a_wins as f64 / n,
        b_win_rate: tally.b_wins as f64 / n,
        draw_rate: tally.draws as f64 / n,
        avg_rounds: tally.rounds as f64 / n,
        avg_hp_remaining_a: tally.hp_a / n,
        avg_hp_remaining_b: tally.hp_b / n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::BaseStats;

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

    #[test]
    fn zero_iterations_is_all_zero() {
        let a = fighter("a", 50, 50, 50, 50);
        let summary = estimate_matchup(&a, &a, 0, 9);
        assert_eq!(summary.iterations, 0);
        assert_eq!(summary.a_win_rate, 0.0);
        assert_eq!(summary.seed, 9);
    }

    #[test]
    fn counts_cover_every_iteration() {
        let a = fighter("a", 60, 70, 40, 50);
        let b = fighter("b", 60, 65, 45, 50);
        let summary = estimate_matchup(&a, &b, 200, 1);
        assert_eq!(summary.a_wins + summary.b_wins + summary.draws, 200);
        let rates = summary.a_win_rate + summary.b_win_rate + summary.draw_rate;
        assert!((rates - 1.0).abs() < 1e-9);
    }

    #[test]
    fn win_counts_match_sequential_run() {
        let a = fighter("a", 80, 90, 60, 70);
        let b = fighter("b", 90, 80, 70, 60);
        let parallel = estimate_matchup(&a, &b, 300, 42);
        let sequential = estimate_matchup_sequential(&a, &b, 300, 42);
        assert_eq!(parallel.a_wins, sequential.a_wins);
        assert_eq!(parallel.b_wins, sequential.b_wins);
        assert_eq!(parallel.draws, sequential.draws);
        assert_eq!(parallel.avg_rounds, sequential.avg_rounds);
    }

    #[test]
    fn pool_runs_on_requested_thread_count() {
        let pool = WorkerPool::with_workers(3);
        assert_eq!(pool.workers(), 3);
        assert_eq!(pool.run(rayon::current_num_threads), 3);
        assert_eq!(WorkerPool::default().run(|| 2 + 2), 4);
    }

    #[test]
    fn lopsided_matchup_favors_stronger_side() {
        let strong = fighter("strong", 200, 150, 100, 100);
        let weak = fighter("weak", 20, 10, 10, 10);
        let summary = estimate_matchup_with_pool(&strong, &weak, 100, 5, &WorkerPool::with_workers(2));
        assert_eq!(summary.a_wins, 100);
    }
}
