pub mod compare;
pub mod damage;
pub mod engine;
pub mod matchup;
pub mod rng;

pub use compare::{compare_creatures, Comparison, Leader, Stat, StatLine, COMPARED_STATS};
pub use damage::{compute_damage, DAMAGE_CEILING, DAMAGE_FLOOR};
pub use engine::{
    simulate_fight, simulate_seeded, turn_order, BattleResult, HpPair, Side, Termination,
    TurnEvent, Winner, TURN_CAP,
};
pub use matchup::{
    estimate_matchup, estimate_matchup_sequential, estimate_matchup_with_pool, MatchupSummary,
    WorkerPool, DEFAULT_MATCHUP_ITERATIONS, MAX_MATCHUP_ITERATIONS,
};
pub use rng::{entropy_seed, FixedRandom, RandomSource, Rng};
