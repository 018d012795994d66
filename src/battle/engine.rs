//! Turn-based duel between two creatures.
//!
//! Each round the faster creature strikes first (ties go to participant `a`), then the
//! other strikes back unless it was knocked out. The log shows the nominal damage from
//! [`compute_damage`]; the HP actually lost is `damage / 10 * U * 2` with `U` drawn from
//! the injected [`RandomSource`]. The fight stops on a knock-out or after [`TURN_CAP`]
//! rounds.

use serde::Serialize;
use tracing::debug;

use crate::battle::damage::compute_damage;
use crate::battle::rng::{RandomSource, Rng};
use crate::data::Creature;

pub const TURN_CAP: u32 = 50;

/// Nominal damage is divided by this before the random spread is applied.
pub const DAMAGE_SCALE: f64 = 10.0;
pub const VARIANCE_SPREAD: f64 = 2.0;

/// Largest value a sanitized draw can take; keeps `U` inside `[0, 1)`.
const MAX_UNIT: f64 = 1.0 - f64::EPSILON;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    A,
    B,
}

impl Side {
    pub const fn opponent(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    A,
    B,
    Draw,
}

impl Winner {
    pub const fn side(self) -> Option<Side> {
        match self {
            Self::A => Some(Side::A),
            Self::B => Some(Side::B),
            Self::Draw => None,
        }
    }

    fn from_final_hp(hp: HpPair) -> Self {
        if hp.a > hp.b {
            Self::A
        } else if hp.b > hp.a {
            Self::B
        } else {
            Self::Draw
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// A participant was missing; nothing was simulated.
    NoContest,
    /// At least one side ended at 0 HP.
    KnockOut,
    /// Both sides were still standing after [`TURN_CAP`] rounds.
    TurnCap,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct HpPair {
    pub a: f64,
    pub b: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnEvent {
    pub round: u32,
    pub actor: Side,
    /// Value shown in the log.
    pub damage: i64,
    /// HP actually removed from the target.
    pub hp_loss: f64,
    pub target_hp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattleResult {
    pub log: Vec<String>,
    pub events: Vec<TurnEvent>,
    pub hp_progression: Vec<HpPair>,
    pub winner: Option<Winner>,
    pub termination: Termination,
    pub final_hp: HpPair,
    pub rounds: u32,
}

impl BattleResult {
    pub fn empty() -> Self {
        Self {
            log: Vec::new(),
            events: Vec::new(),
            hp_progression: Vec::new(),
            winner: None,
            termination: Termination::NoContest,
            final_hp: HpPair::default(),
            rounds: 0,
        }
    }

    pub fn is_draw(&self) -> bool {
        self.winner == Some(Winner::Draw)
    }

    /// The winning creature out of the pair that was simulated.
    pub fn winner_creature<'c>(&self, a: &'c Creature, b: &'c Creature) -> Option<&'c Creature> {
        match self.winner?.side()? {
            Side::A => Some(a),
            Side::B => Some(b),
        }
    }
}

struct BattleState<'c> {
    fighters: [&'c Creature; 2],
    remaining_hp: [f64; 2],
    round: u32,
    log: Vec<String>,
    events: Vec<TurnEvent>,
    hp_progression: Vec<HpPair>,
}

impl<'c> BattleState<'c> {
    fn new(a: &'c Creature, b: &'c Creature) -> Self {
        let mut state = Self {
            fighters: [a, b],
            remaining_hp: [f64::from(a.base.hp), f64::from(b.base.hp)],
            round: 1,
            log: Vec::new(),
            events: Vec::new(),
            hp_progression: Vec::with_capacity(2 * TURN_CAP as usize + 1),
        };
        state.hp_progression.push(state.snapshot());
        state
    }

    fn snapshot(&self) -> HpPair {
        HpPair {
            a: self.remaining_hp[0],
            b: self.remaining_hp[1],
        }
    }

    fn knocked_out(&self) -> bool {
        self.remaining_hp.iter().any(|&hp| hp <= 0.0)
    }

    fn act<R: RandomSource + ?Sized>(&mut self, actor: Side, rng: &mut R) {
        let target = actor.opponent();
        let attacker = self.fighters[actor.index()];
        let defender = self.fighters[target.index()];

        let damage = compute_damage(&attacker.base, &defender.base);
        let unit = sanitize_unit(rng.next_unit());
        let hp_loss = damage as f64 / DAMAGE_SCALE * unit * VARIANCE_SPREAD;

        let hp = &mut self.remaining_hp[target.index()];
        *hp = (*hp - hp_loss).max(0.0);
        let target_hp = *hp;

        self.log.push(format!(
            "Round {}: {} inflicts {} damage.",
            self.round,
            attacker.display_name(),
            damage
        ));
        self.events.push(TurnEvent {
            round: self.round,
            actor,
            damage,
            hp_loss,
            target_hp,
        });
        self.hp_progression.push(self.snapshot());
    }

    fn finish(self) -> BattleResult {
        let termination = if self.knocked_out() {
            Termination::KnockOut
        } else {
            Termination::TurnCap
        };
        let final_hp = self.snapshot();
        BattleResult {
            log: self.log,
            events: self.events,
            hp_progression: self.hp_progression,
            winner: Some(Winner::from_final_hp(final_hp)),
            termination,
            final_hp,
            rounds: self.round - 1,
        }
    }
}

/// Who strikes first each round. Speed never changes mid-fight, so the order is fixed.
pub fn turn_order(a: &Creature, b: &Creature) -> [Side; 2] {
    if a.base.speed >= b.base.speed {
        [Side::A, Side::B]
    } else {
        [Side::B, Side::A]
    }
}

/// Simulate a duel. A missing participant yields [`BattleResult::empty`].
pub fn simulate_fight<R: RandomSource + ?Sized>(
    a: Option<&Creature>,
    b: Option<&Creature>,
    rng: &mut R,
) -> BattleResult {
    let (Some(a), Some(b)) = (a, b) else {
        debug!("fight requested with a missing participant");
        return BattleResult::empty();
    };

    let order = turn_order(a, b);
    let mut state = BattleState::new(a, b);

    while !state.knocked_out() && state.round <= TURN_CAP {
        for actor in order {
            state.act(actor, rng);
            if state.knocked_out() {
                break;
            }
        }
        state.round += 1;
    }

    let result = state.finish();
    debug!(
        a = a.display_name(),
        b = b.display_name(),
        rounds = result.rounds,
        winner = ?result.winner,
        termination = ?result.termination,
        "fight finished"
    );
    result
}

/// [`simulate_fight`] with a fresh [`Rng`] seeded from `seed`.
pub fn simulate_seeded(a: &Creature, b: &Creature, seed: u64) -> BattleResult {
    simulate_fight(Some(a), Some(b), &mut Rng::new(seed))
}

fn sanitize_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, MAX_UNIT)
    }
}
