use serde::Serialize;

use crate::data::{BaseStats, Creature};

/// Display order of the side-by-side comparison.
pub const COMPARED_STATS: [Stat; 6] = [
    Stat::Speed,
    Stat::Attack,
    Stat::Defense,
    Stat::SpecialAttack,
    Stat::SpecialDefense,
    Stat::Hp,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stat {
    #[serde(rename = "HP")]
    Hp,
    Attack,
    Defense,
    SpecialAttack,
    SpecialDefense,
    Speed,
}

impl Stat {
    pub fn value(self, stats: &BaseStats) -> u32 {
        match self {
            Self::Hp => stats.hp,
            Self::Attack => stats.attack,
            Self::Defense => stats.defense,
            Self::SpecialAttack => stats.special_attack,
            Self::SpecialDefense => stats.special_defense,
            Self::Speed => stats.speed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Leader {
    A,
    B,
    Tie,
}

impl Leader {
    fn of(a: u64, b: u64) -> Self {
        match a.cmp(&b) {
            std::cmp::Ordering::Greater => Self::A,
            std::cmp::Ordering::Less => Self::B,
            std::cmp::Ordering::Equal => Self::Tie,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatLine {
    pub stat: Stat,
    pub a: u32,
    pub b: u32,
    pub leader: Leader,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comparison {
    pub a_id: String,
    pub b_id: String,
    pub stats: Vec<StatLine>,
    pub total_a: u64,
    pub total_b: u64,
    /// Higher total wins; equal totals go to `a`.
    pub overall: Leader,
}

pub fn compare_creatures(a: &Creature, b: &Creature) -> Comparison {
    let stats = COMPARED_STATS
        .iter()
        .map(|&stat| {
            let va = stat.value(&a.base);
            let vb = stat.value(&b.base);
            StatLine {
                stat,
                a: va,
                b: vb,
                leader: Leader::of(u64::from(va), u64::from(vb)),
            }
        })
        .collect();
    let total_a = a.base.total();
    let total_b = b.base.total();
    let overall = Leader::of(total_a, total_b);

    Comparison {
        a_id: a.id.clone(),
        b_id: b.id.clone(),
        stats,
        total_a,
        total_b,
        overall,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_stat_leaders_and_totals() {
        let a = Creature::new(
            "1",
            "Bulbasaur",
            BaseStats {
                hp: 45,
                attack: 49,
                defense: 49,
                special_attack: 65,
                special_defense: 65,
                speed: 45,
            },
        );
        let b = Creature::new(
            "4",
            "Charmander",
            BaseStats {
                hp: 39,
                attack: 52,
                defense: 43,
                special_attack: 60,
                special_defense: 50,
                speed: 65,
            },
        );
        let cmp = compare_creatures(&a, &b);
        assert_eq!(cmp.stats.len(), 6);
        assert_eq!(cmp.stats[0].stat, Stat::Speed);
        assert_eq!(cmp.stats[0].leader, Leader::B);
        assert_eq!(cmp.stats[5].stat, Stat::Hp);
        assert_eq!(cmp.stats[5].leader, Leader::A);
        assert_eq!(cmp.total_a, 318);
        assert_eq!(cmp.total_b, 309);
        assert_eq!(cmp.overall, Leader::A);
    }

    #[test]
    fn identical_stats_tie_everywhere() {
        let a = Creature::new("x", "X", BaseStats::default());
        let b = Creature::new("y", "Y", BaseStats::default());
        let cmp = compare_creatures(&a, &b);
        assert!(cmp.stats.iter().all(|line| line.leader == Leader::Tie));
        assert_eq!(cmp.overall, Leader::Tie);
    }

    #[test]
    fn equal_totals_have_no_overall_leader() {
        let tank = Creature::new(
            "t",
            "Tank",
            BaseStats {
                hp: 100,
                ..BaseStats::default()
            },
        );
        let striker = Creature::new(
            "s",
            "Striker",
            BaseStats {
                attack: 100,
                ..BaseStats::default()
            },
        );
        let cmp = compare_creatures(&tank, &striker);
        assert_eq!((cmp.total_a, cmp.total_b), (100, 100));
        assert_eq!(cmp.stats[1].leader, Leader::B);
        assert_eq!(cmp.stats[5].leader, Leader::A);
        assert_eq!(cmp.overall, Leader::Tie);
    }
}
