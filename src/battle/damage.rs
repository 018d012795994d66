use crate::data::BaseStats;

pub const DAMAGE_FLOOR: i64 = 5;
pub const DAMAGE_CEILING: i64 = 80;

/// Flat bonus added before clamping.
pub const DAMAGE_BONUS: f64 = 10.0;

/// Share of the defender's best defensive stat subtracted from offense.
pub const DEFENSE_WEIGHT: f64 = 0.5;

/// Raw damage `attacker` deals to `defender`:
/// `floor(max(Atk, SpAtk) - 0.5 * max(Def, SpDef) + 10)`, clamped to
/// [`DAMAGE_FLOOR`, `DAMAGE_CEILING`].
pub fn compute_damage(attacker: &BaseStats, defender: &BaseStats) -> i64 {
    let offense = attacker.attack.max(attacker.special_attack);
    let defense = defender.defense.max(defender.special_defense);
    let raw = (f64::from(offense) - f64::from(defense) * DEFENSE_WEIGHT + DAMAGE_BONUS).floor();
    (raw as i64).clamp(DAMAGE_FLOOR, DAMAGE_CEILING)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_zero_stats_yield_flat_bonus() {
        assert_eq!(compute_damage(&BaseStats::default(), &BaseStats::default()), 10);
    }

    #[test]
    fn odd_defense_rounds_toward_negative_infinity() {
        let attacker = BaseStats {
            attack: 20,
            ..BaseStats::default()
        };
        let defender = BaseStats {
            defense: 15,
            ..BaseStats::default()
        };
        // 20 - 7.5 + 10 = 22.5
        assert_eq!(compute_damage(&attacker, &defender), 22);
    }

    #[test]
    fn heavy_defense_hits_the_floor() {
        let attacker = BaseStats::default();
        let defender = BaseStats {
            special_defense: 255,
            ..BaseStats::default()
        };
        assert_eq!(compute_damage(&attacker, &defender), DAMAGE_FLOOR);
    }
}
