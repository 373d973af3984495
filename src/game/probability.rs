//! Success-rate formula and Bernoulli rolls.

use crate::game::constants::rates::{MAX_RATE, MIN_RATE, REST_BONUS};
use crate::game::rng::MatchRng;

/// Percent chance (in `[5, 95]`) that an attacker beats a defender.
///
/// `rate = attack / (attack + defense) * 100`, with `+2` attack after a rest
/// day. Negative or NaN stats count as zero and an all-zero matchup is a coin
/// flip, so the function is total.
pub fn success_rate(attack_stat: f32, defense_stat: f32, rest_bonus: bool) -> f32 {
    let mut attack = sanitize(attack_stat);
    let defense = sanitize(defense_stat);
    if rest_bonus {
        attack += REST_BONUS;
    }

    let total = attack + defense;
    let rate = if total > 0.0 && total.is_finite() {
        attack / total * 100.0
    } else if attack.is_infinite() {
        MAX_RATE
    } else {
        50.0
    };

    rate.clamp(MIN_RATE, MAX_RATE)
}

/// `uniform(0, 100) < rate`
pub fn roll_success(rate: f32, rng: &mut MatchRng) -> bool {
    rng.roll_percent() < rate
}

fn sanitize(stat: f32) -> f32 {
    if stat.is_nan() || stat < 0.0 {
        0.0
    } else {
        stat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_matchup() {
        assert!((success_rate(10.0, 10.0, false) - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_clamped_low() {
        assert_eq!(success_rate(1.0, 99.0, false), 5.0);
        assert_eq!(success_rate(0.0, 10.0, false), 5.0);
    }

    #[test]
    fn test_clamped_high() {
        assert_eq!(success_rate(99.0, 1.0, false), 95.0);
    }

    #[test]
    fn test_rest_bonus_adds_two() {
        let with = success_rate(8.0, 10.0, true);
        assert!((with - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_zero_stats_total() {
        assert_eq!(success_rate(0.0, 0.0, false), 50.0);
        assert_eq!(success_rate(f32::NAN, -3.0, false), 50.0);
    }

    #[test]
    fn test_roll_success_forced() {
        let mut rng = MatchRng::scripted([4.9, 5.0]);
        assert!(roll_success(5.0, &mut rng));
        assert!(!roll_success(5.0, &mut rng));
    }
}
