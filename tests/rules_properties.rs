//! Property tests for the quantified rules
//!
//! Task results never go negative, a 1 is always a critical, Momentum never
//! passes its cap, and hex distance is a metric.

use proptest::prelude::*;

use starship_tactics::core::pools::ResourcePools;
use starship_tactics::dice::{ScriptedDice, SeededDice};
use starship_tactics::ship::{Departments, Starship, SystemType, Systems};
use starship_tactics::tactical::HexCoord;
use starship_tactics::task::{resolve_task, score_die, TaskRoll};

fn hex() -> impl Strategy<Value = HexCoord> {
    (-20i32..20, -20i32..20).prop_map(|(q, r)| HexCoord::new(q, r))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn task_results_never_negative(
        seed in any::<u64>(),
        bonus in 0u8..=3,
        target_number in 0u8..=20,
        difficulty in 0u8..=5,
        focus in any::<bool>(),
        discipline in 0u8..=5,
    ) {
        let mut dice = SeededDice::seeded(seed);
        let roll = TaskRoll::new(target_number, difficulty)
            .with_bonus_dice(bonus)
            .with_focus(focus)
            .with_discipline(discipline)
            .with_optional_roll();
        let result = resolve_task(&mut dice, &roll).unwrap();

        prop_assert!((2..=5).contains(&result.rolls.len()));
        prop_assert!(result.successes <= 2 * result.rolls.len() as u32);
        if result.succeeded {
            prop_assert_eq!(result.momentum_generated, result.successes - difficulty as u32);
        } else {
            prop_assert_eq!(result.momentum_generated, 0);
        }
    }

    #[test]
    fn one_is_always_critical(
        target_number in 0u8..=20,
        focus_range in 0u8..=5,
        complication_range in 1u8..=5,
    ) {
        let score = score_die(1, target_number, focus_range, complication_range);
        prop_assert_eq!(score.successes, 2);
        prop_assert!(!score.complication);
    }

    #[test]
    fn scripted_crit_counts_double(target_number in 0u8..=20, other in 2u8..=20) {
        let mut dice = ScriptedDice::new([1, other]);
        let result = resolve_task(&mut dice, &TaskRoll::new(target_number, 1)).unwrap();
        let expected = 2 + u32::from(other <= target_number);
        prop_assert_eq!(result.successes, expected);
    }

    #[test]
    fn momentum_never_exceeds_cap(
        start in 0u32..=6,
        gains in prop::collection::vec(0u32..10, 1..20),
    ) {
        let mut pools = ResourcePools::new(start, 0);
        for gain in gains {
            pools.add_momentum(gain, 6);
            prop_assert!(pools.momentum <= 6);
        }
    }

    #[test]
    fn hex_distance_is_a_metric(a in hex(), b in hex(), c in hex()) {
        prop_assert_eq!(a.distance(&a), 0);
        prop_assert_eq!(a.distance(&b), b.distance(&a));
        prop_assert!(a.distance(&c) <= a.distance(&b) + b.distance(&c));
    }

    #[test]
    fn critical_damage_boundary_is_strict(scale in 1u8..=7) {
        let mut ship = Starship::new("Probe", scale, Systems::default(), Departments::default());
        for _ in 0..scale {
            ship.apply_breach(SystemType::Structure);
        }
        prop_assert!(!ship.is_critically_damaged());
        ship.apply_breach(SystemType::Weapons);
        prop_assert!(ship.is_critically_damaged());
    }
}

#[test]
fn scale_four_system_destroyed_at_two_breaches() {
    let mut ship = Starship::new("Probe", 4, Systems::default(), Departments::default());
    ship.apply_breach(SystemType::Sensors);
    assert!(!ship.is_system_destroyed(SystemType::Sensors));
    ship.apply_breach(SystemType::Sensors);
    assert!(ship.is_system_destroyed(SystemType::Sensors));
}
