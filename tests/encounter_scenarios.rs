//! End-to-end encounter scenarios
//!
//! Drives full turns through `Encounter` with scripted dice so every roll is
//! known in advance.

use starship_tactics::actions::{ActionRegistry, ActionRequest};
use starship_tactics::combat::{CombatEventType, Encounter};
use starship_tactics::core::error::CombatError;
use starship_tactics::core::types::{EntityId, Side};
use starship_tactics::crew::{Attributes, Character, Disciplines};
use starship_tactics::damage::AttackOptions;
use starship_tactics::dice::ScriptedDice;
use starship_tactics::effects::AppliesTo;
use starship_tactics::ship::{
    DamageState, Departments, RangeClass, Shields, Starship, SystemType, Systems, Weapon,
    WeaponType,
};
use starship_tactics::tactical::{HexCoord, TacticalMap};
use starship_tactics::task::{resolve_task, TaskRoll};

struct Bridge {
    encounter: Encounter,
    tactical: EntityId,
    science: EntityId,
    player_ship: EntityId,
    raider: EntityId,
}

fn bridge() -> Bridge {
    let mut encounter = Encounter::new(Some(TacticalMap::new(4)));
    let player_ship = encounter.add_ship(
        Starship::new(
            "USS Resolute",
            4,
            Systems {
                weapons: 9,
                ..Systems::default()
            },
            Departments {
                security: 2,
                science: 2,
                ..Departments::default()
            },
        )
        .with_weapon(Weapon::new("Phaser Array", WeaponType::Energy, 8, RangeClass::Medium)),
    );

    let mut raider_ship = Starship::new("Raider", 4, Systems::default(), Departments::default())
        .with_weapon(Weapon::new("Disruptors", WeaponType::Energy, 6, RangeClass::Medium))
        .at(HexCoord::new(1, 0));
    raider_ship.shields = Shields { current: 10, max: 20 };
    raider_ship.resistance = 2;
    let raider = encounter.add_ship(raider_ship);

    let tactical = encounter
        .add_player(
            Character::new(
                "Lt. Vance",
                Attributes {
                    control: 10,
                    ..Attributes::default()
                },
                Disciplines {
                    security: 3,
                    ..Disciplines::default()
                },
            ),
            player_ship,
        )
        .unwrap();
    let science = encounter
        .add_player(
            Character::new(
                "Lt. Osei",
                Attributes {
                    control: 10,
                    reason: 11,
                    ..Attributes::default()
                },
                Disciplines {
                    science: 4,
                    ..Disciplines::default()
                },
            ),
            player_ship,
        )
        .unwrap();
    encounter.add_npc(raider).unwrap();
    encounter.start();

    Bridge {
        encounter,
        tactical,
        science,
        player_ship,
        raider,
    }
}

#[test]
fn test_volley_shakes_and_breaches_in_one_attack() {
    let mut b = bridge();
    // Two hits, assist miss, system-hit roll 12 (Structure)
    let mut dice = ScriptedDice::new([4, 7, 15, 12]);

    let result = b
        .encounter
        .resolve_attack(b.tactical, b.raider, 0, &AttackOptions::default(), &mut dice)
        .unwrap();

    assert_eq!(result.base_damage, 10);
    let hit = result.hit.unwrap();
    assert_eq!(hit.after_resistance, 8);
    assert!(hit.shaken);
    let raider = b.encounter.ship(b.raider).unwrap();
    assert_eq!(raider.shields.current, 2);
    assert_eq!(raider.system_breaches(SystemType::Structure), 1);
    assert_eq!(raider.damage_state(), DamageState::Breached(1));
}

#[test]
fn test_scan_for_weakness_buff_applies_once() {
    let mut b = bridge();
    let registry = ActionRegistry::builtin().unwrap();
    b.encounter.ship_mut(b.raider).unwrap().shields = Shields { current: 20, max: 20 };

    // Osei: Control 10 + Science 4; assist Sensors 7 + Science 2
    let mut dice = ScriptedDice::new([2, 3, 15]);
    let outcome = b
        .encounter
        .execute_action(
            &registry,
            b.science,
            &ActionRequest::new("Scan For Weakness"),
            &mut dice,
        )
        .unwrap();
    assert!(outcome.succeeded());
    assert_eq!(
        b.encounter
            .ship(b.player_ship)
            .unwrap()
            .effects
            .merged(AppliesTo::Attack)
            .damage_bonus,
        2
    );

    // Raider's first of four turns, then the buffed attack
    b.encounter.pass(b.raider, &mut dice).unwrap();
    let mut dice = ScriptedDice::new([4, 7, 15]);
    let first = b
        .encounter
        .resolve_attack(b.tactical, b.raider, 0, &AttackOptions::default(), &mut dice)
        .unwrap();
    assert_eq!(first.base_damage, 12);
    let first_hit = first.hit.as_ref().unwrap();
    assert_eq!(first_hit.after_resistance, 12);
    assert!(first_hit.breach.is_none());
    assert!(b.encounter.ship(b.player_ship).unwrap().effects.is_empty());

    // The raider uses up its remaining turns and the round rolls over
    for _ in 0..3 {
        b.encounter.pass(b.raider, &mut dice).unwrap();
    }
    assert_eq!(b.encounter.state.round, 2);

    let mut dice = ScriptedDice::new([4, 7, 15, 12]);
    let second = b
        .encounter
        .resolve_attack(b.tactical, b.raider, 0, &AttackOptions::default(), &mut dice)
        .unwrap();
    assert_eq!(second.base_damage, 10);
    assert_eq!(second.hit.unwrap().after_resistance, 8);
}

#[test]
fn test_difficulty_zero_rolls_nothing() {
    let mut dice = ScriptedDice::new([20, 20]);
    let result = resolve_task(&mut dice, &TaskRoll::new(10, 0)).unwrap();
    assert!(result.succeeded);
    assert_eq!(result.successes, 0);
    assert_eq!(result.momentum_generated, 0);
    assert!(result.rolls.is_empty());
    assert_eq!(dice.remaining(), 2);
}

#[test]
fn test_enemy_rejected_during_player_turn() {
    let mut b = bridge();
    let registry = ActionRegistry::builtin().unwrap();
    let mut dice = ScriptedDice::default();
    let err = b
        .encounter
        .execute_action(&registry, b.raider, &ActionRequest::new("Evasive Action"), &mut dice)
        .unwrap_err();
    assert!(matches!(err, CombatError::NotYourTurn { side: Side::Enemy, .. }));
    assert!(b.encounter.ship(b.raider).unwrap().effects.is_empty());
}

#[test]
fn test_second_claim_loses() {
    let mut b = bridge();
    b.encounter.claim_turn(b.tactical).unwrap();
    let err = b.encounter.claim_turn(b.science).unwrap_err();
    assert!(matches!(err, CombatError::TurnAlreadyClaimed { claimed_by } if claimed_by == b.tactical));

    let mut dice = ScriptedDice::default();
    let err = b
        .encounter
        .resolve_attack(b.science, b.raider, 0, &AttackOptions::default(), &mut dice)
        .unwrap_err();
    assert!(err.is_ordering());
}

#[test]
fn test_modulate_shields_lasts_until_the_following_turn_ends() {
    let mut b = bridge();
    let registry = ActionRegistry::builtin().unwrap();
    // Osei: Control 10 + Security 0 = 10, difficulty 1
    let mut dice = ScriptedDice::new([3, 18]);
    b.encounter
        .execute_action(
            &registry,
            b.science,
            &ActionRequest::new("Modulate Shields"),
            &mut dice,
        )
        .unwrap();
    let ship = b.encounter.ship(b.player_ship).unwrap();
    assert_eq!(ship.effects.merged_incoming().resistance_bonus, 2);

    // The raider's turn completes; the shield boost covered it and now expires
    b.encounter.pass(b.raider, &mut dice).unwrap();
    let ship = b.encounter.ship(b.player_ship).unwrap();
    assert!(ship.effects.is_empty());
}

#[test]
fn test_raider_destroyed_after_sustained_fire() {
    let mut b = bridge();
    {
        let raider = b.encounter.ship_mut(b.raider).unwrap();
        raider.shields.current = 0;
        for system in [
            SystemType::Structure,
            SystemType::Comms,
            SystemType::Computers,
            SystemType::Sensors,
            SystemType::Weapons,
        ] {
            raider.apply_breach(system);
        }
        assert!(raider.is_critically_damaged());
    }

    // Critically damaged ships are out of the turn order
    assert_eq!(b.encounter.winner(), Some(Side::Player));

    let mut dice = ScriptedDice::new([4, 7, 15, 12]);
    let result = b
        .encounter
        .resolve_attack(b.tactical, b.raider, 0, &AttackOptions::default(), &mut dice)
        .unwrap();
    assert_eq!(result.defender_state, DamageState::Destroyed);
    assert!(b
        .encounter
        .state
        .log
        .entries()
        .iter()
        .any(|e| matches!(e.event, CombatEventType::ShipDestroyed { ship } if ship == b.raider)));
}

#[test]
fn test_log_records_every_turn_in_order() {
    let mut b = bridge();
    let mut dice = ScriptedDice::default();
    b.encounter.pass(b.tactical, &mut dice).unwrap();
    b.encounter.pass(b.raider, &mut dice).unwrap();
    b.encounter.pass(b.science, &mut dice).unwrap();
    // A scale 4 raider takes four turns a round
    b.encounter.pass(b.raider, &mut dice).unwrap();
    b.encounter.pass(b.raider, &mut dice).unwrap();
    b.encounter.pass(b.raider, &mut dice).unwrap();

    let passes: Vec<EntityId> = b
        .encounter
        .state
        .log
        .entries()
        .iter()
        .filter(|e| e.event == CombatEventType::Pass)
        .filter_map(|e| e.actor)
        .collect();
    assert_eq!(
        passes,
        vec![b.tactical, b.raider, b.science, b.raider, b.raider, b.raider]
    );
    assert_eq!(b.encounter.state.round, 2);
}
