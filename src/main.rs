//! Starship Tactics - command line front end
//!
//! `roll` resolves one task, `actions` lists the bridge action table and
//! `skirmish` plays a seeded demo encounter. All output is JSON.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use starship_tactics::actions::{load_action_registry, ActionRegistry, ActionRequest};
use starship_tactics::combat::{CombatLogEntry, Encounter};
use starship_tactics::core::config::{load_config, set_config};
use starship_tactics::core::error::Result;
use starship_tactics::core::types::{EntityId, Side};
use starship_tactics::crew::{Attributes, Character, CrewQuality, Disciplines};
use starship_tactics::damage::AttackOptions;
use starship_tactics::dice::SeededDice;
use starship_tactics::ship::{Departments, RangeClass, Starship, Systems, Weapon, WeaponType};
use starship_tactics::tactical::{HexCoord, TacticalMap};
use starship_tactics::task::{resolve_task, TaskRoll};

#[derive(Parser, Debug)]
#[command(name = "starship-tactics")]
#[command(about = "2d20 starship combat rules engine")]
struct Args {
    /// Rules configuration (TOML); built-in defaults when absent
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a single task roll
    Roll {
        /// Attribute + Discipline
        #[arg(long)]
        target_number: u8,

        #[arg(long, default_value_t = 1)]
        difficulty: u8,

        /// Discipline rating, used as the critical range with a focus
        #[arg(long, default_value_t = 0)]
        discipline: u8,

        #[arg(long)]
        focus: bool,

        /// Bonus dice on top of the base two
        #[arg(long, default_value_t = 0)]
        bonus_dice: u8,

        #[arg(long)]
        seed: Option<u64>,
    },

    /// List the bridge action table
    Actions {
        /// Action table (TOML); the built-in table when absent
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Play a seeded demo encounter and print its log
    Skirmish {
        #[arg(long)]
        seed: Option<u64>,

        /// Rounds before the encounter is called a draw
        #[arg(long, default_value_t = 6)]
        max_rounds: u32,
    },
}

#[derive(Serialize)]
struct ActionListing<'a> {
    name: &'a str,
    slot: String,
    category: String,
    description: &'a str,
}

#[derive(Serialize)]
struct SkirmishReport<'a> {
    seed: u64,
    rounds: u32,
    winner: Option<Side>,
    momentum: u32,
    threat: u32,
    log: &'a [CombatLogEntry],
    ships: &'a [Starship],
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("starship_tactics=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Some(path) = &args.config {
        let rules = load_config(path)?;
        if set_config(rules).is_err() {
            tracing::warn!("Rules configuration already set; ignoring {}", path.display());
        }
    }

    match args.command {
        Command::Roll {
            target_number,
            difficulty,
            discipline,
            focus,
            bonus_dice,
            seed,
        } => {
            let seed = seed.unwrap_or_else(rand::random);
            let mut dice = SeededDice::seeded(seed);
            let roll = TaskRoll::new(target_number, difficulty)
                .with_discipline(discipline)
                .with_focus(focus)
                .with_bonus_dice(bonus_dice);
            let result = resolve_task(&mut dice, &roll)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Actions { file } => {
            let registry = match file {
                Some(path) => load_action_registry(&path)?,
                None => ActionRegistry::builtin()?,
            };
            let listing: Vec<ActionListing> = registry
                .iter()
                .map(|a| ActionListing {
                    name: &a.name,
                    slot: format!("{:?}", a.slot),
                    category: format!("{:?}", a.category),
                    description: &a.description,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        Command::Skirmish { seed, max_rounds } => {
            let seed = seed.unwrap_or_else(rand::random);
            run_skirmish(seed, max_rounds)?;
        }
    }

    Ok(())
}

fn demo_encounter() -> Result<Encounter> {
    let map = TacticalMap::new(4);
    let mut encounter = Encounter::new(Some(map));

    let player_ship = encounter.add_ship(
        Starship::new(
            "USS Resolute",
            4,
            Systems {
                weapons: 10,
                structure: 9,
                ..Systems::default()
            },
            Departments {
                security: 3,
                engineering: 3,
                ..Departments::default()
            },
        )
        .with_weapon(Weapon::new("Phaser Banks", WeaponType::Energy, 8, RangeClass::Medium))
        .with_weapon(Weapon::new("Photon Torpedoes", WeaponType::Torpedo, 5, RangeClass::Long)),
    );
    let raider = encounter.add_ship(
        Starship::new(
            "Raider",
            3,
            Systems {
                weapons: 9,
                ..Systems::default()
            },
            Departments {
                security: 2,
                engineering: 2,
                ..Departments::default()
            },
        )
        .with_weapon(Weapon::new("Disruptor Cannons", WeaponType::Energy, 7, RangeClass::Medium))
        .with_crew(CrewQuality::Talented)
        .at(HexCoord::new(1, 0)),
    );

    let captain = Character::new(
        "Captain Reyes",
        Attributes {
            control: 11,
            daring: 10,
            ..Attributes::default()
        },
        Disciplines {
            command: 4,
            security: 3,
            ..Disciplines::default()
        },
    )
    .with_focus("Starship Tactics");
    let engineer = Character::new(
        "Chief Okafor",
        Attributes {
            control: 10,
            presence: 10,
            ..Attributes::default()
        },
        Disciplines {
            engineering: 4,
            science: 2,
            ..Disciplines::default()
        },
    );

    encounter.add_player(captain, player_ship)?;
    encounter.add_player(engineer, player_ship)?;
    encounter.add_npc(raider)?;
    Ok(encounter)
}

/// First living ship on the other side
fn pick_target(encounter: &Encounter, side: Side) -> Option<EntityId> {
    encounter
        .participants
        .iter()
        .filter(|p| p.side != side)
        .filter_map(|p| encounter.ship(p.ship).ok())
        .find(|s| !s.destroyed)
        .map(|s| s.id)
}

fn run_skirmish(seed: u64, max_rounds: u32) -> Result<()> {
    let registry = ActionRegistry::builtin()?;
    let mut dice = SeededDice::seeded(seed);
    let mut encounter = demo_encounter()?;
    encounter.start();

    while encounter.winner().is_none() && encounter.state.round <= max_rounds {
        let Some(actor) = encounter.next_actor() else {
            encounter.advance_turn(&mut dice)?;
            continue;
        };
        let participant = encounter.participant(actor)?.clone();
        let ship = encounter.ship(participant.ship)?.clone();

        // Engineers keep the ship together; everyone else shoots
        let is_engineer = participant.name.starts_with("Chief");
        let acted = if is_engineer && ship.total_breaches() > 0 {
            encounter
                .execute_action(&registry, actor, &ActionRequest::new("Damage Control"), &mut dice)
                .map(|_| ())
        } else if is_engineer && ship.shields.current * 2 < ship.shields.max && ship.reserve_power {
            encounter
                .execute_action(&registry, actor, &ActionRequest::new("Regenerate Shields"), &mut dice)
                .map(|_| ())
        } else {
            match pick_target(&encounter, participant.side) {
                Some(target) => encounter
                    .resolve_attack(actor, target, 0, &AttackOptions::default(), &mut dice)
                    .map(|_| ()),
                None => Ok(()),
            }
        };

        if let Err(err) = acted {
            tracing::debug!(actor = %participant.name, error = %err, "Falling back to Pass");
            if encounter.participant(actor)?.turns_left() > 0 && encounter.next_actor() == Some(actor) {
                encounter.pass(actor, &mut dice)?;
            }
        }
    }
    encounter.end_scene();

    let report = SkirmishReport {
        seed,
        rounds: encounter.state.round,
        winner: encounter.winner(),
        momentum: encounter.state.pools.momentum,
        threat: encounter.state.pools.threat,
        log: encounter.state.log.entries(),
        ships: &encounter.ships,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
