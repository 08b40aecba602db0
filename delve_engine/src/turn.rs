//! Turn Module
//!
//! Everything that happens after the player's action resolves: dead enemies are purged, each
//! live enemy acts in encounter order, then the player's status effects tick down.

use log::info;

use crate::combat;
use crate::enemy::{EnemyMove, EnemyTurn};
use crate::prompt::Prompter;
use crate::session::Session;
use crate::view::{View, ViewItem};

/// Run the rest of the round after a performed player action.
pub fn end_round(session: &mut Session, view: &mut View, prompt: &mut dyn Prompter) {
    purge_dead(session, view);
    if !session.character.is_dead() {
        enemy_phase(session, view, prompt);
    }
    session.character.tick_status();
    if let Some(cause) = session.character.cause_of_death() {
        info!("└─ player died ({})", cause.key());
        view.push(ViewItem::PlayerDeath { cause });
    }
}

/// Remove enemies at 0 health, announcing each. Returns how many were removed.
///
/// If this empties a non-empty encounter, the current room is marked cleared so its encounter
/// never spawns again.
pub fn purge_dead(session: &mut Session, view: &mut View) -> usize {
    let was_empty = session.encounter.is_empty();
    let mut killed = 0;
    session.encounter.retain(|enemy| {
        if enemy.is_dead() {
            info!("└─ combat: {} killed", enemy.key);
            view.push(ViewItem::EnemyKilled {
                name: enemy.name.clone(),
            });
            killed += 1;
            false
        } else {
            true
        }
    });
    if !was_empty && session.encounter.is_empty() {
        info!("└─ combat: room '{}' cleared", session.room);
        session.cleared.insert(session.room.clone());
        view.push(ViewItem::EncounterCleared);
    }
    killed
}

/// Each live enemy takes its turn, stopping early if the player dies.
pub fn enemy_phase(session: &mut Session, view: &mut View, prompt: &mut dyn Prompter) {
    for index in 0..session.encounter.len() {
        if session.character.is_dead() {
            break;
        }
        if session.encounter[index].is_dead() {
            continue;
        }
        take_enemy_turn(session, view, prompt, index);
    }
}

/// One enemy's turn: its curse counts down, then it acts.
pub fn take_enemy_turn(session: &mut Session, view: &mut View, prompt: &mut dyn Prompter, index: usize) {
    let enemy = &mut session.encounter[index];
    enemy.tick_curse();
    let name = enemy.name.clone();
    match enemy.next_turn(session.dice.as_mut()) {
        EnemyTurn::Idle => {
            info!("└─ enemy: {name} has nothing to do");
            view.push(ViewItem::EnemyIdle { name });
        },
        EnemyTurn::Acting(action) => {
            info!("└─ enemy: {name} uses '{}'", action.key);
            let text = action.text.clone().unwrap_or_else(|| match action.kind {
                EnemyMove::Attack(_) => format!("The {name} uses {}!", action.name),
                EnemyMove::Wait => format!("The {name} waits."),
            });
            view.push(ViewItem::EnemyAction { name, text });
            if let EnemyMove::Attack(attack) = &action.kind {
                combat::enemy_attack(session, view, prompt, index, attack);
            }
        },
    }
    view.push(ViewItem::Acknowledge);
}
