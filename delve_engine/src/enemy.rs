//! Enemy Module
//!
//! Enemy instances spawned into an encounter, their action pools and curse status.

use std::collections::BTreeMap;

use delve_data::{EnemyActionDef, EnemyDef};
use log::warn;
use serde::{Deserialize, Serialize};
use variantly::Variantly;

use crate::ability::DamageType;
use crate::dice::DiceSource;
use crate::health::{HealthState, LifeState};
use crate::helpers::{join_list_pretty, with_article};
use crate::stat::StatKey;

/// Curse value meaning "not cursed".
pub const CURSE_INACTIVE: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyAttack {
    /// Player stat damaged on a hit.
    pub stat: StatKey,
    pub dice: u32,
    pub amount: u32,
    pub damage: DamageType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyMove {
    Attack(EnemyAttack),
    Wait,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyAction {
    pub key: String,
    pub name: String,
    pub text: Option<String>,
    pub kind: EnemyMove,
    /// Action forced on the following turn.
    pub next: Option<String>,
}

impl EnemyAction {
    pub fn from_def(key: &str, def: &EnemyActionDef) -> Self {
        let kind = match def.kind.trim().to_lowercase().as_str() {
            "attack" => EnemyMove::Attack(EnemyAttack {
                stat: def.stat.parse().unwrap_or_else(|e| {
                    warn!("enemy action '{key}': {e}, targeting STR");
                    StatKey::Strength
                }),
                dice: def.dice,
                amount: def.amount,
                damage: DamageType::parse_or_physical(&def.damage),
            }),
            "wait" => EnemyMove::Wait,
            other => {
                warn!("unrecognized enemy action type '{other}' on '{key}': treating as wait");
                EnemyMove::Wait
            },
        };
        Self {
            key: key.to_string(),
            name: def.name.clone().unwrap_or_else(|| key.to_string()),
            text: def.text.clone(),
            kind,
            next: def.next.clone(),
        }
    }
}

/// What an enemy does on its turn.
#[derive(Debug, Clone, PartialEq, Eq, Variantly)]
pub enum EnemyTurn {
    Idle,
    Acting(EnemyAction),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enemy {
    pub key: String,
    pub name: String,
    pub plural: String,
    pub description: String,
    pub health: HealthState,
    /// Base defense dice.
    pub defense: u32,
    pub actions: BTreeMap<String, EnemyAction>,
    /// `-1` inactive, `0` expiring this turn, `>0` turns remaining.
    pub curse: i32,
    pub next_action: Option<String>,
}

impl Enemy {
    pub fn from_def(key: &str, def: &EnemyDef) -> Self {
        let name = def.name.clone().unwrap_or_else(|| key.to_string());
        Self {
            key: key.to_string(),
            plural: def.plural.clone().unwrap_or_else(|| format!("{name}s")),
            name,
            description: def.desc.clone(),
            health: HealthState::new_at_max(def.health),
            defense: def.defense,
            actions: def
                .actions
                .iter()
                .map(|(action_key, action)| (action_key.clone(), EnemyAction::from_def(action_key, action)))
                .collect(),
            curse: CURSE_INACTIVE,
            next_action: None,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health.life_state() == LifeState::Dead
    }

    pub fn is_cursed(&self) -> bool {
        self.curse >= 0
    }

    /// Curses don't stack; the longer one wins.
    pub fn apply_curse(&mut self, amount: u32) {
        self.curse = self.curse.max(i32::try_from(amount).unwrap_or(i32::MAX));
    }

    /// Count the curse down by one round, stopping at inactive.
    pub fn tick_curse(&mut self) {
        if self.curse > CURSE_INACTIVE {
            self.curse -= 1;
        }
    }

    fn weakened(&self, dice: u32) -> u32 {
        if self.is_cursed() && dice > 1 { dice - 1 } else { dice }
    }

    /// Defense dice after any curse.
    pub fn effective_defense(&self) -> u32 {
        self.weakened(self.defense)
    }

    /// Attack dice after any curse.
    pub fn attack_dice(&self, base: u32) -> u32 {
        self.weakened(base)
    }

    /// Pick this turn's action: a queued follow-up first, otherwise a uniform pick from the
    /// pool. The chosen action's own follow-up is queued for next turn.
    pub fn next_turn(&mut self, dice: &mut dyn DiceSource) -> EnemyTurn {
        let forced = self.next_action.take().and_then(|key| {
            let action = self.actions.get(&key).cloned();
            if action.is_none() {
                warn!("enemy '{}' has no action '{key}': choosing at random", self.key);
            }
            action
        });
        let chosen = forced.or_else(|| {
            if self.actions.is_empty() {
                return None;
            }
            let index = dice.pick(self.actions.len());
            self.actions.values().nth(index).cloned()
        });
        match chosen {
            Some(action) => {
                self.next_action.clone_from(&action.next);
                EnemyTurn::Acting(action)
            },
            None => EnemyTurn::Idle,
        }
    }
}

/// "a goblin", "2 goblins and a rat", "a bat, 3 rats, and an ogre". Groups by name, sorted.
pub fn ambush_text(encounter: &[Enemy]) -> String {
    let mut groups: BTreeMap<&str, (usize, &str)> = BTreeMap::new();
    for enemy in encounter {
        let entry = groups.entry(enemy.name.as_str()).or_insert((0, enemy.plural.as_str()));
        entry.0 += 1;
    }
    let parts: Vec<String> = groups
        .into_iter()
        .map(|(name, (count, plural))| {
            if count == 1 {
                with_article(name)
            } else {
                format!("{count} {plural}")
            }
        })
        .collect();
    join_list_pretty(&parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::LoadedDice;

    fn goblin_def() -> EnemyDef {
        serde_json::from_str(
            r#"{
                "name": "goblin",
                "health": 3,
                "defense": 3,
                "actions": {
                    "stab": { "type": "attack", "dice": 2, "amount": 1 },
                    "windup": { "type": "wait", "text": "The goblin winds up.", "next": "smash" },
                    "smash": { "type": "attack", "dice": 4, "amount": 2 }
                }
            }"#,
        )
        .expect("parse goblin")
    }

    #[test]
    fn defaults_fill_name_plural_and_health() {
        let rat = Enemy::from_def("rat", &EnemyDef::default());
        assert_eq!(rat.name, "rat");
        assert_eq!(rat.plural, "rats");
        assert_eq!(rat.health.current_hp(), 1);
        assert!(!rat.is_cursed());
    }

    #[test]
    fn curse_is_idempotent_max() {
        let mut goblin = Enemy::from_def("goblin", &goblin_def());
        goblin.apply_curse(2);
        goblin.apply_curse(1);
        assert_eq!(goblin.curse, 2);
    }

    #[test]
    fn curse_reduces_dice_but_never_below_one() {
        let mut goblin = Enemy::from_def("goblin", &goblin_def());
        goblin.apply_curse(1);
        assert_eq!(goblin.effective_defense(), 2);
        assert_eq!(goblin.attack_dice(1), 1);

        goblin.defense = 1;
        assert_eq!(goblin.effective_defense(), 1);
    }

    #[test]
    fn curse_expires_after_counting_past_zero() {
        let mut goblin = Enemy::from_def("goblin", &goblin_def());
        goblin.apply_curse(1);
        goblin.tick_curse();
        assert_eq!(goblin.curse, 0);
        assert!(goblin.is_cursed());
        goblin.tick_curse();
        assert!(!goblin.is_cursed());
        goblin.tick_curse();
        assert_eq!(goblin.curse, CURSE_INACTIVE);
        assert_eq!(goblin.effective_defense(), 3);
    }

    #[test]
    fn chained_action_is_forced_once() {
        let mut goblin = Enemy::from_def("goblin", &goblin_def());
        // BTreeMap order: smash, stab, windup
        let mut dice = LoadedDice::default().with_picks([2, 1]);
        let first = goblin.next_turn(&mut dice);
        assert!(matches!(first, EnemyTurn::Acting(ref a) if a.key == "windup"));
        assert_eq!(goblin.next_action.as_deref(), Some("smash"));

        let second = goblin.next_turn(&mut dice);
        assert!(matches!(second, EnemyTurn::Acting(ref a) if a.key == "smash"));
        assert!(goblin.next_action.is_none());

        let third = goblin.next_turn(&mut dice);
        assert!(matches!(third, EnemyTurn::Acting(ref a) if a.key == "stab"));
    }

    #[test]
    fn empty_pool_idles() {
        let mut statue = Enemy::from_def("statue", &EnemyDef::default());
        assert!(statue.next_turn(&mut LoadedDice::default()).is_idle());
    }

    #[test]
    fn ambush_text_groups_and_joins() {
        let goblin = Enemy::from_def("goblin", &goblin_def());
        let ogre = Enemy::from_def("ogre", &EnemyDef::default());
        assert_eq!(ambush_text(std::slice::from_ref(&goblin)), "a goblin");
        assert_eq!(ambush_text(&[goblin.clone(), ogre.clone(), goblin.clone()]), "2 goblins and an ogre");
        let rat = Enemy::from_def("rat", &EnemyDef::default());
        assert_eq!(ambush_text(&[rat, ogre, goblin]), "a goblin, an ogre, and a rat");
    }
}
