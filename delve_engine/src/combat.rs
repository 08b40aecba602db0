//! Combat Module
//!
//! A single attack/defend exchange, and the player and enemy attack flows built on it.
//! Rolls are always reported attacker first.

use log::info;
use variantly::Variantly;

use crate::ability::{DamageType, DiceSpec, TargetMode, UseContext, UseOutcome};
use crate::dice::{D6, DiceSource, Roll, roll_dice};
use crate::enemy::EnemyAttack;
use crate::prompt::{Prompter, TargetLine};
use crate::session::Session;
use crate::stat::StatBinding;
use crate::view::{View, ViewItem};

/// Extra defense dice while the player is barricaded.
pub const BARRICADE_DICE: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Variantly)]
pub enum ExchangeResult {
    Hit,
    Miss,
}

/// The attacker wins ties.
pub fn resolve_exchange(attacker: &Roll, defender: &Roll) -> ExchangeResult {
    if attacker.total() >= defender.total() {
        ExchangeResult::Hit
    } else {
        ExchangeResult::Miss
    }
}

/// What a landed player attack does to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitEffect {
    Damage(u32),
    Curse(u32),
}

/// Roll both sides (attacker first), report the rolls, and resolve.
pub fn exchange(
    dice: &mut dyn DiceSource,
    view: &mut View,
    attacker: &str,
    attacker_dice: u32,
    defender: &str,
    defender_dice: u32,
) -> ExchangeResult {
    let attack_roll = roll_dice(dice, attacker_dice, D6);
    view.push(ViewItem::DiceRoll {
        roller: attacker.to_string(),
        roll: attack_roll.clone(),
    });
    let defense_roll = roll_dice(dice, defender_dice, D6);
    view.push(ViewItem::DiceRoll {
        roller: defender.to_string(),
        roll: defense_roll.clone(),
    });
    let result = resolve_exchange(&attack_roll, &defense_roll);
    info!(
        "{attacker} rolls {} vs {defender} rolls {}: {result:?}",
        attack_roll.total(),
        defense_roll.total()
    );
    result
}

/// Live enemies as prompt lines.
pub fn target_lines(session: &Session) -> Vec<TargetLine> {
    session
        .encounter
        .iter()
        .enumerate()
        .filter(|(_, enemy)| !enemy.is_dead())
        .map(|(index, enemy)| TargetLine {
            index,
            name: enemy.name.clone(),
            health: enemy.health.current_hp(),
            max_health: enemy.health.max_hp(),
            cursed: enemy.is_cursed(),
        })
        .collect()
}

enum TargetPick {
    Chosen(usize),
    Cancelled,
    Invalid,
}

fn pick_single_target(session: &Session, prompt: &mut dyn Prompter) -> TargetPick {
    let lines = target_lines(session);
    if let [only] = lines.as_slice() {
        return TargetPick::Chosen(only.index);
    }
    match prompt.choose_target(&lines) {
        Some(index) if lines.iter().any(|line| line.index == index) => TargetPick::Chosen(index),
        Some(index) => {
            info!("└─ target {index} is not a live enemy");
            TargetPick::Invalid
        },
        None => TargetPick::Cancelled,
    }
}

/// Resolve one offensive effect of a player ability.
///
/// Nothing is rolled until the stat and target are settled, so backing out of either prompt
/// leaves the session untouched.
#[allow(clippy::too_many_arguments)]
pub fn player_attack(
    session: &mut Session,
    view: &mut View,
    prompt: &mut dyn Prompter,
    ctx: &mut UseContext,
    label: &str,
    spec: &DiceSpec,
    mode: TargetMode,
    effect: HitEffect,
) -> UseOutcome {
    if session.live_enemy_indices().is_empty() {
        view.push(ViewItem::ActionFailure("There is nothing to attack.".into()));
        return UseOutcome::Invalid;
    }
    let stat = match spec.stat.resolve(prompt, "attack with") {
        StatBinding::Bound(key) => Some(*session.character.stat(key)),
        StatBinding::Unbound => None,
        StatBinding::Cancelled => return UseOutcome::Cancelled,
    };
    let attack_dice = spec.dice_count(stat.as_ref());

    match mode {
        TargetMode::Single => {
            let target = match ctx.target {
                Some(index) => index,
                None => match pick_single_target(session, prompt) {
                    TargetPick::Chosen(index) => index,
                    TargetPick::Cancelled => return UseOutcome::Cancelled,
                    TargetPick::Invalid => {
                        view.push(ViewItem::ActionFailure("You can't target that.".into()));
                        return UseOutcome::Invalid;
                    },
                },
            };
            ctx.target = Some(target);
            if session.encounter.get(target).is_some_and(|enemy| !enemy.is_dead()) {
                strike_enemy(session, view, target, attack_dice, label, effect);
            }
        },
        TargetMode::All => {
            for index in session.live_enemy_indices() {
                strike_enemy(session, view, index, attack_dice, label, effect);
            }
        },
        TargetMode::Random { count } => {
            for _ in 0..count {
                let live = session.live_enemy_indices();
                if live.is_empty() {
                    break;
                }
                let index = live[session.dice.pick(live.len())];
                strike_enemy(session, view, index, attack_dice, label, effect);
            }
        },
    }
    UseOutcome::Performed
}

/// One exchange of a player ability against the enemy at `index`.
pub fn strike_enemy(
    session: &mut Session,
    view: &mut View,
    index: usize,
    attack_dice: u32,
    label: &str,
    effect: HitEffect,
) -> ExchangeResult {
    let Some(enemy) = session.encounter.get(index) else {
        return ExchangeResult::Miss;
    };
    let name = enemy.name.clone();
    let defense_dice = enemy.effective_defense();
    let result = exchange(
        session.dice.as_mut(),
        view,
        "You",
        attack_dice,
        &format!("The {name}"),
        defense_dice,
    );

    let enemy = &mut session.encounter[index];
    match result {
        ExchangeResult::Hit => {
            view.push(ViewItem::AttackHit {
                attacker: label.to_string(),
                target: format!("the {name}"),
            });
            match effect {
                HitEffect::Damage(amount) => {
                    enemy.health.damage(amount);
                    info!("└─ combat: {label} deals {amount} to {name}");
                    view.push(ViewItem::EnemyDamaged {
                        name,
                        amount,
                        remaining: enemy.health.current_hp(),
                    });
                },
                HitEffect::Curse(amount) => {
                    enemy.apply_curse(amount);
                    info!("└─ combat: {label} curses {name} ({})", enemy.curse);
                    view.push(ViewItem::EnemyCursed {
                        name,
                        turns: enemy.curse,
                    });
                },
            }
        },
        ExchangeResult::Miss => view.push(ViewItem::AttackMissed {
            attacker: label.to_string(),
            target: format!("the {name}"),
        }),
    }
    view.push(ViewItem::Acknowledge);
    result
}

/// Defense dice for an incoming attack: the single matching reaction, the player's pick among
/// several, or none at all. Barricades add to whatever is rolled.
fn defense_dice(session: &Session, view: &mut View, prompt: &mut dyn Prompter, attacker: &str, damage: DamageType) -> u32 {
    let options = session.character.reactions_for(damage);
    let base = match options.as_slice() {
        [] => {
            view.push(ViewItem::Defenseless);
            0
        },
        [(_, dice)] => *dice,
        _ => {
            let labels: Vec<String> = options.iter().map(|(name, dice)| format!("{name} ({dice} dice)")).collect();
            let best = options.iter().map(|(_, dice)| *dice).max().unwrap_or(0);
            match prompt.choose_reaction(&format!("The {attacker} attacks!"), &labels) {
                Some(choice) => options.get(choice).map_or(best, |(_, dice)| *dice),
                None => best,
            }
        },
    };
    if session.character.barricade > 0 {
        base + BARRICADE_DICE
    } else {
        base
    }
}

/// The enemy at `index` attacks the player.
pub fn enemy_attack(
    session: &mut Session,
    view: &mut View,
    prompt: &mut dyn Prompter,
    index: usize,
    attack: &EnemyAttack,
) -> ExchangeResult {
    let Some(enemy) = session.encounter.get(index) else {
        return ExchangeResult::Miss;
    };
    let name = enemy.name.clone();
    let attack_dice = enemy.attack_dice(attack.dice);
    let defense = defense_dice(session, view, prompt, &name, attack.damage);
    let attacker = format!("The {name}");
    let result = exchange(session.dice.as_mut(), view, &attacker, attack_dice, "You", defense);

    match result {
        ExchangeResult::Hit => {
            view.push(ViewItem::AttackHit {
                attacker,
                target: "you".into(),
            });
            session
                .character
                .stat_mut(attack.stat)
                .subtract(i32::try_from(attack.amount).unwrap_or(i32::MAX));
            info!(
                "└─ combat: {name} deals {} {} damage to {}",
                attack.amount, attack.damage, attack.stat
            );
            view.push(ViewItem::PlayerHarmed {
                stat: attack.stat,
                amount: attack.amount,
            });
        },
        ExchangeResult::Miss => view.push(ViewItem::AttackMissed {
            attacker,
            target: "you".into(),
        }),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::LoadedDice;

    #[test]
    fn ties_go_to_the_attacker() {
        let a = Roll { dice: vec![3, 2] };
        let d = Roll { dice: vec![5] };
        assert!(resolve_exchange(&a, &d).is_hit());
        let d = Roll { dice: vec![6] };
        assert!(resolve_exchange(&a, &d).is_miss());
    }

    #[test]
    fn zero_dice_attacker_only_hits_zero_dice_defender() {
        assert!(resolve_exchange(&Roll::default(), &Roll::default()).is_hit());
        assert!(resolve_exchange(&Roll::default(), &Roll { dice: vec![1] }).is_miss());
    }

    #[test]
    fn exchange_reports_attacker_roll_first() {
        let mut dice = LoadedDice::new([4, 1, 2]);
        let mut view = View::new();
        let result = exchange(&mut dice, &mut view, "You", 1, "The rat", 2);
        assert!(result.is_hit());
        match view.items.as_slice() {
            [ViewItem::DiceRoll { roller: first, roll: a }, ViewItem::DiceRoll { roller: second, roll: d }] => {
                assert_eq!(first, "You");
                assert_eq!(a.dice, vec![4]);
                assert_eq!(second, "The rat");
                assert_eq!(d.dice, vec![1, 2]);
            },
            other => panic!("unexpected events {other:?}"),
        }
    }
}
