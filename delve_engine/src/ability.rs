//! Ability Module
//!
//! Attacks, curses, reactions, heals and barricades share one `Ability` type. The variant lives
//! in `AbilityKind`; an ability may carry follow-up effects that resolve against the same
//! target within a single use.

use std::fmt::Display;

use delve_data::AbilityDef;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use variantly::Variantly;

use crate::combat::{self, HitEffect};
use crate::prompt::Prompter;
use crate::session::Session;
use crate::stat::{Stat, StatBinding, StatChoice, StatKey};
use crate::view::{View, ViewItem};

/// Kinds of harm an enemy attack can deal; reactions resist some or all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageType {
    Physical,
    Mental,
    Spiritual,
}

impl DamageType {
    /// Parse a damage type name. Unknown names fall back to `Physical` with a warning.
    pub fn parse_or_physical(raw: &str) -> DamageType {
        match raw.trim().to_lowercase().as_str() {
            "physical" => DamageType::Physical,
            "mental" => DamageType::Mental,
            "spiritual" => DamageType::Spiritual,
            other => {
                warn!("unknown damage type '{other}': treating as physical");
                DamageType::Physical
            },
        }
    }
}

impl Display for DamageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DamageType::Physical => write!(f, "physical"),
            DamageType::Mental => write!(f, "mental"),
            DamageType::Spiritual => write!(f, "spiritual"),
        }
    }
}

/// What a reaction defends against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResistCategory {
    All,
    Only(DamageType),
}

impl ResistCategory {
    /// A missing category resists everything; an unknown one falls back to physical.
    pub fn parse(raw: Option<&str>) -> ResistCategory {
        match raw.map(|r| r.trim().to_lowercase()) {
            None => ResistCategory::All,
            Some(r) if r == "all" => ResistCategory::All,
            Some(r) => match r.as_str() {
                "physical" => ResistCategory::Only(DamageType::Physical),
                "mental" => ResistCategory::Only(DamageType::Mental),
                "spiritual" => ResistCategory::Only(DamageType::Spiritual),
                other => {
                    warn!("unknown resist category '{other}': treating as physical");
                    ResistCategory::Only(DamageType::Physical)
                },
            },
        }
    }
}

/// How an offensive ability picks its victims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetMode {
    Single,
    All,
    Random { count: u32 },
}

impl TargetMode {
    pub fn parse(raw: &str, count: u32) -> TargetMode {
        match raw.trim().to_lowercase().as_str() {
            "single" => TargetMode::Single,
            "all" => TargetMode::All,
            "random" => TargetMode::Random { count },
            other => {
                warn!("unknown target mode '{other}': treating as single");
                TargetMode::Single
            },
        }
    }
}

/// Dice pool recipe: a stat (optionally negated) plus a flat bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceSpec {
    pub stat: StatChoice,
    pub negate: bool,
    pub bonus: i32,
}

impl DiceSpec {
    pub fn new(stat: StatChoice) -> Self {
        Self {
            stat,
            negate: false,
            bonus: 0,
        }
    }

    fn from_def(def: &AbilityDef) -> Self {
        Self {
            stat: StatChoice::parse_or_none(&def.stat),
            negate: def.negate,
            bonus: def.bonus,
        }
    }

    /// Number of dice rolled given the resolved stat (or none). Never negative.
    pub fn dice_count(&self, stat: Option<&Stat>) -> u32 {
        let base = stat.map_or(0, |s| s.dice(self.negate));
        u32::try_from(base.saturating_add(self.bonus)).unwrap_or(0)
    }

    /// `[STR+1]`, `[!DEX+0]` for a negated stat, or `[+2]` with no stat.
    pub fn format_info(&self) -> String {
        let marker = if self.negate && self.stat != StatChoice::None { "!" } else { "" };
        format!("[{marker}{}{:+}]", self.stat.label(), self.bonus)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbilityKind {
    Attack { dice: DiceSpec, amount: u32, target: TargetMode },
    Curse { dice: DiceSpec, amount: u32, target: TargetMode },
    Defend { dice: DiceSpec, resist: ResistCategory },
    Heal { stat: StatChoice, amount: u32 },
    Barricade { amount: u32 },
    /// Unrecognized type kept as a no-op.
    Generic { kind: String },
}

impl AbilityKind {
    fn from_def(def: &AbilityDef, context: &str) -> AbilityKind {
        match def.kind.trim().to_lowercase().as_str() {
            "attack" => AbilityKind::Attack {
                dice: DiceSpec::from_def(def),
                amount: def.amount,
                target: TargetMode::parse(&def.target, def.count),
            },
            "curse" => AbilityKind::Curse {
                dice: DiceSpec::from_def(def),
                amount: def.amount,
                target: TargetMode::parse(&def.target, def.count),
            },
            "defend" | "reaction" => {
                let mut dice = DiceSpec::from_def(def);
                if dice.stat == StatChoice::Choose {
                    warn!("reaction '{context}' cannot choose a stat: rolling bonus only");
                    dice.stat = StatChoice::None;
                }
                AbilityKind::Defend {
                    dice,
                    resist: ResistCategory::parse(def.resist.as_deref()),
                }
            },
            "heal" => AbilityKind::Heal {
                stat: StatChoice::parse_or_none(&def.stat),
                amount: def.amount,
            },
            "barricade" => AbilityKind::Barricade { amount: def.amount },
            other => {
                warn!("unrecognized ability type '{other}' on '{context}': treating as generic");
                AbilityKind::Generic { kind: other.to_string() }
            },
        }
    }

    pub fn format_info(&self) -> String {
        match self {
            AbilityKind::Attack { dice, .. } | AbilityKind::Curse { dice, .. } | AbilityKind::Defend { dice, .. } => {
                dice.format_info()
            },
            AbilityKind::Heal {
                stat: StatChoice::None,
                amount,
            } => format!("[+{amount}]"),
            AbilityKind::Heal { stat, amount } => format!("[+{amount} {}]", stat.label()),
            AbilityKind::Barricade { amount } => format!("[{amount} turns]"),
            AbilityKind::Generic { .. } => "[]".to_string(),
        }
    }

    /// Apply this one effect. `ctx` carries the target chosen by an earlier effect of the same use.
    fn apply(
        &self,
        label: &str,
        session: &mut Session,
        view: &mut View,
        prompt: &mut dyn Prompter,
        ctx: &mut UseContext,
    ) -> UseOutcome {
        match self {
            AbilityKind::Attack { dice, amount, target } => {
                combat::player_attack(session, view, prompt, ctx, label, dice, *target, HitEffect::Damage(*amount))
            },
            AbilityKind::Curse { dice, amount, target } => {
                combat::player_attack(session, view, prompt, ctx, label, dice, *target, HitEffect::Curse(*amount))
            },
            AbilityKind::Defend { .. } => {
                view.push(ViewItem::ActionFailure(format!("{label} can only be used to react.")));
                UseOutcome::Invalid
            },
            AbilityKind::Heal { stat, amount } => {
                let key = match stat.resolve(prompt, "restore") {
                    StatBinding::Bound(key) => key,
                    StatBinding::Cancelled => return UseOutcome::Cancelled,
                    StatBinding::Unbound => {
                        warn!("heal '{label}' has no stat to restore");
                        view.push(ViewItem::ActionFailure("Nothing happens.".into()));
                        return UseOutcome::Invalid;
                    },
                };
                session.character.stat_mut(key).add(i32::try_from(*amount).unwrap_or(i32::MAX));
                info!("└─ heal: {label} restores {amount} {key}");
                view.push(ViewItem::PlayerHealed { stat: key, amount: *amount });
                UseOutcome::Performed
            },
            AbilityKind::Barricade { amount } => {
                session.character.apply_barricade(*amount);
                info!("└─ barricade: {label} (now {})", session.character.barricade);
                view.push(ViewItem::Barricaded {
                    turns: session.character.barricade,
                });
                UseOutcome::Performed
            },
            AbilityKind::Generic { kind } => {
                info!("└─ generic ability '{kind}' used: no effect");
                view.push(ViewItem::ActionFailure("Nothing happens.".into()));
                UseOutcome::Invalid
            },
        }
    }
}

/// Result of trying to use an ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Variantly)]
pub enum UseOutcome {
    /// The action committed; the round advances.
    Performed,
    /// The player backed out before anything happened.
    Cancelled,
    /// The action could not be taken; nothing changed.
    Invalid,
}

/// State shared between the effects of one use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UseContext {
    /// Encounter index picked by the first single-target effect.
    pub target: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ability {
    pub name: String,
    /// Name of the item this ability belongs to, for display only.
    pub owner: Option<String>,
    pub single_use: bool,
    pub kind: AbilityKind,
    pub follow_ups: Vec<AbilityKind>,
}

impl Ability {
    pub fn new(name: impl Into<String>, kind: AbilityKind) -> Self {
        Self {
            name: name.into(),
            owner: None,
            single_use: false,
            kind,
            follow_ups: Vec::new(),
        }
    }

    pub fn from_def(key: &str, def: &AbilityDef, owner: Option<&str>) -> Self {
        let name = def.name.clone().unwrap_or_else(|| key.to_string());
        let kind = AbilityKind::from_def(def, &name);
        let follow_ups = def.then.iter().map(|d| AbilityKind::from_def(d, &name)).collect();
        Self {
            name,
            owner: owner.map(str::to_string),
            single_use: def.single_use,
            kind,
            follow_ups,
        }
    }

    /// Name as shown in lists and narration, e.g. "Slash (rusty sword)".
    pub fn display_name(&self) -> String {
        match &self.owner {
            Some(owner) => format!("{} ({owner})", self.name),
            None => self.name.clone(),
        }
    }

    pub fn format_info(&self) -> String {
        self.kind.format_info()
    }

    /// One line for ability listings.
    pub fn listing(&self) -> String {
        let single = if self.single_use { " (single use)" } else { "" };
        format!("{} {}{single}", self.display_name(), self.format_info())
    }

    /// Defender dice this ability grants when used as a reaction. Non-reactions grant none.
    pub fn defense_value(&self, stat_of: impl Fn(StatKey) -> Stat) -> u32 {
        match &self.kind {
            AbilityKind::Defend { dice, .. } => {
                let stat = match dice.stat {
                    StatChoice::Fixed(key) => Some(stat_of(key)),
                    StatChoice::None | StatChoice::Choose => None,
                };
                dice.dice_count(stat.as_ref())
            },
            _ => 0,
        }
    }

    pub fn does_resist(&self, damage: DamageType) -> bool {
        match &self.kind {
            AbilityKind::Defend { resist, .. } => match resist {
                ResistCategory::All => true,
                ResistCategory::Only(kind) => *kind == damage,
            },
            _ => false,
        }
    }

    /// Resolve every effect in order. A cancellation or invalid result before anything
    /// committed is returned as-is; once an effect is performed the use counts as performed.
    pub fn use_ability(&self, session: &mut Session, view: &mut View, prompt: &mut dyn Prompter) -> UseOutcome {
        let label = self.display_name();
        let mut ctx = UseContext::default();
        let mut performed = false;
        for effect in std::iter::once(&self.kind).chain(&self.follow_ups) {
            match effect.apply(&label, session, view, prompt, &mut ctx) {
                UseOutcome::Performed => performed = true,
                outcome if !performed => return outcome,
                _ => break,
            }
        }
        if performed { UseOutcome::Performed } else { UseOutcome::Invalid }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(json: &str) -> AbilityDef {
        serde_json::from_str(json).expect("parse ability def")
    }

    #[test]
    fn format_info_renders_stat_bonus_and_negation() {
        let slash = Ability::from_def("slash", &def(r#"{"type":"attack","stat":"STR","bonus":1}"#), None);
        assert_eq!(slash.format_info(), "[STR+1]");

        let flail = Ability::from_def("flail", &def(r#"{"type":"attack","stat":"dex","negate":true}"#), None);
        assert_eq!(flail.format_info(), "[!DEX+0]");

        let bolt = Ability::from_def("bolt", &def(r#"{"type":"attack","bonus":2}"#), None);
        assert_eq!(bolt.format_info(), "[+2]");

        let weak = Ability::from_def("weak", &def(r#"{"type":"curse","bonus":-1}"#), None);
        assert_eq!(weak.format_info(), "[-1]");
    }

    #[test]
    fn unknown_definitions_degrade_to_safe_defaults() {
        let odd = Ability::from_def("juggle", &def(r#"{"type":"juggle"}"#), Some("balls"));
        assert_eq!(odd.kind, AbilityKind::Generic { kind: "juggle".into() });
        assert_eq!(odd.display_name(), "juggle (balls)");

        let shield = Ability::from_def("block", &def(r#"{"type":"defend","resist":"fire"}"#), None);
        assert!(shield.does_resist(DamageType::Physical));
        assert!(!shield.does_resist(DamageType::Mental));
    }

    #[test]
    fn resist_all_matches_every_damage_type() {
        let ward = Ability::from_def("ward", &def(r#"{"type":"defend","resist":"all","stat":"WIS"}"#), None);
        for damage in [DamageType::Physical, DamageType::Mental, DamageType::Spiritual] {
            assert!(ward.does_resist(damage));
        }
        let punch = Ability::from_def("punch", &def(r#"{"type":"attack"}"#), None);
        assert!(!punch.does_resist(DamageType::Physical));
    }

    #[test]
    fn defense_value_uses_stat_negation_and_bonus() {
        let mut wis = Stat::new(5);
        wis.set_value(2);
        let calm = Ability::from_def("calm", &def(r#"{"type":"defend","stat":"WIS","bonus":1}"#), None);
        assert_eq!(calm.defense_value(|_| wis), 3);

        let despair = Ability::from_def("despair", &def(r#"{"type":"defend","stat":"WIS","negate":true}"#), None);
        assert_eq!(despair.defense_value(|_| wis), 4);

        let clumsy = Ability::from_def("clumsy", &def(r#"{"type":"defend","bonus":-3}"#), None);
        assert_eq!(clumsy.defense_value(|_| wis), 0);
    }

    #[test]
    fn follow_up_effects_are_parsed_in_order() {
        let drain = Ability::from_def(
            "drain",
            &def(r#"{"type":"attack","stat":"SOUL","then":[{"type":"curse","amount":2},{"type":"heal","stat":"STR"}]}"#),
            None,
        );
        assert_eq!(drain.follow_ups.len(), 2);
        assert!(matches!(drain.follow_ups[0], AbilityKind::Curse { amount: 2, .. }));
        assert!(matches!(
            drain.follow_ups[1],
            AbilityKind::Heal {
                stat: StatChoice::Fixed(StatKey::Strength),
                amount: 1
            }
        ));
    }

    #[test]
    fn random_target_mode_keeps_its_count() {
        let spray = Ability::from_def("spray", &def(r#"{"type":"attack","target":"random","count":3}"#), None);
        assert!(matches!(spray.kind, AbilityKind::Attack { target: TargetMode::Random { count: 3 }, .. }));
    }
}
