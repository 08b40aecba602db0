//! Character module
//!
//! The player: four stats, an ordered inventory, innate abilities and turn-based status.

use std::collections::BTreeMap;

use delve_data::{ClassDef, GameDef};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::ability::{Ability, AbilityKind, DamageType, DiceSpec, ResistCategory, TargetMode};
use crate::error::EngineError;
use crate::item::{AbilityGroup, Item};
use crate::stat::{Stat, StatChoice, StatKey};

/// Where an ability in one of the character's lists comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbilitySource {
    Innate,
    /// Position in the inventory.
    Item(usize),
}

/// Reference to one ability the character can currently use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityHandle {
    pub group: AbilityGroup,
    pub source: AbilitySource,
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub strength: Stat,
    pub dexterity: Stat,
    pub wisdom: Stat,
    pub soul: Stat,
    pub inventory: Vec<Item>,
    pub innate_attacks: BTreeMap<String, Ability>,
    pub innate_reactions: BTreeMap<String, Ability>,
    /// Turns of barricade left.
    pub barricade: u32,
}

impl Default for Character {
    fn default() -> Self {
        Self::new()
    }
}

impl Character {
    /// A fresh character: every stat at 3/3, nothing carried, only innate abilities.
    pub fn new() -> Self {
        let mut innate_attacks = BTreeMap::new();
        innate_attacks.insert(
            "punch".to_string(),
            Ability::new(
                "Punch",
                AbilityKind::Attack {
                    dice: DiceSpec::new(StatChoice::Fixed(StatKey::Strength)),
                    amount: 1,
                    target: TargetMode::Single,
                },
            ),
        );

        let mut innate_reactions = BTreeMap::new();
        for (key, name, stat, damage) in [
            ("dodge", "Dodge", StatKey::Dexterity, DamageType::Physical),
            ("resist", "Resist", StatKey::Wisdom, DamageType::Mental),
            ("pray", "Pray", StatKey::Soul, DamageType::Spiritual),
        ] {
            innate_reactions.insert(
                key.to_string(),
                Ability::new(
                    name,
                    AbilityKind::Defend {
                        dice: DiceSpec::new(StatChoice::Fixed(stat)),
                        resist: ResistCategory::Only(damage),
                    },
                ),
            );
        }

        Self {
            strength: Stat::default(),
            dexterity: Stat::default(),
            wisdom: Stat::default(),
            soul: Stat::default(),
            inventory: Vec::new(),
            innate_attacks,
            innate_reactions,
            barricade: 0,
        }
    }

    /// Build a character from a class: stat maxima, then starting values, then inventory.
    ///
    /// # Errors
    /// - `EngineError::UnknownItem` if a starting item has no definition.
    pub fn from_class(class: &ClassDef, game: &GameDef) -> Result<Character, EngineError> {
        let mut character = Character::new();
        for (raw, max) in &class.stat_max {
            match raw.parse::<StatKey>() {
                Ok(key) => character.stat_mut(key).reset(*max),
                Err(e) => warn!("class stat_max: {e}"),
            }
        }
        for (raw, value) in &class.stat_value {
            match raw.parse::<StatKey>() {
                Ok(key) => character.stat_mut(key).set_value(*value),
                Err(e) => warn!("class stat_value: {e}"),
            }
        }
        for key in &class.inventory {
            let def = game.items.get(key).ok_or_else(|| EngineError::UnknownItem(key.clone()))?;
            character.inventory.push(Item::from_def(key, def));
        }
        Ok(character)
    }

    pub fn stat(&self, key: StatKey) -> &Stat {
        match key {
            StatKey::Strength => &self.strength,
            StatKey::Dexterity => &self.dexterity,
            StatKey::Wisdom => &self.wisdom,
            StatKey::Soul => &self.soul,
        }
    }

    pub fn stat_mut(&mut self, key: StatKey) -> &mut Stat {
        match key {
            StatKey::Strength => &mut self.strength,
            StatKey::Dexterity => &mut self.dexterity,
            StatKey::Wisdom => &mut self.wisdom,
            StatKey::Soul => &mut self.soul,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.cause_of_death().is_some()
    }

    /// The first empty stat in priority order: strength, dexterity, wisdom, soul.
    pub fn cause_of_death(&self) -> Option<StatKey> {
        StatKey::ALL.into_iter().find(|key| self.stat(*key).is_empty())
    }

    /// `STR |+++|        DEX |...`
    pub fn format_stats(&self) -> String {
        StatKey::ALL
            .iter()
            .map(|key| format!("{} {}", key.label(), self.stat(*key).format_bar()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn has_item(&self, key: &str) -> bool {
        self.inventory.iter().any(|item| item.key == key)
    }

    pub fn add_item(&mut self, item: Item) {
        info!("└─ inventory: + {}", item.key);
        self.inventory.push(item);
    }

    /// Remove the first instance of `key`, or every instance when `all` is set.
    /// Returns how many were removed.
    pub fn remove_item(&mut self, key: &str, all: bool) -> usize {
        if all {
            let before = self.inventory.len();
            self.inventory.retain(|item| item.key != key);
            before - self.inventory.len()
        } else if let Some(pos) = self.inventory.iter().position(|item| item.key == key) {
            self.inventory.remove(pos);
            1
        } else {
            0
        }
    }

    /// Listed inventory lines, in carrying order.
    pub fn inventory_lines(&self) -> Vec<String> {
        self.inventory.iter().filter(|item| !item.unlisted).map(Item::listing).collect()
    }

    pub fn apply_barricade(&mut self, amount: u32) {
        self.barricade = self.barricade.max(amount);
    }

    /// Per-round status decay.
    pub fn tick_status(&mut self) {
        self.barricade = self.barricade.saturating_sub(1);
    }

    fn collect(&self, group: AbilityGroup) -> Vec<(AbilityHandle, &Ability)> {
        let innate = match group {
            AbilityGroup::Attack => Some(&self.innate_attacks),
            AbilityGroup::Reaction => Some(&self.innate_reactions),
            AbilityGroup::Action => None,
        };
        let mut list: Vec<(AbilityHandle, &Ability)> = innate
            .into_iter()
            .flatten()
            .map(|(key, ability)| {
                let handle = AbilityHandle {
                    group,
                    source: AbilitySource::Innate,
                    key: key.clone(),
                };
                (handle, ability)
            })
            .collect();
        for (index, item) in self.inventory.iter().enumerate() {
            for (key, ability) in item.abilities(group) {
                let handle = AbilityHandle {
                    group,
                    source: AbilitySource::Item(index),
                    key: key.clone(),
                };
                list.push((handle, ability));
            }
        }
        list
    }

    /// Innate unarmed attacks followed by every carried item's attacks.
    pub fn attacks(&self) -> Vec<(AbilityHandle, &Ability)> {
        self.collect(AbilityGroup::Attack)
    }

    /// Every carried item's usable actions.
    pub fn actions(&self) -> Vec<(AbilityHandle, &Ability)> {
        self.collect(AbilityGroup::Action)
    }

    /// Innate reactions followed by every carried item's reactions.
    pub fn reactions(&self) -> Vec<(AbilityHandle, &Ability)> {
        self.collect(AbilityGroup::Reaction)
    }

    /// Reactions able to resist `damage`, with the defense dice each would roll.
    pub fn reactions_for(&self, damage: DamageType) -> Vec<(String, u32)> {
        self.reactions()
            .into_iter()
            .filter(|(_, ability)| ability.does_resist(damage))
            .map(|(_, ability)| (ability.display_name(), ability.defense_value(|key| *self.stat(key))))
            .collect()
    }

    pub fn ability(&self, handle: &AbilityHandle) -> Option<&Ability> {
        match handle.source {
            AbilitySource::Innate => match handle.group {
                AbilityGroup::Attack => self.innate_attacks.get(&handle.key),
                AbilityGroup::Reaction => self.innate_reactions.get(&handle.key),
                AbilityGroup::Action => None,
            },
            AbilitySource::Item(index) => self.inventory.get(index)?.abilities(handle.group).get(&handle.key),
        }
    }
}
