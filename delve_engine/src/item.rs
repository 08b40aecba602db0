//! Item Module
//!
//! Items carried by the player. Each item owns three ability maps: `attacks` used against
//! enemies, `actions` used on the player, and `reactions` rolled when defending.

use std::collections::BTreeMap;

use delve_data::{AbilityDef, ItemDef};
use serde::{Deserialize, Serialize};

use crate::ability::Ability;

/// Which of an item's ability maps a handle refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityGroup {
    Attack,
    Action,
    Reaction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Durability {
    pub current: u32,
    pub max: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub key: String,
    pub name: String,
    pub weight: u32,
    /// `None` for items that never wear out.
    pub durability: Option<Durability>,
    pub description: String,
    /// Hidden from inventory listings.
    pub unlisted: bool,
    pub attacks: BTreeMap<String, Ability>,
    pub actions: BTreeMap<String, Ability>,
    pub reactions: BTreeMap<String, Ability>,
}

impl Item {
    pub fn from_def(key: &str, def: &ItemDef) -> Item {
        let name = def.name.clone().unwrap_or_else(|| key.to_string());
        let build = |defs: &BTreeMap<String, AbilityDef>| {
            defs.iter()
                .map(|(ability_key, ability)| (ability_key.clone(), Ability::from_def(ability_key, ability, Some(name.as_str()))))
                .collect::<BTreeMap<_, _>>()
        };
        Item {
            key: key.to_string(),
            attacks: build(&def.attacks),
            actions: build(&def.actions),
            reactions: build(&def.reactions),
            name: name.clone(),
            weight: def.weight,
            durability: def.durability.map(|max| Durability {
                current: max.max(1),
                max: max.max(1),
            }),
            description: def.desc.clone(),
            unlisted: def.unlisted,
        }
    }

    pub fn abilities(&self, group: AbilityGroup) -> &BTreeMap<String, Ability> {
        match group {
            AbilityGroup::Attack => &self.attacks,
            AbilityGroup::Action => &self.actions,
            AbilityGroup::Reaction => &self.reactions,
        }
    }

    /// Wear the item by one use. Returns `true` if it just broke.
    pub fn wear(&mut self) -> bool {
        match &mut self.durability {
            Some(durability) => {
                durability.current = durability.current.saturating_sub(1);
                durability.current == 0
            },
            None => false,
        }
    }

    /// Inventory line, with durability when it applies.
    pub fn listing(&self) -> String {
        match self.durability {
            Some(Durability { current, max }) => format!("{} ({current}/{max})", self.name),
            None => self.name.clone(),
        }
    }
}
