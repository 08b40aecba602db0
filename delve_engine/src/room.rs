//! Room definitions and exits.
//!
//! Rooms are built once from their definitions when a session starts; their scripts are
//! converted up front so definition problems are logged a single time.

use std::collections::BTreeMap;

use delve_data::RoomDef;

use crate::script::ScriptNode;

/// A labelled exit from one room to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exit {
    pub label: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub key: String,
    pub name: Option<String>,
    pub description: Option<ScriptNode>,
    pub exits: Vec<Exit>,
    /// Enemy keys spawned on first entry.
    pub encounter: Vec<String>,
    /// Ambient item keys available to take.
    pub items: Vec<String>,
    /// Interaction overrides: target -> verb -> script.
    pub interact: BTreeMap<String, BTreeMap<String, ScriptNode>>,
}

impl Room {
    pub fn from_def(key: &str, def: &RoomDef) -> Room {
        Room {
            key: key.to_string(),
            name: def.name.clone(),
            description: def.desc.as_ref().map(ScriptNode::from_def),
            exits: def
                .exits
                .iter()
                .map(|exit| Exit {
                    label: exit.exit.clone(),
                    to: exit.target.clone(),
                })
                .collect(),
            encounter: def.encounter.clone(),
            items: def.items.clone(),
            interact: def
                .interact
                .iter()
                .map(|(target, verbs)| {
                    let verbs = verbs
                        .iter()
                        .map(|(verb, script)| (verb.to_lowercase(), ScriptNode::from_def(script)))
                        .collect();
                    (target.to_lowercase(), verbs)
                })
                .collect(),
        }
    }

    /// Name for listings: the room's name, or its key if it has none.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.key)
    }

    /// Scripted override for `verb target`, matched case-insensitively.
    pub fn interaction(&self, target: &str, verb: &str) -> Option<&ScriptNode> {
        self.interact.get(&target.to_lowercase())?.get(&verb.to_lowercase())
    }

    /// Find an exit by 1-based index or case-insensitive label.
    pub fn find_exit(&self, input: &str) -> Option<&Exit> {
        let input = input.trim();
        if let Ok(n) = input.parse::<usize>() {
            return n.checked_sub(1).and_then(|i| self.exits.get(i));
        }
        self.exits.iter().find(|exit| exit.label.eq_ignore_ascii_case(input))
    }
}
