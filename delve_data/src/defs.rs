use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stable identifier used across definition references (room keys, item keys, enemy keys).
pub type Id = String;

/// Everything the engine needs to start a session, assembled from the data files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameDef {
    #[serde(default = "default_start_room")]
    pub start: Id,
    #[serde(default)]
    pub rooms: BTreeMap<Id, RoomDef>,
    #[serde(default)]
    pub items: BTreeMap<Id, ItemDef>,
    #[serde(default)]
    pub enemies: BTreeMap<Id, EnemyDef>,
    #[serde(default)]
    pub classes: BTreeMap<Id, ClassDef>,
}

impl Default for GameDef {
    fn default() -> Self {
        Self {
            start: default_start_room(),
            rooms: BTreeMap::new(),
            items: BTreeMap::new(),
            enemies: BTreeMap::new(),
            classes: BTreeMap::new(),
        }
    }
}

fn default_start_room() -> Id {
    "WHOUS".to_string()
}

/// Room definition from `level.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomDef {
    pub name: Option<String>,
    /// Description script, run every time the room is entered.
    pub desc: Option<ScriptDef>,
    #[serde(default)]
    pub exits: Vec<ExitDef>,
    /// Enemy keys spawned (in order) the first time the room is entered.
    #[serde(default)]
    pub encounter: Vec<Id>,
    /// Ambient item keys lying around, each gets generated `take` / `look` interactions.
    #[serde(default)]
    pub items: Vec<Id>,
    /// Interaction overrides: target -> verb -> script.
    #[serde(default)]
    pub interact: BTreeMap<String, BTreeMap<String, ScriptDef>>,
}

/// A labelled exit leading to another room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitDef {
    pub exit: String,
    pub target: Id,
}

/// Item definition from `items.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemDef {
    pub name: Option<String>,
    #[serde(default)]
    pub weight: u32,
    /// `None` means the item never wears out.
    pub durability: Option<u32>,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub unlisted: bool,
    #[serde(default)]
    pub attacks: BTreeMap<String, AbilityDef>,
    #[serde(default)]
    pub actions: BTreeMap<String, AbilityDef>,
    #[serde(default)]
    pub reactions: BTreeMap<String, AbilityDef>,
}

/// Raw ability record. `kind` selects the variant; unknown kinds degrade to a generic no-op.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityDef {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub name: Option<String>,
    #[serde(default = "default_ability_stat")]
    pub stat: String,
    #[serde(default)]
    pub negate: bool,
    #[serde(default)]
    pub bonus: i32,
    #[serde(default = "default_one")]
    pub amount: u32,
    #[serde(default = "default_target")]
    pub target: String,
    /// Repeats for the `random` target mode.
    #[serde(default = "default_one")]
    pub count: u32,
    pub resist: Option<String>,
    #[serde(default)]
    pub single_use: bool,
    /// Follow-up effects resolved against the same target within one use.
    #[serde(default)]
    pub then: Vec<AbilityDef>,
}

impl Default for AbilityDef {
    fn default() -> Self {
        Self {
            kind: String::new(),
            name: None,
            stat: default_ability_stat(),
            negate: false,
            bonus: 0,
            amount: 1,
            target: default_target(),
            count: 1,
            resist: None,
            single_use: false,
            then: Vec::new(),
        }
    }
}

fn default_ability_stat() -> String {
    "NONE".to_string()
}

fn default_target() -> String {
    "single".to_string()
}

fn default_one() -> u32 {
    1
}

/// Enemy definition from `enemies.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyDef {
    pub name: Option<String>,
    pub plural: Option<String>,
    #[serde(default)]
    pub desc: String,
    #[serde(default = "default_one")]
    pub health: u32,
    #[serde(default = "default_one")]
    pub defense: u32,
    #[serde(default)]
    pub actions: BTreeMap<Id, EnemyActionDef>,
}

impl Default for EnemyDef {
    fn default() -> Self {
        Self {
            name: None,
            plural: None,
            desc: String::new(),
            health: 1,
            defense: 1,
            actions: BTreeMap::new(),
        }
    }
}

/// One entry in an enemy's behavior pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyActionDef {
    #[serde(rename = "type", default = "default_enemy_action")]
    pub kind: String,
    pub name: Option<String>,
    pub text: Option<String>,
    /// Player stat damaged on a hit.
    #[serde(default = "default_enemy_stat")]
    pub stat: String,
    #[serde(default = "default_one")]
    pub dice: u32,
    #[serde(default = "default_one")]
    pub amount: u32,
    #[serde(default = "default_damage_type")]
    pub damage: String,
    /// Action forced on this enemy's next turn.
    pub next: Option<Id>,
}

impl Default for EnemyActionDef {
    fn default() -> Self {
        Self {
            kind: default_enemy_action(),
            name: None,
            text: None,
            stat: default_enemy_stat(),
            dice: 1,
            amount: 1,
            damage: default_damage_type(),
            next: None,
        }
    }
}

fn default_enemy_action() -> String {
    "attack".to_string()
}

fn default_enemy_stat() -> String {
    "STR".to_string()
}

fn default_damage_type() -> String {
    "physical".to_string()
}

/// Playable class from `classes.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassDef {
    #[serde(default)]
    pub description: String,
    /// Stat key (`STR`, `DEX`, `WIS`, `SOUL`) -> new maximum.
    #[serde(default)]
    pub stat_max: BTreeMap<String, i32>,
    /// Stat key -> starting value (applied after `stat_max`).
    #[serde(default)]
    pub stat_value: BTreeMap<String, i32>,
    #[serde(default)]
    pub inventory: Vec<Id>,
}

/// A level script node as authored in JSON: a string, a list, or a typed directive object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptDef {
    Text(String),
    Sequence(Vec<ScriptDef>),
    Directive(DirectiveDef),
}

/// Directive object. Which fields matter depends on `kind`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectiveDef {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: Option<String>,
    pub flag: Option<String>,
    pub value: Option<FlagValue>,
    pub default: Option<FlagValue>,
    pub test: Option<FlagValue>,
    pub then: Option<Box<ScriptDef>>,
    #[serde(rename = "else")]
    pub otherwise: Option<Box<ScriptDef>>,
    pub item: Option<Id>,
    #[serde(default)]
    pub all: bool,
}

/// Scalar stored in the flag store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

// Floats compare by bit pattern so flag values stay `Eq`.
impl PartialEq for FlagValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FlagValue::Bool(a), FlagValue::Bool(b)) => a == b,
            (FlagValue::Int(a), FlagValue::Int(b)) => a == b,
            (FlagValue::Float(a), FlagValue::Float(b)) => a.to_bits() == b.to_bits(),
            (FlagValue::Text(a), FlagValue::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for FlagValue {}

impl FlagValue {
    /// Truthiness used by `if` directives without an explicit test value.
    pub fn is_truthy(&self) -> bool {
        match self {
            FlagValue::Bool(b) => *b,
            FlagValue::Int(n) => *n != 0,
            FlagValue::Float(x) => !x.is_nan() && x.abs() > 0.0,
            FlagValue::Text(s) => !s.is_empty(),
        }
    }
}

impl Default for FlagValue {
    fn default() -> Self {
        FlagValue::Bool(false)
    }
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        FlagValue::Bool(value)
    }
}

impl From<i64> for FlagValue {
    fn from(value: i64) -> Self {
        FlagValue::Int(value)
    }
}

impl From<f64> for FlagValue {
    fn from(value: f64) -> Self {
        FlagValue::Float(value)
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        FlagValue::Text(value.to_string())
    }
}

impl std::fmt::Display for FlagValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlagValue::Bool(b) => write!(f, "{b}"),
            FlagValue::Int(n) => write!(f, "{n}"),
            FlagValue::Float(x) => write!(f, "{x}"),
            FlagValue::Text(s) => write!(f, "\"{s}\""),
        }
    }
}
