//! View module.
//! Rather than printing from each handler, resolvers push `ViewItem`s to a `View`, and the
//! presentation layer drains and displays them at the end of the turn. `Acknowledge` items mark
//! the points where the presentation should pause for the player.
use std::fmt::Display;
use std::io::{self, Write};

use variantly::Variantly;

use crate::dice::Roll;
use crate::helpers::plural_s;
use crate::stat::StatKey;

/// Buffer of events produced during one turn.
#[derive(Debug, Clone, Default)]
pub struct View {
    pub items: Vec<ViewItem>,
}

impl View {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: ViewItem) {
        self.items.push(item);
    }

    /// Take every buffered item, leaving the view empty for the next turn.
    pub fn drain(&mut self) -> Vec<ViewItem> {
        std::mem::take(&mut self.items)
    }

    /// Count buffered items matching a predicate.
    pub fn count(&self, pred: impl Fn(&ViewItem) -> bool) -> usize {
        self.items.iter().filter(|item| pred(item)).count()
    }

    /// Write every buffered item as plain text and clear the buffer. Pauses are skipped.
    ///
    /// # Errors
    /// Returns any error from the underlying writer.
    pub fn flush(&mut self, out: &mut impl Write) -> io::Result<()> {
        for item in self.drain() {
            if !item.is_acknowledge() {
                writeln!(out, "{item}")?;
            }
        }
        Ok(())
    }
}

/// An exit shown on room entry. `destination` is only known for explored rooms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitLine {
    pub label: String,
    pub destination: Option<String>,
}

/// Each kind of information the engine reports back to the player.
#[derive(Debug, Clone, PartialEq, Eq, Variantly)]
pub enum ViewItem {
    // rooms and scripts
    RoomEntered { name: Option<String> },
    RoomText(String),
    NothingNoteworthy,
    ExitList(Vec<ExitLine>),
    NoExits,
    Ambush(String),
    ItemReceived { name: String },
    ItemRemoved { name: String, count: usize },
    AlreadyTaken { name: String },
    ItemDescription { name: String, description: String },

    // combat
    DiceRoll { roller: String, roll: Roll },
    Defenseless,
    AttackHit { attacker: String, target: String },
    AttackMissed { attacker: String, target: String },
    EnemyDamaged { name: String, amount: u32, remaining: u32 },
    EnemyCursed { name: String, turns: i32 },
    EnemyKilled { name: String },
    EncounterCleared,
    EnemyAction { name: String, text: String },
    EnemyIdle { name: String },
    PlayerHarmed { stat: StatKey, amount: u32 },
    PlayerHealed { stat: StatKey, amount: u32 },
    Barricaded { turns: u32 },
    ItemBroken { name: String },
    PlayerDeath { cause: StatKey },
    Acknowledge,

    // queries
    StatSheet(String),
    StatHelp { stat: StatKey, description: String, death: String },
    Inventory(Vec<String>),
    AbilityList { heading: String, lines: Vec<String> },
    Help(Vec<(String, String)>),

    ActionFailure(String),
    ActionSuccess(String),
    EngineMessage(String),
    Error(String),
}

impl Display for ViewItem {
    #[allow(clippy::too_many_lines)]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewItem::RoomEntered { name: Some(name) } => write!(f, "You enter the '{name}'."),
            ViewItem::RoomEntered { name: None } => write!(f, "You enter the room."),
            ViewItem::RoomText(text)
            | ViewItem::StatSheet(text)
            | ViewItem::ActionFailure(text)
            | ViewItem::ActionSuccess(text)
            | ViewItem::EngineMessage(text) => write!(f, "{text}"),
            ViewItem::NothingNoteworthy => write!(f, "There is nothing noteworthy about this room."),
            ViewItem::ExitList(exits) => {
                write!(f, "There {} {} exit{}:", if exits.len() == 1 { "is" } else { "are" }, exits.len(), plural_s(exits.len()))?;
                for (i, exit) in exits.iter().enumerate() {
                    let dest = exit.destination.as_deref().unwrap_or("???");
                    write!(f, "\n  {}. {} -> {dest}", i + 1, exit.label)?;
                }
                Ok(())
            },
            ViewItem::NoExits => write!(f, "There appears to be nowhere to go..."),
            ViewItem::Ambush(enemies) => write!(f, "You are ambushed by {enemies}!"),
            ViewItem::ItemReceived { name } => write!(f, "You receive the {name}."),
            ViewItem::ItemRemoved { name, count } => {
                if *count == 1 {
                    write!(f, "The {name} is taken from you.")
                } else {
                    write!(f, "{count} {name}{} are taken from you.", plural_s(*count))
                }
            },
            ViewItem::AlreadyTaken { name } => write!(f, "You already took the {name}."),
            ViewItem::ItemDescription { name, description } => write!(f, "{name}: {description}"),
            ViewItem::DiceRoll { roller, roll } => write!(f, "{roller} rolls {roll}"),
            ViewItem::Defenseless => write!(f, "You have no way to defend against that!"),
            ViewItem::AttackHit { attacker, target } => write!(f, "{attacker} hits {target}!"),
            ViewItem::AttackMissed { attacker, target } => write!(f, "{attacker} misses {target}."),
            ViewItem::EnemyDamaged { name, amount, remaining } => {
                write!(f, "The {name} takes {amount} damage ({remaining} left).")
            },
            ViewItem::EnemyCursed { name, turns } => {
                write!(f, "The {name} is cursed for {turns} turn{}.", if *turns == 1 { "" } else { "s" })
            },
            ViewItem::EnemyKilled { name } => write!(f, "You killed the {name}!"),
            ViewItem::EncounterCleared => write!(f, "All enemies have been defeated."),
            ViewItem::EnemyAction { text, .. } => write!(f, "{text}"),
            ViewItem::EnemyIdle { name } => write!(f, "The {name} does nothing."),
            ViewItem::PlayerHarmed { stat, amount } => write!(f, "You lose {amount} {stat}."),
            ViewItem::PlayerHealed { stat, amount } => write!(f, "You recover {amount} {stat}."),
            ViewItem::Barricaded { turns } => {
                write!(f, "You are barricaded for {turns} turn{}.", if *turns == 1 { "" } else { "s" })
            },
            ViewItem::ItemBroken { name } => write!(f, "Your {name} breaks!"),
            ViewItem::PlayerDeath { cause } => write!(f, "{}", cause.death_text()),
            ViewItem::Acknowledge => Ok(()),
            ViewItem::StatHelp { stat, description, death } => {
                write!(f, "{stat}: {description}\nIf you run out: {death}")
            },
            ViewItem::Inventory(lines) => {
                if lines.is_empty() {
                    write!(f, "You are carrying nothing.")
                } else {
                    write!(f, "Inventory:")?;
                    for line in lines {
                        write!(f, "\n  {line}")?;
                    }
                    Ok(())
                }
            },
            ViewItem::AbilityList { heading, lines } => {
                write!(f, "{heading}:")?;
                for (i, line) in lines.iter().enumerate() {
                    write!(f, "\n  {}. {line}", i + 1)?;
                }
                Ok(())
            },
            ViewItem::Help(entries) => {
                write!(f, "Commands:")?;
                for (verb, desc) in entries {
                    write!(f, "\n  {verb:<8} {desc}")?;
                }
                Ok(())
            },
            ViewItem::Error(msg) => write!(f, "Error: {msg}"),
        }
    }
}
