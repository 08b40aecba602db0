//! Session module
//!
//! One mutable aggregate holding the whole game state: the player, the active encounter, the
//! flag store and the room pointer. Every resolver takes it by `&mut`.

use std::collections::{BTreeMap, HashSet};

use anyhow::{Context, Result};
use delve_data::GameDef;
use log::{info, warn};

use crate::ability::UseOutcome;
use crate::character::{AbilityHandle, AbilitySource, Character};
use crate::dice::DiceSource;
use crate::enemy::{Enemy, ambush_text};
use crate::error::EngineError;
use crate::flags::FlagStore;
use crate::helpers::{join_list_pretty, with_article};
use crate::prompt::Prompter;
use crate::room::Room;
use crate::script::{ambient_interaction, run_script, taken_flag};
use crate::turn;
use crate::view::{ExitLine, View, ViewItem};

#[derive(Debug)]
pub struct Session {
    pub game: GameDef,
    pub rooms: BTreeMap<String, Room>,
    pub character: Character,
    pub encounter: Vec<Enemy>,
    pub flags: FlagStore,
    /// Key of the room the player is in.
    pub room: String,
    pub explored: HashSet<String>,
    /// Rooms whose encounter has been defeated.
    pub cleared: HashSet<String>,
    pub dice: Box<dyn DiceSource>,
}

impl Session {
    /// Build a session positioned (but not yet announced) in the start room.
    ///
    /// # Errors
    /// - `EngineError::NoStartRoom` if the start room has no definition.
    pub fn new(game: GameDef, character: Character, dice: Box<dyn DiceSource>) -> Result<Session, EngineError> {
        if !game.rooms.contains_key(&game.start) {
            return Err(EngineError::NoStartRoom(game.start.clone()));
        }
        let rooms = game.rooms.iter().map(|(key, def)| (key.clone(), Room::from_def(key, def))).collect();
        Ok(Session {
            room: game.start.clone(),
            game,
            rooms,
            character,
            encounter: Vec::new(),
            flags: FlagStore::new(),
            explored: HashSet::new(),
            cleared: HashSet::new(),
            dice,
        })
    }

    /// Build a session for the named class.
    ///
    /// # Errors
    /// - `EngineError::UnknownClass` if no such class exists.
    /// - Any error building the character's starting inventory or the session.
    pub fn with_class(game: GameDef, class: &str, dice: Box<dyn DiceSource>) -> Result<Session> {
        let class_def = game
            .classes
            .get(class)
            .ok_or_else(|| EngineError::UnknownClass(class.to_string()))?;
        let character =
            Character::from_class(class_def, &game).with_context(|| format!("building character for class '{class}'"))?;
        info!("class '{class}' selected");
        Ok(Session::new(game, character, dice)?)
    }

    /// Sorted class names with descriptions.
    pub fn class_list(game: &GameDef) -> Vec<(String, String)> {
        game.classes.iter().map(|(name, class)| (name.clone(), class.description.clone())).collect()
    }

    /// Enter the start room.
    ///
    /// # Errors
    /// - Any error raised by the start room's description script.
    pub fn start(&mut self, view: &mut View) -> Result<()> {
        let start = self.game.start.clone();
        self.enter_room(view, &start)
    }

    pub fn current_room(&self) -> Result<&Room, EngineError> {
        self.rooms.get(&self.room).ok_or_else(|| EngineError::UnknownRoom(self.room.clone()))
    }

    pub fn in_combat(&self) -> bool {
        !self.encounter.is_empty()
    }

    pub fn is_over(&self) -> bool {
        self.character.is_dead()
    }

    pub fn live_enemy_indices(&self) -> Vec<usize> {
        self.encounter
            .iter()
            .enumerate()
            .filter(|(_, enemy)| !enemy.is_dead())
            .map(|(index, _)| index)
            .collect()
    }

    /// Display name for an item key, falling back to the key itself.
    pub fn item_name(&self, key: &str) -> String {
        self.game
            .items
            .get(key)
            .and_then(|def| def.name.clone())
            .unwrap_or_else(|| key.to_string())
    }

    /// Move into `key`: announce it, run its description, list exits, and spring its encounter
    /// unless it was already cleared.
    ///
    /// # Errors
    /// - Any error raised by the room's description script.
    pub fn enter_room(&mut self, view: &mut View, key: &str) -> Result<()> {
        if !self.rooms.contains_key(key) {
            warn!("unrecognized location '{key}'");
            view.push(ViewItem::ActionFailure(format!("Unrecognized location '{key}'")));
            return Ok(());
        }
        info!("└─ move: entering '{key}'");
        self.room = key.to_string();
        self.explored.insert(key.to_string());
        self.describe_room(view)?;
        self.spring_encounter(view);
        Ok(())
    }

    /// Repeat the current room's description without touching its encounter.
    ///
    /// # Errors
    /// - `EngineError::UnknownRoom` if the room pointer is invalid, or any script error.
    pub fn describe_room(&mut self, view: &mut View) -> Result<()> {
        let room = self.current_room()?.clone();
        view.push(ViewItem::RoomEntered { name: room.name.clone() });
        match &room.description {
            Some(script) => run_script(self, view, script).with_context(|| format!("describing room '{}'", room.key))?,
            None => view.push(ViewItem::NothingNoteworthy),
        }

        let remaining: Vec<String> = room
            .items
            .iter()
            .filter(|item| !self.flags.is_set(&taken_flag(&room.key, item)))
            .map(|item| with_article(&self.item_name(item)))
            .collect();
        if !remaining.is_empty() {
            view.push(ViewItem::RoomText(format!("You notice {}.", join_list_pretty(&remaining))));
        }

        if room.exits.is_empty() {
            view.push(ViewItem::NoExits);
        } else {
            let lines = room
                .exits
                .iter()
                .map(|exit| ExitLine {
                    label: exit.label.clone(),
                    destination: self
                        .explored
                        .contains(&exit.to)
                        .then(|| self.rooms.get(&exit.to).map(|r| r.display_name().to_string()))
                        .flatten(),
                })
                .collect();
            view.push(ViewItem::ExitList(lines));
        }
        Ok(())
    }

    fn spring_encounter(&mut self, view: &mut View) {
        if self.in_combat() || self.cleared.contains(&self.room) {
            return;
        }
        let Some(room) = self.rooms.get(&self.room) else {
            return;
        };
        if room.encounter.is_empty() {
            return;
        }
        let mut spawned = Vec::new();
        for key in &room.encounter {
            match self.game.enemies.get(key) {
                Some(def) => spawned.push(Enemy::from_def(key, def)),
                None => warn!("room '{}' encounter names unknown enemy '{key}': skipped", room.key),
            }
        }
        if spawned.is_empty() {
            self.cleared.insert(self.room.clone());
            return;
        }
        info!("└─ combat: {} enemies spawned in '{}'", spawned.len(), self.room);
        view.push(ViewItem::Ambush(ambush_text(&spawned)));
        self.encounter = spawned;
    }

    /// Leave by exit index (1-based) or label. Refused while enemies remain.
    ///
    /// # Errors
    /// - Any error raised by the destination's description script.
    pub fn move_to(&mut self, view: &mut View, exit: &str) -> Result<()> {
        if self.in_combat() {
            view.push(ViewItem::ActionFailure("You can't leave while enemies block your way!".into()));
            return Ok(());
        }
        let target = self.current_room()?.find_exit(exit).map(|e| e.to.clone());
        match target {
            Some(to) => self.enter_room(view, &to),
            None => {
                view.push(ViewItem::ActionFailure(format!("Invalid exit '{exit}'")));
                Ok(())
            },
        }
    }

    /// Run the room's scripted `verb target` interaction, or a generated one for ambient items.
    ///
    /// # Errors
    /// - Errors raised by the script, such as a `give` naming an undefined item.
    pub fn interact(&mut self, view: &mut View, verb: &str, target: &str) -> Result<()> {
        let room = self.current_room()?;
        let script = room.interaction(target, verb).cloned().or_else(|| {
            room.items
                .iter()
                .find(|key| key.eq_ignore_ascii_case(target) || self.item_name(key).eq_ignore_ascii_case(target))
                .and_then(|key| ambient_interaction(&verb.to_lowercase(), &room.key, key))
        });
        match script {
            Some(script) => run_script(self, view, &script).with_context(|| format!("running '{verb} {target}'")),
            None => {
                view.push(ViewItem::ActionFailure(format!("You can't {verb} the {target}.")));
                Ok(())
            },
        }
    }

    /// Use an attack, action or (never valid directly) reaction, then finish the round if it
    /// was performed.
    pub fn use_ability(&mut self, view: &mut View, prompt: &mut dyn Prompter, handle: &AbilityHandle) -> UseOutcome {
        if self.is_over() {
            view.push(ViewItem::ActionFailure("You are dead.".into()));
            return UseOutcome::Invalid;
        }
        let Some(ability) = self.character.ability(handle).cloned() else {
            view.push(ViewItem::ActionFailure("You can't do that.".into()));
            return UseOutcome::Invalid;
        };
        let outcome = ability.use_ability(self, view, prompt);
        match outcome {
            UseOutcome::Performed => {
                info!("└─ action: {} performed", ability.display_name());
                if let AbilitySource::Item(index) = handle.source {
                    self.spend_item(view, index, ability.single_use);
                }
                turn::end_round(self, view, prompt);
            },
            UseOutcome::Cancelled => info!("└─ action: {} cancelled", ability.display_name()),
            UseOutcome::Invalid => info!("└─ action: {} invalid", ability.display_name()),
        }
        outcome
    }

    /// A single-use item is consumed; anything else wears and may break.
    fn spend_item(&mut self, view: &mut View, index: usize, single_use: bool) {
        let Some(item) = self.character.inventory.get_mut(index) else {
            return;
        };
        if single_use {
            let item = self.character.inventory.remove(index);
            info!("└─ inventory: {} used up", item.key);
            view.push(ViewItem::ActionSuccess(format!("The {} is used up.", item.name)));
        } else if item.wear() {
            let item = self.character.inventory.remove(index);
            info!("└─ inventory: {} broke", item.key);
            view.push(ViewItem::ItemBroken { name: item.name });
        }
    }
}
