use std::collections::BTreeMap;
use std::fmt;

use crate::*;

/// Validation issue found while cross-checking a `GameDef`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingStartRoom(String),
    MissingReference { kind: &'static str, id: String, context: String },
    InvalidValue { context: String },
}

impl ValidationError {
    /// Only a missing start room prevents a session from being created. Everything else
    /// degrades at runtime (narrated in-world or replaced by a default with a warning).
    pub fn is_fatal(&self) -> bool {
        matches!(self, ValidationError::MissingStartRoom(_))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingStartRoom(id) => {
                write!(f, "start room '{id}' is not defined")
            },
            ValidationError::MissingReference { kind, id, context } => {
                write!(f, "missing {kind} '{id}' ({context})")
            },
            ValidationError::InvalidValue { context } => {
                write!(f, "invalid value ({context})")
            },
        }
    }
}

impl std::error::Error for ValidationError {}

const STAT_KEYS: [&str; 4] = ["STR", "DEX", "WIS", "SOUL"];

/// Validate cross-references between rooms, items, enemies and classes.
///
/// ```
/// use delve_data::{GameDef, RoomDef, validate_game};
///
/// let mut game = GameDef::default();
/// game.rooms.insert("WHOUS".into(), RoomDef::default());
/// assert!(validate_game(&game).is_empty());
/// ```
pub fn validate_game(game: &GameDef) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if !game.rooms.contains_key(&game.start) {
        errors.push(ValidationError::MissingStartRoom(game.start.clone()));
    }

    for (room_id, room) in &game.rooms {
        for exit in &room.exits {
            check_ref(
                "room",
                &exit.target,
                &game.rooms,
                format!("room '{room_id}' exit '{}'", exit.exit),
                &mut errors,
            );
        }
        for enemy in &room.encounter {
            check_ref(
                "enemy",
                enemy,
                &game.enemies,
                format!("room '{room_id}' encounter"),
                &mut errors,
            );
        }
        for item in &room.items {
            check_ref("item", item, &game.items, format!("room '{room_id}' items"), &mut errors);
        }
        if let Some(desc) = &room.desc {
            validate_script(desc, game, &format!("room '{room_id}' desc"), &mut errors);
        }
        for (target, verbs) in &room.interact {
            for (verb, script) in verbs {
                validate_script(
                    script,
                    game,
                    &format!("room '{room_id}' interact '{verb} {target}'"),
                    &mut errors,
                );
            }
        }
    }

    for (enemy_id, enemy) in &game.enemies {
        for (action_id, action) in &enemy.actions {
            if let Some(next) = &action.next
                && !enemy.actions.contains_key(next)
            {
                errors.push(ValidationError::MissingReference {
                    kind: "enemy action",
                    id: next.clone(),
                    context: format!("enemy '{enemy_id}' action '{action_id}' next"),
                });
            }
        }
    }

    for (class_id, class) in &game.classes {
        for key in class.stat_max.keys().chain(class.stat_value.keys()) {
            if !STAT_KEYS.contains(&key.to_uppercase().as_str()) {
                errors.push(ValidationError::InvalidValue {
                    context: format!("class '{class_id}' has unknown stat '{key}'"),
                });
            }
        }
        for item in &class.inventory {
            check_ref("item", item, &game.items, format!("class '{class_id}' inventory"), &mut errors);
        }
    }

    errors
}

fn check_ref<T>(
    kind: &'static str,
    id: &str,
    known: &BTreeMap<Id, T>,
    context: String,
    errors: &mut Vec<ValidationError>,
) {
    if !known.contains_key(id) {
        errors.push(ValidationError::MissingReference {
            kind,
            id: id.to_string(),
            context,
        });
    }
}

fn validate_script(script: &ScriptDef, game: &GameDef, context: &str, errors: &mut Vec<ValidationError>) {
    match script {
        ScriptDef::Text(_) => {},
        ScriptDef::Sequence(nodes) => {
            for node in nodes {
                validate_script(node, game, context, errors);
            }
        },
        ScriptDef::Directive(directive) => {
            let kind = directive.kind.trim().to_lowercase();
            if matches!(
                kind.as_str(),
                "give" | "give-item" | "remove" | "remove-item" | "has" | "has-item"
            ) {
                match &directive.item {
                    Some(item) => check_ref(
                        "item",
                        item,
                        &game.items,
                        format!("{context} '{}' directive", directive.kind),
                        errors,
                    ),
                    None => errors.push(ValidationError::InvalidValue {
                        context: format!("{context} '{}' directive without an item", directive.kind),
                    }),
                }
            }
            if matches!(kind.as_str(), "if" | "setflag") && directive.flag.is_none() {
                errors.push(ValidationError::InvalidValue {
                    context: format!("{context} '{}' directive without a flag", directive.kind),
                });
            }
            for branch in [&directive.then, &directive.otherwise].into_iter().flatten() {
                validate_script(branch, game, context, errors);
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_game() -> GameDef {
        let mut game = GameDef::default();
        game.rooms.insert("WHOUS".into(), RoomDef::default());
        game
    }

    #[test]
    fn missing_start_room_is_fatal() {
        let game = GameDef {
            start: "NOWHERE".into(),
            ..base_game()
        };
        let errors = validate_game(&game);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].is_fatal());
    }

    #[test]
    fn missing_references_are_reported() {
        let mut game = base_game();
        let room = game.rooms.get_mut("WHOUS").expect("start room");
        room.encounter.push("ghoul".into());
        room.exits.push(ExitDef {
            exit: "north".into(),
            target: "CELLAR".into(),
        });

        let errors = validate_game(&game);
        assert!(errors.iter().any(
            |err| matches!(err, ValidationError::MissingReference { kind, id, .. } if *kind == "enemy" && id == "ghoul")
        ));
        assert!(errors.iter().any(
            |err| matches!(err, ValidationError::MissingReference { kind, id, .. } if *kind == "room" && id == "CELLAR")
        ));
        assert!(errors.iter().all(|err| !err.is_fatal()));
    }

    #[test]
    fn script_item_references_are_checked() {
        let mut game = base_game();
        let script = ScriptDef::Sequence(vec![
            ScriptDef::Text("A chest sits here.".into()),
            ScriptDef::Directive(DirectiveDef {
                kind: "give".into(),
                item: Some("crown".into()),
                ..DirectiveDef::default()
            }),
        ]);
        game.rooms.get_mut("WHOUS").expect("start room").desc = Some(script);

        let errors = validate_game(&game);
        assert!(errors.iter().any(
            |err| matches!(err, ValidationError::MissingReference { kind, id, .. } if *kind == "item" && id == "crown")
        ));
    }

    #[test]
    fn long_item_directive_names_are_checked_too() {
        let mut game = base_game();
        let script = ScriptDef::Directive(DirectiveDef {
            kind: "Has-Item".into(),
            item: Some("crown".into()),
            ..DirectiveDef::default()
        });
        game.rooms.get_mut("WHOUS").expect("start room").desc = Some(script);

        let errors = validate_game(&game);
        assert!(errors.iter().any(
            |err| matches!(err, ValidationError::MissingReference { kind, id, .. } if *kind == "item" && id == "crown")
        ));
    }

    #[test]
    fn dangling_next_action_is_reported() {
        let mut game = base_game();
        let mut enemy = EnemyDef::default();
        enemy.actions.insert(
            "windup".into(),
            EnemyActionDef {
                kind: "wait".into(),
                next: Some("slam".into()),
                ..EnemyActionDef::default()
            },
        );
        game.enemies.insert("ogre".into(), enemy);

        let errors = validate_game(&game);
        assert!(errors.iter().any(
            |err| matches!(err, ValidationError::MissingReference { kind, id, .. } if *kind == "enemy action" && id == "slam")
        ));
    }
}
