//! Script module
//!
//! Level scripts drive room descriptions and interactions. A script is a tree of text,
//! sequences and directives, evaluated depth-first against the flag store and the player's
//! inventory.

use anyhow::Result;
use delve_data::{DirectiveDef, FlagValue, ScriptDef};
use log::{info, warn};

use crate::error::EngineError;
use crate::item::Item;
use crate::session::Session;
use crate::view::{View, ViewItem};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptNode {
    Text(String),
    Sequence(Vec<ScriptNode>),
    Directive(Directive),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Print(String),
    SetFlag {
        flag: String,
        value: FlagValue,
    },
    If {
        flag: String,
        default: FlagValue,
        test: Option<FlagValue>,
        then: Option<Box<ScriptNode>>,
        otherwise: Option<Box<ScriptNode>>,
    },
    Has {
        item: String,
        then: Option<Box<ScriptNode>>,
        otherwise: Option<Box<ScriptNode>>,
    },
    Give {
        item: String,
    },
    Remove {
        item: String,
        all: bool,
    },
    /// Generated for ambient room items; `gate` is the flag recording the take.
    Take {
        item: String,
        gate: String,
    },
    Look {
        item: String,
        gate: String,
    },
    Unknown(String),
}

impl ScriptNode {
    pub fn from_def(def: &ScriptDef) -> ScriptNode {
        match def {
            ScriptDef::Text(text) => ScriptNode::Text(text.clone()),
            ScriptDef::Sequence(nodes) => ScriptNode::Sequence(nodes.iter().map(ScriptNode::from_def).collect()),
            ScriptDef::Directive(directive) => ScriptNode::Directive(Directive::from_def(directive)),
        }
    }
}

fn branch(node: Option<&ScriptDef>) -> Option<Box<ScriptNode>> {
    node.map(|n| Box::new(ScriptNode::from_def(n)))
}

impl Directive {
    pub fn from_def(def: &DirectiveDef) -> Directive {
        let kind = def.kind.trim().to_lowercase();
        let missing = |field: &str| {
            warn!("'{kind}' directive without a {field}: ignored");
            Directive::Unknown(format!("{kind} (no {field})"))
        };
        match kind.as_str() {
            "print" => Directive::Print(def.text.clone().unwrap_or_default()),
            "setflag" => match &def.flag {
                Some(flag) => Directive::SetFlag {
                    flag: flag.clone(),
                    value: def.value.clone().unwrap_or(FlagValue::Bool(true)),
                },
                None => missing("flag"),
            },
            "if" => match &def.flag {
                Some(flag) => Directive::If {
                    flag: flag.clone(),
                    default: def.default.clone().unwrap_or_default(),
                    test: def.test.clone(),
                    then: branch(def.then.as_deref()),
                    otherwise: branch(def.otherwise.as_deref()),
                },
                None => missing("flag"),
            },
            "has" | "has-item" => match &def.item {
                Some(item) => Directive::Has {
                    item: item.clone(),
                    then: branch(def.then.as_deref()),
                    otherwise: branch(def.otherwise.as_deref()),
                },
                None => missing("item"),
            },
            "give" | "give-item" => match &def.item {
                Some(item) => Directive::Give { item: item.clone() },
                None => missing("item"),
            },
            "remove" | "remove-item" => match &def.item {
                Some(item) => Directive::Remove {
                    item: item.clone(),
                    all: def.all,
                },
                None => missing("item"),
            },
            other => {
                warn!("unrecognized script directive '{other}'");
                Directive::Unknown(other.to_string())
            },
        }
    }
}

/// Flag recording that `item` was taken from `room`.
pub fn taken_flag(room: &str, item: &str) -> String {
    format!("taken:{room}:{item}")
}

/// Generated interaction for an ambient room item, if `verb` is one that items support.
pub fn ambient_interaction(verb: &str, room: &str, item: &str) -> Option<ScriptNode> {
    let gate = taken_flag(room, item);
    let item = item.to_string();
    match verb {
        "take" | "get" => Some(ScriptNode::Directive(Directive::Take { item, gate })),
        "look" | "examine" => Some(ScriptNode::Directive(Directive::Look { item, gate })),
        _ => None,
    }
}

/// Evaluate a script node.
///
/// # Errors
/// - `EngineError::UnknownItem` when a `give` (or generated take) names an undefined item.
pub fn run_script(session: &mut Session, view: &mut View, node: &ScriptNode) -> Result<()> {
    match node {
        ScriptNode::Text(text) => view.push(ViewItem::RoomText(text.clone())),
        ScriptNode::Sequence(nodes) => {
            for child in nodes {
                run_script(session, view, child)?;
            }
        },
        ScriptNode::Directive(directive) => run_directive(session, view, directive)?,
    }
    Ok(())
}

fn run_branch(session: &mut Session, view: &mut View, node: Option<&ScriptNode>) -> Result<()> {
    match node {
        Some(node) => run_script(session, view, node),
        None => Ok(()),
    }
}

fn run_directive(session: &mut Session, view: &mut View, directive: &Directive) -> Result<()> {
    match directive {
        Directive::Print(text) => {
            info!("└─ script: print");
            view.push(ViewItem::RoomText(text.clone()));
        },
        Directive::SetFlag { flag, value } => {
            info!("└─ script: setflag({flag} = {value})");
            session.flags.set(flag.clone(), value.clone());
        },
        Directive::If {
            flag,
            default,
            test,
            then,
            otherwise,
        } => {
            let current = session.flags.get(flag, default);
            let matched = match test {
                Some(expected) => current == *expected,
                None => current.is_truthy(),
            };
            info!("└─ script: if({flag} = {current}) -> {matched}");
            let chosen = if matched { then } else { otherwise };
            run_branch(session, view, chosen.as_deref())?;
        },
        Directive::Has { item, then, otherwise } => {
            let held = session.character.has_item(item);
            info!("└─ script: has({item}) -> {held}");
            let chosen = if held { then } else { otherwise };
            run_branch(session, view, chosen.as_deref())?;
        },
        Directive::Give { item } => {
            info!("└─ script: give({item})");
            give_item(session, view, item)?;
        },
        Directive::Remove { item, all } => {
            let count = session.character.remove_item(item, *all);
            info!("└─ script: remove({item}, all = {all}) -> {count}");
            if count > 0 {
                view.push(ViewItem::ItemRemoved {
                    name: session.item_name(item),
                    count,
                });
            }
        },
        Directive::Take { item, gate } => {
            if session.flags.is_set(gate) {
                info!("└─ script: take({item}) already taken");
                view.push(ViewItem::AlreadyTaken {
                    name: session.item_name(item),
                });
            } else {
                info!("└─ script: take({item})");
                give_item(session, view, item)?;
                session.flags.set(gate.clone(), FlagValue::Bool(true));
            }
        },
        Directive::Look { item, gate } => {
            info!("└─ script: look({item})");
            if session.flags.is_set(gate) {
                view.push(ViewItem::ActionFailure(format!(
                    "You don't see the {} here anymore.",
                    session.item_name(item)
                )));
            } else {
                let def = session
                    .game
                    .items
                    .get(item)
                    .ok_or_else(|| EngineError::UnknownItem(item.clone()))?;
                view.push(ViewItem::ItemDescription {
                    name: def.name.clone().unwrap_or_else(|| item.clone()),
                    description: def.desc.clone(),
                });
            }
        },
        Directive::Unknown(kind) => {
            warn!("└─ script: skipped unrecognized directive '{kind}'");
            view.push(ViewItem::Error(format!("Unrecognized script action '{kind}'.")));
        },
    }
    Ok(())
}

fn give_item(session: &mut Session, view: &mut View, key: &str) -> Result<()> {
    let def = session
        .game
        .items
        .get(key)
        .ok_or_else(|| EngineError::UnknownItem(key.to_string()))?;
    let item = Item::from_def(key, def);
    view.push(ViewItem::ItemReceived { name: item.name.clone() });
    session.character.add_item(item);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ScriptNode {
        let def: ScriptDef = serde_json::from_str(json).expect("parse script");
        ScriptNode::from_def(&def)
    }

    #[test]
    fn directives_convert_with_defaults() {
        let node = parse(r#"{ "type": "setflag", "flag": "lit" }"#);
        assert_eq!(
            node,
            ScriptNode::Directive(Directive::SetFlag {
                flag: "lit".into(),
                value: FlagValue::Bool(true)
            })
        );

        let node = parse(r#"{ "type": "if", "flag": "visits", "test": 2, "then": "Again?" }"#);
        match node {
            ScriptNode::Directive(Directive::If { default, test, then, otherwise, .. }) => {
                assert_eq!(default, FlagValue::Bool(false));
                assert_eq!(test, Some(FlagValue::Int(2)));
                assert_eq!(then.as_deref(), Some(&ScriptNode::Text("Again?".into())));
                assert!(otherwise.is_none());
            },
            other => panic!("unexpected node {other:?}"),
        }
    }

    #[test]
    fn malformed_and_unknown_directives_become_unknown() {
        assert!(matches!(parse(r#"{ "type": "give" }"#), ScriptNode::Directive(Directive::Unknown(_))));
        assert_eq!(
            parse(r#"{ "type": "dance" }"#),
            ScriptNode::Directive(Directive::Unknown("dance".into()))
        );
    }

    #[test]
    fn item_directives_accept_their_long_names() {
        assert_eq!(
            parse(r#"{ "type": "give-item", "item": "torch" }"#),
            ScriptNode::Directive(Directive::Give { item: "torch".into() })
        );
        assert_eq!(
            parse(r#"{ "type": "Remove-Item", "item": "torch", "all": true }"#),
            ScriptNode::Directive(Directive::Remove {
                item: "torch".into(),
                all: true
            })
        );
        assert!(matches!(
            parse(r#"{ "type": "has-item", "item": "torch", "then": "yes" }"#),
            ScriptNode::Directive(Directive::Has { ref item, .. }) if item == "torch"
        ));
    }

    #[test]
    fn ambient_interactions_share_a_gate() {
        let take = ambient_interaction("take", "HALL", "TORCH");
        let look = ambient_interaction("look", "HALL", "TORCH");
        assert_eq!(
            take,
            Some(ScriptNode::Directive(Directive::Take {
                item: "TORCH".into(),
                gate: "taken:HALL:TORCH".into()
            }))
        );
        assert!(matches!(look, Some(ScriptNode::Directive(Directive::Look { gate, .. })) if gate == "taken:HALL:TORCH"));
        assert!(ambient_interaction("eat", "HALL", "TORCH").is_none());
    }
}
