//! Loader utilities for assembling a `GameDef` from the JSON data files.
//!
//! `level.json` holds the rooms, `items.json` the items, `enemies.json` the enemies and
//! `classes.json` the playable classes. Only the level and items are required.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use delve_data::{GameDef, Id, validate_game};
use log::{info, warn};
use serde::de::DeserializeOwned;

pub const LEVEL_FILE: &str = "level.json";
pub const ITEMS_FILE: &str = "items.json";
pub const ENEMIES_FILE: &str = "enemies.json";
pub const CLASSES_FILE: &str = "classes.json";

/// Load and validate every data file under `dir`.
///
/// # Errors
/// Errors bubble up from file IO, deserialization, or a missing start room. Other
/// cross-reference problems are logged as warnings and recovered at runtime.
pub fn load_game(dir: &Path) -> Result<GameDef> {
    let game = GameDef {
        rooms: load_required(&dir.join(LEVEL_FILE))?,
        items: load_required(&dir.join(ITEMS_FILE))?,
        enemies: load_optional(&dir.join(ENEMIES_FILE))?,
        classes: load_optional(&dir.join(CLASSES_FILE))?,
        ..GameDef::default()
    };
    info!("{} rooms loaded", game.rooms.len());
    info!("{} items loaded", game.items.len());
    info!("{} enemies loaded", game.enemies.len());
    info!("{} classes loaded", game.classes.len());
    validate(&game)?;
    Ok(game)
}

/// Log recoverable definition issues; fail on fatal ones.
fn validate(game: &GameDef) -> Result<()> {
    let (fatal, recoverable): (Vec<_>, Vec<_>) = validate_game(game).into_iter().partition(|err| err.is_fatal());
    for err in &recoverable {
        warn!("definition issue: {err}");
    }
    if fatal.is_empty() {
        return Ok(());
    }
    let details = fatal.into_iter().map(|err| format!("- {err}")).collect::<Vec<_>>().join("\n");
    bail!("game data validation failed:\n{details}");
}

fn load_required<T: DeserializeOwned>(path: &Path) -> Result<BTreeMap<Id, T>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing JSON from '{}'", path.display()))
}

fn load_optional<T: DeserializeOwned>(path: &Path) -> Result<BTreeMap<Id, T>> {
    if path.is_file() {
        load_required(path)
    } else {
        warn!("'{}' not found: continuing without it", path.display());
        Ok(BTreeMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).expect("write fixture");
    }

    #[test]
    fn loads_required_and_optional_files() {
        let dir = tempdir().expect("tempdir");
        write(
            dir.path(),
            LEVEL_FILE,
            r#"{ "WHOUS": { "name": "White House", "encounter": ["rat"] } }"#,
        );
        write(dir.path(), ITEMS_FILE, r#"{ "TORCH": { "name": "torch" } }"#);
        write(dir.path(), ENEMIES_FILE, r#"{ "rat": { "health": 2 } }"#);

        let game = load_game(dir.path()).expect("load game");
        assert_eq!(game.start, "WHOUS");
        assert_eq!(game.rooms.len(), 1);
        assert_eq!(game.enemies["rat"].health, 2);
        assert!(game.classes.is_empty());
    }

    #[test]
    fn missing_start_room_fails_loading() {
        let dir = tempdir().expect("tempdir");
        write(dir.path(), LEVEL_FILE, r#"{ "ATTIC": {} }"#);
        write(dir.path(), ITEMS_FILE, "{}");

        let err = load_game(dir.path()).expect_err("no start room");
        assert!(err.to_string().contains("validation failed"));
    }

    #[test]
    fn recoverable_issues_do_not_fail_loading() {
        let dir = tempdir().expect("tempdir");
        write(
            dir.path(),
            LEVEL_FILE,
            r#"{ "WHOUS": { "encounter": ["ghost"], "exits": [{ "exit": "up", "target": "NOWHERE" }] } }"#,
        );
        write(dir.path(), ITEMS_FILE, "{}");
        assert!(load_game(dir.path()).is_ok());
    }

    #[test]
    fn malformed_json_names_the_file() {
        let dir = tempdir().expect("tempdir");
        write(dir.path(), LEVEL_FILE, "{ not json");
        write(dir.path(), ITEMS_FILE, "{}");
        let err = load_game(dir.path()).expect_err("bad json");
        assert!(format!("{err:#}").contains(LEVEL_FILE));
    }
}
