//! REPL and command handling.
//!
//! Reads a command, hands it to the session, then presents the resulting events. Pauses marked
//! by `Acknowledge` wait for the player to press enter.

use std::io::{BufRead, Write};

use anyhow::Result;
use delve_data::GameDef;
use log::info;

use crate::command::{Command, parse_command};
use crate::item::AbilityGroup;
use crate::prompt::{InputEvent, LinePrompter};
use crate::session::Session;
use crate::stat::StatKey;
use crate::view::{View, ViewItem};

const HELP: [(&str, &str); 9] = [
    ("help", "Show this list."),
    ("stat", "Show your stats, or 'stat <name>' for details on one."),
    ("inv", "List what you are carrying."),
    ("move", "Leave by exit number or name."),
    ("look", "Look around, or 'look <thing>'."),
    ("take", "Pick something up."),
    ("attack", "List attacks, or 'attack <n>' to use one."),
    ("use", "List usable actions, or 'use <n>' to use one."),
    ("quit", "Quit the game."),
];

/// Run the read-eval-print loop until the player quits, input ends, or the player dies.
///
/// # Errors
/// - Propagates output failures and script errors raised by the session.
pub fn run_repl<R: BufRead, W: Write>(session: &mut Session, io: &mut LinePrompter<R, W>) -> Result<()> {
    let mut view = View::new();
    let mut turn = 0;
    loop {
        if session.is_over() {
            writeln!(io.output(), "\nGame over.")?;
            break;
        }
        turn += 1;
        info!("================> BEGIN TURN {turn} <================");
        writeln!(io.output())?;
        let line = match io.read_input("> ")? {
            InputEvent::Line(line) => line,
            InputEvent::Eof | InputEvent::Interrupted => {
                info!("input closed: quitting");
                break;
            },
        };

        match parse_command(&line) {
            Command::Help => view.push(ViewItem::Help(
                HELP.iter().map(|(verb, desc)| ((*verb).to_string(), (*desc).to_string())).collect(),
            )),
            Command::Stats => view.push(ViewItem::StatSheet(session.character.format_stats())),
            Command::StatInfo(name) => stat_info_handler(session, &mut view, &name),
            Command::Inventory => view.push(ViewItem::Inventory(session.character.inventory_lines())),
            Command::Look => session.describe_room(&mut view)?,
            Command::LookAt(target) => session.interact(&mut view, "look", &target)?,
            Command::MoveTo(exit) => session.move_to(&mut view, &exit)?,
            Command::Take(target) => session.interact(&mut view, "take", &target)?,
            Command::Interact { verb, target } => session.interact(&mut view, &verb, &target)?,
            Command::Attack(choice) => ability_handler(session, &mut view, io, AbilityGroup::Attack, choice),
            Command::UseAction(choice) => ability_handler(session, &mut view, io, AbilityGroup::Action, choice),
            Command::Quit => {
                view.push(ViewItem::EngineMessage("Goodbye.".into()));
                present(&mut view, io)?;
                break;
            },
            Command::Unknown => view.push(ViewItem::Error("I don't understand that.".into())),
        }
        present(&mut view, io)?;
    }
    Ok(())
}

fn stat_info_handler(session: &Session, view: &mut View, name: &str) {
    match name.parse::<StatKey>() {
        Ok(key) => {
            view.push(ViewItem::StatHelp {
                stat: key,
                description: key.description().to_string(),
                death: key.death_text().to_string(),
            });
            view.push(ViewItem::StatSheet(format!(
                "{}: {}",
                key.label(),
                session.character.stat(key).format_bar()
            )));
        },
        Err(_) => view.push(ViewItem::ActionFailure("Unknown stat name.".into())),
    }
}

/// List the abilities in `group`, or use the `choice`-th one (1-based).
fn ability_handler<R: BufRead, W: Write>(
    session: &mut Session,
    view: &mut View,
    io: &mut LinePrompter<R, W>,
    group: AbilityGroup,
    choice: Option<usize>,
) {
    let abilities = match group {
        AbilityGroup::Attack => session.character.attacks(),
        AbilityGroup::Action => session.character.actions(),
        AbilityGroup::Reaction => session.character.reactions(),
    };
    let list: Vec<_> = abilities.into_iter().map(|(handle, ability)| (handle, ability.listing())).collect();
    if list.is_empty() {
        view.push(ViewItem::ActionFailure("You have nothing to use.".into()));
        return;
    }
    match choice.and_then(|n| n.checked_sub(1)).and_then(|i| list.get(i).cloned()) {
        Some((handle, _)) => {
            session.use_ability(view, io, &handle);
        },
        None if choice.is_none() => view.push(ViewItem::AbilityList {
            heading: if group == AbilityGroup::Attack { "Attacks" } else { "Actions" }.to_string(),
            lines: list.into_iter().map(|(_, line)| line).collect(),
        }),
        None => view.push(ViewItem::ActionFailure("There is no such choice.".into())),
    }
}

/// Write buffered events, pausing at each acknowledgment.
///
/// # Errors
/// - Returns any error writing to the output or reading a pause.
pub fn present<R: BufRead, W: Write>(view: &mut View, io: &mut LinePrompter<R, W>) -> Result<()> {
    for item in view.drain() {
        if item.is_acknowledge() {
            if io.read_input("  (press enter)")? == InputEvent::Eof {
                info!("input closed during a pause");
            }
        } else {
            writeln!(io.output(), "{item}")?;
        }
    }
    Ok(())
}

/// Ask the player to pick a class. Returns `None` when there are no classes or input ends.
///
/// # Errors
/// - Returns any error writing to the output.
pub fn choose_class<R: BufRead, W: Write>(game: &GameDef, io: &mut LinePrompter<R, W>) -> Result<Option<String>> {
    let classes = Session::class_list(game);
    if classes.is_empty() {
        return Ok(None);
    }
    writeln!(io.output(), "Choose your class:")?;
    for (i, (name, description)) in classes.iter().enumerate() {
        writeln!(io.output(), "  {}. {name}: {description}", i + 1)?;
    }
    loop {
        let InputEvent::Line(line) = io.read_input("> ")? else {
            return Ok(None);
        };
        let picked = line
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| classes.get(i))
            .or_else(|| classes.iter().find(|(name, _)| name.eq_ignore_ascii_case(&line)));
        match picked {
            Some((name, _)) => return Ok(Some(name.clone())),
            None => writeln!(io.output(), "Pick a class by number or name.")?,
        }
    }
}
