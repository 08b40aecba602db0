//! Command module
//!
//! Maps a line of player input onto a `Command`. Matching is by word pattern only.

/// Commands that can be executed by the player.
#[derive(Debug, Clone, PartialEq, Eq, variantly::Variantly)]
pub enum Command {
    Attack(Option<usize>),
    Help,
    Interact { verb: String, target: String },
    Inventory,
    Look,
    LookAt(String),
    MoveTo(String),
    Quit,
    StatInfo(String),
    Stats,
    Take(String),
    Unknown,
    UseAction(Option<usize>),
}

/// Parses an input string and returns the corresponding `Command`.
pub fn parse_command(input: &str) -> Command {
    let lowered = input.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();
    match words.as_slice() {
        ["help" | "?"] => Command::Help,
        ["stat" | "stats"] => Command::Stats,
        ["stat" | "stats", name] => Command::StatInfo((*name).to_string()),
        ["inventory" | "inv" | "i"] => Command::Inventory,
        ["look" | "l"] => Command::Look,
        ["look", "at", rest @ ..] | ["look" | "examine", rest @ ..] if !rest.is_empty() => {
            Command::LookAt(rest.join(" "))
        },
        ["move" | "go", rest @ ..] if !rest.is_empty() => Command::MoveTo(rest.join(" ")),
        ["take" | "get", rest @ ..] if !rest.is_empty() => Command::Take(rest.join(" ")),
        ["attack" | "a"] => Command::Attack(None),
        ["attack" | "a", n] => n.parse().map_or(Command::Unknown, |n| Command::Attack(Some(n))),
        ["use" | "u"] => Command::UseAction(None),
        ["use" | "u", n] => n.parse().map_or(Command::Unknown, |n| Command::UseAction(Some(n))),
        ["quit" | "exit"] => Command::Quit,
        [verb, rest @ ..] if !rest.is_empty() => Command::Interact {
            verb: (*verb).to_string(),
            target: rest.join(" "),
        },
        _ => Command::Unknown,
    }
}
