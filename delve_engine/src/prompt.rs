//! Interactive choices the engine needs from the player mid-action.
//!
//! Every choice may be cancelled (`None`). Cancelling before an action commits leaves the
//! session untouched and does not end the turn.

use std::collections::VecDeque;
use std::io::{self, BufRead, IsTerminal, Write};

use log::{info, warn};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::stat::StatKey;

/// A live enemy offered as a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetLine {
    /// Position in the encounter.
    pub index: usize,
    pub name: String,
    pub health: u32,
    pub max_health: u32,
    pub cursed: bool,
}

pub trait Prompter {
    /// Choose one of `targets`; returns the chosen line's `index`.
    fn choose_target(&mut self, targets: &[TargetLine]) -> Option<usize>;

    /// Choose a stat for an ability bound to "choose".
    fn choose_stat(&mut self, purpose: &str) -> Option<StatKey>;

    /// Choose which of several matching reactions defends against `attack`.
    /// Returns a position in `options`.
    fn choose_reaction(&mut self, attack: &str, options: &[String]) -> Option<usize>;
}

/// Answers prompts from pre-loaded queues. An exhausted queue answers `None`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompter {
    pub targets: VecDeque<Option<usize>>,
    pub stats: VecDeque<Option<StatKey>>,
    pub reactions: VecDeque<Option<usize>>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn target(mut self, index: Option<usize>) -> Self {
        self.targets.push_back(index);
        self
    }

    #[must_use]
    pub fn stat(mut self, stat: Option<StatKey>) -> Self {
        self.stats.push_back(stat);
        self
    }

    #[must_use]
    pub fn reaction(mut self, choice: Option<usize>) -> Self {
        self.reactions.push_back(choice);
        self
    }
}

impl Prompter for ScriptedPrompter {
    fn choose_target(&mut self, _targets: &[TargetLine]) -> Option<usize> {
        self.targets.pop_front().flatten()
    }

    fn choose_stat(&mut self, _purpose: &str) -> Option<StatKey> {
        self.stats.pop_front().flatten()
    }

    fn choose_reaction(&mut self, _attack: &str, _options: &[String]) -> Option<usize> {
        self.reactions.pop_front().flatten()
    }
}

/// One read from the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Line(String),
    Eof,
    Interrupted,
}

/// Line-oriented prompter. Reads through `rustyline` when attached to a terminal, otherwise
/// from any reader/writer pair (plain stdin, or byte slices in tests).
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
    editor: Option<DefaultEditor>,
}

impl LinePrompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        let editor = if io::stdin().is_terminal() {
            match DefaultEditor::new() {
                Ok(editor) => {
                    info!("using rustyline-backed input");
                    Some(editor)
                },
                Err(err) => {
                    warn!("failed to initialize rustyline ({err}), falling back to basic stdin");
                    None
                },
            }
        } else {
            info!("stdin is not a TTY; using basic input mode");
            None
        };
        Self {
            input: io::stdin().lock(),
            output: io::stdout(),
            editor,
        }
    }
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            editor: None,
        }
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    /// Show `prompt` and read one trimmed line. If the editor fails, switch to plain input
    /// and retry once.
    ///
    /// # Errors
    /// - Any I/O error from the plain reader or writer.
    pub fn read_input(&mut self, prompt: &str) -> io::Result<InputEvent> {
        if let Some(editor) = self.editor.as_mut() {
            match editor.readline(prompt) {
                Ok(line) => {
                    if !line.trim().is_empty()
                        && let Err(err) = editor.add_history_entry(line.as_str())
                    {
                        warn!("failed to append to history: {err}");
                    }
                    return Ok(InputEvent::Line(line.trim().to_string()));
                },
                Err(ReadlineError::Interrupted) => return Ok(InputEvent::Interrupted),
                Err(ReadlineError::Eof) => return Ok(InputEvent::Eof),
                Err(err) => {
                    warn!("rustyline input failed: {err} -- switching to basic stdin");
                    self.editor = None;
                },
            }
        }
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(InputEvent::Eof);
        }
        Ok(InputEvent::Line(line.trim().to_string()))
    }

    /// Write prompt text, warning on failure.
    fn show(&mut self, text: &str) {
        if let Err(err) = write!(self.output, "{text}") {
            warn!("failed to write prompt: {err}");
        }
    }

    /// Ask for a 1-based choice among `count` entries; blank input, EOF or Ctrl-C cancels.
    fn read_choice(&mut self, count: usize) -> Option<usize> {
        loop {
            let line = match self.read_input("> ") {
                Ok(InputEvent::Line(line)) => line,
                Ok(InputEvent::Eof | InputEvent::Interrupted) => return None,
                Err(err) => {
                    warn!("failed to read choice: {err}");
                    return None;
                },
            };
            if line.is_empty() || line.eq_ignore_ascii_case("cancel") {
                info!("└─ prompt: cancelled");
                return None;
            }
            match line.parse::<usize>() {
                Ok(n) if (1..=count).contains(&n) => return Some(n - 1),
                _ => self.show(&format!("Pick a number from 1 to {count} (blank to cancel).\n")),
            }
        }
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn choose_target(&mut self, targets: &[TargetLine]) -> Option<usize> {
        let mut menu = String::from("Choose a target:\n");
        for (i, line) in targets.iter().enumerate() {
            let curse = if line.cursed { " (cursed)" } else { "" };
            menu.push_str(&format!(
                "  {}. {} [{}/{}]{curse}\n",
                i + 1,
                line.name,
                line.health,
                line.max_health
            ));
        }
        self.show(&menu);
        self.read_choice(targets.len()).map(|pos| targets[pos].index)
    }

    fn choose_stat(&mut self, purpose: &str) -> Option<StatKey> {
        let mut menu = format!("Choose a stat to {purpose}:\n");
        for (i, key) in StatKey::ALL.iter().enumerate() {
            menu.push_str(&format!("  {}. {key}\n", i + 1));
        }
        self.show(&menu);
        self.read_choice(StatKey::ALL.len()).map(|pos| StatKey::ALL[pos])
    }

    fn choose_reaction(&mut self, attack: &str, options: &[String]) -> Option<usize> {
        let mut menu = format!("{attack} How do you react?\n");
        for (i, option) in options.iter().enumerate() {
            menu.push_str(&format!("  {}. {option}\n", i + 1));
        }
        self.show(&menu);
        self.read_choice(options.len())
    }
}
