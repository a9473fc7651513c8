//! Interactive session over the file list
//!
//! A shell feeds [`Command`]s to [`Session::execute`] and redraws from
//! [`Session::render`] after each one. The session holds no I/O of its own,
//! so it can be driven by a terminal, a GUI or a test.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::thread::JoinHandle;

use thiserror::Error;

use crate::config::OutputSpec;
use crate::error::{Error, Result as ConcatResult};
use crate::order::{ActionState, Direction, FileOrderModel};
use crate::pdf::{spawn_concatenate, with_default_extension, ConcatOptions, Concatenated};

/// One user action. Indices are zero-based; the text form is one-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Files picked together; appended sorted
    Add(Vec<PathBuf>),
    Insert(usize, PathBuf),
    /// Files dropped onto the list; non-PDFs are ignored
    Drop(Vec<PathBuf>),
    Select(usize),
    Deselect,
    /// Remove the given entry, or the selection
    Remove(Option<usize>),
    Up,
    Down,
    Move { from: usize, to: usize },
    List,
    Title(String),
    Output(PathBuf),
    Save,
    Help,
    Quit,
}

/// Errors from parsing a command line
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseCommandError {
    #[error("Unknown command: {0} (try `help`)")]
    Unknown(String),

    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("Invalid position: {0} (positions start at 1)")]
    InvalidIndex(String),
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = tokenize(line).into_iter();
        let Some(verb) = tokens.next() else {
            return Ok(Command::List);
        };
        let rest: Vec<String> = tokens.collect();

        let paths = |what: &'static str| -> Result<Vec<PathBuf>, ParseCommandError> {
            if rest.is_empty() {
                Err(ParseCommandError::MissingArgument(what))
            } else {
                Ok(rest.iter().map(PathBuf::from).collect())
            }
        };
        let position = |at: usize, what: &'static str| -> Result<usize, ParseCommandError> {
            let raw = rest.get(at).ok_or(ParseCommandError::MissingArgument(what))?;
            parse_position(raw)
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "add" | "a" => Command::Add(paths("path")?),
            "insert" | "i" => {
                let index = position(0, "position")?;
                let path = rest.get(1).ok_or(ParseCommandError::MissingArgument("path"))?;
                Command::Insert(index, PathBuf::from(path))
            }
            "drop" => Command::Drop(paths("path")?),
            "select" | "s" => Command::Select(position(0, "position")?),
            "deselect" => Command::Deselect,
            "remove" | "rm" => match rest.first() {
                Some(raw) => Command::Remove(Some(parse_position(raw)?)),
                None => Command::Remove(None),
            },
            "up" | "u" => Command::Up,
            "down" | "d" => Command::Down,
            "move" | "mv" => Command::Move {
                from: position(0, "from")?,
                to: position(1, "to")?,
            },
            "list" | "ls" => Command::List,
            "title" => {
                if rest.is_empty() {
                    return Err(ParseCommandError::MissingArgument("title"));
                }
                Command::Title(rest.join(" "))
            }
            "output" | "o" => {
                let path = rest.first().ok_or(ParseCommandError::MissingArgument("path"))?;
                Command::Output(PathBuf::from(path))
            }
            "save" | "concat" => Command::Save,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(ParseCommandError::Unknown(other.to_string())),
        };

        Ok(command)
    }
}

fn parse_position(raw: &str) -> Result<usize, ParseCommandError> {
    match raw.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(ParseCommandError::InvalidIndex(raw.to_string())),
    }
}

/// Split on whitespace, keeping double-quoted runs together
fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut pending = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                pending = true;
            }
            c if c.is_whitespace() && !quoted => {
                if pending {
                    tokens.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            c => {
                current.push(c);
                pending = true;
            }
        }
    }
    if pending {
        tokens.push(current);
    }

    tokens
}

/// Outcome of a command, for the shell to report
#[derive(Debug)]
pub enum Reply {
    /// The list or settings changed; redraw
    Changed,
    /// Nothing happened; the reason is shown to the user
    Ignored(&'static str),
    Saved(Concatenated),
    Failed(Error),
    Help,
    Quit,
}

impl Reply {
    /// Message to show, if any
    pub fn message(&self) -> Option<String> {
        match self {
            Reply::Ignored(reason) => Some((*reason).to_string()),
            Reply::Saved(done) => Some(format!("PDF saved as {}", done.output_path.display())),
            Reply::Failed(err) => Some(format!("Failed to save PDF: {err}")),
            Reply::Changed | Reply::Help | Reply::Quit => None,
        }
    }
}

/// Render-ready snapshot of the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub entries: Vec<String>,
    pub selection: Option<usize>,
    pub actions: ActionState,
    pub title: String,
    pub output_path: PathBuf,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            writeln!(f, "  (no files; use `add <path>`)")?;
        }
        for (index, entry) in self.entries.iter().enumerate() {
            let marker = if self.selection == Some(index) { '>' } else { ' ' };
            writeln!(f, "{marker} {:>3}. {entry}", index + 1)?;
        }

        let flag = |enabled: bool, name: &str| {
            if enabled {
                name.to_string()
            } else {
                format!("({name})")
            }
        };
        writeln!(
            f,
            "actions: {} {} {} {}",
            flag(self.actions.remove, "remove"),
            flag(self.actions.move_up, "up"),
            flag(self.actions.move_down, "down"),
            flag(self.actions.concatenate, "save"),
        )?;
        write!(f, "title: {}  output: {}", self.title, self.output_path.display())
    }
}

pub const HELP: &str = "\
Commands (positions start at 1):
  add <path>...          append files (sorted)
  insert <n> <path>      insert a file at position n
  drop <path>...         append PDFs only, ignore other files
  select <n> | deselect  highlight an entry
  remove [n]             remove entry n or the selected entry
  up | down              move the selected entry
  move <from> <to>       move an entry to another position
  list                   show the list
  title <text>           set the document title
  output <path>          set the output file
  save                   concatenate the list
  quit";

/// The file list plus output settings of one running instance
#[derive(Debug, Clone, Default)]
pub struct Session {
    model: FileOrderModel,
    output: OutputSpec,
}

impl Session {
    pub fn new(output: OutputSpec) -> Self {
        Self {
            model: FileOrderModel::new(),
            output,
        }
    }

    pub fn model(&self) -> &FileOrderModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut FileOrderModel {
        &mut self.model
    }

    pub fn output(&self) -> &OutputSpec {
        &self.output
    }

    /// Apply one command
    pub fn execute(&mut self, command: Command) -> Reply {
        let actions = self.model.actions();

        match command {
            Command::Add(paths) => {
                self.model.add_many(paths);
                Reply::Changed
            }
            Command::Insert(index, path) => {
                self.model.insert(index, path);
                Reply::Changed
            }
            Command::Drop(paths) => {
                if self.model.add_dropped(paths) == 0 {
                    Reply::Ignored("No PDF files among the dropped paths")
                } else {
                    Reply::Changed
                }
            }
            Command::Select(index) => changed_if(self.model.select(index), "No such position"),
            Command::Deselect => {
                self.model.clear_selection();
                Reply::Changed
            }
            Command::Remove(Some(index)) => {
                changed_if(self.model.remove(index).is_some(), "No such position")
            }
            Command::Remove(None) => {
                if !actions.remove {
                    return Reply::Ignored("Select a file first");
                }
                changed_if(self.model.remove_selected().is_some(), "Select a file first")
            }
            Command::Up => {
                if !actions.move_up {
                    return Reply::Ignored("Cannot move up");
                }
                changed_if(self.model.move_selected(Direction::Up), "Cannot move up")
            }
            Command::Down => {
                if !actions.move_down {
                    return Reply::Ignored("Cannot move down");
                }
                changed_if(self.model.move_selected(Direction::Down), "Cannot move down")
            }
            Command::Move { from, to } => {
                changed_if(self.model.relocate(from, to), "No such position")
            }
            Command::List => Reply::Changed,
            Command::Title(title) => {
                self.output.title = title;
                Reply::Changed
            }
            Command::Output(path) => {
                let title = std::mem::take(&mut self.output.title);
                self.output = OutputSpec::from_path(&path, title);
                Reply::Changed
            }
            Command::Save => self.save(),
            Command::Help => Reply::Help,
            Command::Quit => Reply::Quit,
        }
    }

    /// Concatenate the current list to the configured output and wait for it
    pub fn save(&self) -> Reply {
        match self.start_save() {
            Ok(worker) => finish_save(worker),
            Err(err) => Reply::Failed(err),
        }
    }

    /// Start concatenating the current list on a worker thread
    ///
    /// The list and output settings are snapshotted, so the session may keep
    /// changing while the worker runs. Pass the handle to [`finish_save`].
    pub fn start_save(&self) -> ConcatResult<JoinHandle<ConcatResult<Concatenated>>> {
        if self.model.is_empty() {
            return Err(Error::EmptyInput);
        }
        spawn_concatenate(ConcatOptions::from_model(&self.model, &self.output))
    }

    pub fn render(&self) -> View {
        View {
            entries: self.model.entries().iter().map(|e| e.to_string()).collect(),
            selection: self.model.selection(),
            actions: self.model.actions(),
            title: self.output.title.clone(),
            output_path: with_default_extension(&self.output.path()),
        }
    }
}

/// Wait for a worker started by [`Session::start_save`]
pub fn finish_save(worker: JoinHandle<ConcatResult<Concatenated>>) -> Reply {
    match worker.join() {
        Ok(Ok(done)) => Reply::Saved(done),
        Ok(Err(err)) => Reply::Failed(err),
        Err(_) => Reply::Failed(Error::WorkerPanicked),
    }
}

fn changed_if(changed: bool, reason: &'static str) -> Reply {
    if changed {
        Reply::Changed
    } else {
        Reply::Ignored(reason)
    }
}
