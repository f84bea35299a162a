//! REPL (Read-Eval-Print Loop) over the command registry.
//!
//! A line may hold several commands separated by `;`. Each one is split on
//! whitespace into a command word and its arguments, resolved against the
//! registry and run before the next one starts.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use console::Style;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Config, Context, Editor, Helper};

use super::registry::{Registry, print_menu};
use super::{CONTEXT_KEY, EXIT_KEY, Metadata, Session};

const PROMPT: &str = ">";

/// Control flow for the REPL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    Exit,
}

/// Run every command on `line`, in order.
///
/// Failures are reported to the session's error sink and do not stop the
/// batch; only the exit command does.
pub fn execute_line(registry: &Registry, session: &mut Session, line: &str) -> ControlFlow {
    for command in line.split(';') {
        let mut words = command.split_whitespace();
        let Some(word) = words.next() else {
            continue;
        };
        let args: Vec<String> = words.map(str::to_string).collect();

        let Some(descriptor) = registry.resolve(word) else {
            let _ = writeln!(session.err, "Invalid option [{}] with [{}].", word, args.join(" "));
            let _ = print_menu(&mut session.out, registry.specs());
            continue;
        };

        tracing::debug!(command = descriptor.name(), ?args, "Executing command");
        match descriptor.invoke(session, &args) {
            Ok(Some(metadata)) => {
                if apply_metadata(session, &metadata) == ControlFlow::Exit {
                    return ControlFlow::Exit;
                }
            }
            Ok(None) => {}
            Err(e) => {
                let red = Style::new().red();
                let _ = writeln!(session.err, "{} {:#}", red.apply_to("Error executing action:"), e);
            }
        }
    }
    ControlFlow::Continue
}

/// Fold an action's metadata into the session.
fn apply_metadata(session: &mut Session, metadata: &Metadata) -> ControlFlow {
    for (key, value) in metadata {
        match key.as_str() {
            CONTEXT_KEY => match serde_json::from_str::<Vec<i64>>(value) {
                Ok(context) => {
                    tracing::debug!(tokens = context.len(), "Updated continuation context");
                    session.set_context(context);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring unreadable continuation context");
                }
            },
            EXIT_KEY => {}
            _ => tracing::debug!(%key, %value, "Command metadata"),
        }
    }

    if metadata.contains_key(EXIT_KEY) {
        ControlFlow::Exit
    } else {
        ControlFlow::Continue
    }
}

/// Line editor settings.
#[derive(Debug, Clone)]
pub struct ReplOptions {
    /// Where history is loaded from and saved to; `None` keeps it in memory.
    pub history_path: Option<PathBuf>,
    /// Maximum number of history entries.
    pub max_history: usize,
}

/// Interactive loop state.
pub struct Repl {
    registry: Registry,
    session: Session,
    editor: Editor<CommandCompleter, DefaultHistory>,
    history_path: Option<PathBuf>,
}

impl Repl {
    /// Create a new REPL instance.
    pub fn new(registry: Registry, session: Session, options: ReplOptions) -> Result<Self> {
        let config = Config::builder()
            .max_history_size(options.max_history)?
            .auto_add_history(false)
            .build();

        let mut editor = Editor::with_config(config)?;
        editor.set_helper(Some(CommandCompleter::new(registry.triggers())));

        if let Some(path) = &options.history_path
            && path.exists()
            && let Err(e) = editor.load_history(path)
        {
            tracing::warn!(path = %path.display(), error = %e, "Could not load history");
        }

        Ok(Self {
            registry,
            session,
            editor,
            history_path: options.history_path,
        })
    }

    /// Run `initial` (if any), then read lines until exit or end of input.
    pub fn run(&mut self, initial: Option<String>) -> Result<()> {
        let mut pending = initial;

        loop {
            let line = match pending.take() {
                Some(line) => line,
                None => match self.editor.readline(PROMPT) {
                    Ok(line) => {
                        self.record(&line);
                        line
                    }
                    Err(ReadlineError::Interrupted) => continue,
                    Err(ReadlineError::Eof) => break,
                    Err(e) => {
                        let red = Style::new().red();
                        let _ = writeln!(self.session.err, "{} {}", red.apply_to("Input error:"), e);
                        break;
                    }
                },
            };

            if execute_line(&self.registry, &mut self.session, &line) == ControlFlow::Exit {
                break;
            }
        }

        Ok(())
    }

    /// Append a line to the history and persist it.
    fn record(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        if let Err(e) = self.editor.add_history_entry(line) {
            tracing::warn!(error = %e, "Could not add history entry");
            return;
        }
        let Some(path) = &self.history_path else {
            return;
        };
        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            tracing::warn!(path = %parent.display(), error = %e, "Could not create history directory");
            return;
        }
        if let Err(e) = self.editor.save_history(path) {
            tracing::warn!(path = %path.display(), error = %e, "Could not save history");
        }
    }
}

/// Tab completion for command words.
pub struct CommandCompleter {
    triggers: Vec<&'static str>,
}

impl CommandCompleter {
    pub fn new(triggers: Vec<&'static str>) -> Self {
        Self { triggers }
    }

    /// Triggers completing the command word under the cursor, with the
    /// position the replacement starts at.
    fn candidates(&self, line: &str, pos: usize) -> (usize, Vec<&'static str>) {
        let head = &line[..pos];
        let start = head.rfind(';').map_or(0, |i| i + 1);
        let command = &head[start..];
        let word = command.trim_start();

        // Only the first word of a command is completed.
        if word.contains(char::is_whitespace) {
            return (pos, Vec::new());
        }

        let word_start = start + (command.len() - word.len());
        let matches = self
            .triggers
            .iter()
            .copied()
            .filter(|t| t.starts_with(word))
            .collect();
        (word_start, matches)
    }
}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, matches) = self.candidates(line, pos);
        let pairs = matches
            .into_iter()
            .map(|t| Pair {
                display: t.to_string(),
                replacement: t.to_string(),
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for CommandCompleter {
    type Hint = String;
}

impl Highlighter for CommandCompleter {}

impl Validator for CommandCompleter {}

impl Helper for CommandCompleter {}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::commands::registry::{CommandSpec, render_menu};
    use crate::commands::testing::{self, SharedBuffer};
    use crate::commands::{ActionResult, CommandError, require_args};

    type Calls = Rc<RefCell<Vec<String>>>;

    fn recorder(calls: &Calls, name: &'static str) -> impl Fn(&mut Session, &[String]) -> ActionResult + 'static {
        let calls = Rc::clone(calls);
        move |_: &mut Session, args: &[String]| -> ActionResult {
            calls.borrow_mut().push(format!("{} {}", name, args.join(" ")).trim_end().to_string());
            Ok(None)
        }
    }

    fn fake_registry(calls: &Calls) -> Registry {
        let context_calls = Rc::clone(calls);
        Registry::builder()
            .command(CommandSpec::new("Exit", &["exit", "quit"], "", "Exit"), crate::commands::exit::run)
            .command(
                CommandSpec::new("Generate", &["generate"], "<name> <prompt>", "Generate"),
                move |_: &mut Session, args: &[String]| -> ActionResult {
                    require_args(args, 2, "generate <model_name> <prompt>")?;
                    context_calls.borrow_mut().push("generate".to_string());
                    let value = if args[0] == "broken" { "[1,2".to_string() } else { "[1,2,3]".to_string() };
                    Ok(Some(Metadata::from([(CONTEXT_KEY.to_string(), value)])))
                },
            )
            .menu(CommandSpec::new("Help", &["help", "menu"], "", "Display this menu"))
            .command(CommandSpec::new("List", &["ls", "list", "tags"], "", "List"), recorder(calls, "tags"))
            .command(CommandSpec::new("Processes", &["ps", "processes"], "", "ps"), recorder(calls, "ps"))
            .build()
    }

    fn setup() -> (Registry, Calls, Session, SharedBuffer, SharedBuffer) {
        let calls: Calls = Rc::default();
        let registry = fake_registry(&calls);
        let (session, out, err) = testing::session("http://localhost:11434");
        (registry, calls, session, out, err)
    }

    #[test]
    fn test_invalid_option_does_not_stop_the_batch() {
        let (registry, calls, mut session, out, err) = setup();

        let flow = execute_line(&registry, &mut session, "tags; bogus one two; ps");

        assert_eq!(flow, ControlFlow::Continue);
        assert_eq!(*calls.borrow(), vec!["tags", "ps"]);
        assert!(err.contents().contains("Invalid option [bogus] with [one two]."));
        assert!(out.contents().contains("Choose an option:"));
    }

    #[test]
    fn test_empty_commands_are_skipped() {
        let (registry, calls, mut session, _, err) = setup();

        execute_line(&registry, &mut session, ";;  ; t ;");

        assert_eq!(*calls.borrow(), vec!["tags"]);
        assert!(err.contents().is_empty());
    }

    #[test]
    fn test_arguments_are_passed_through() {
        let (registry, calls, mut session, _, _) = setup();
        execute_line(&registry, &mut session, "  ls   -a   b  ");
        assert_eq!(*calls.borrow(), vec!["tags -a b"]);
    }

    #[test]
    fn test_action_error_is_reported_and_loop_continues() {
        let (registry, calls, mut session, _, err) = setup();

        let flow = execute_line(&registry, &mut session, "generate; ps");

        assert_eq!(flow, ControlFlow::Continue);
        assert_eq!(*calls.borrow(), vec!["ps"]);
        let reported = err.contents();
        assert!(reported.contains("Error executing action:"));
        assert!(reported.contains(&CommandError::Usage { usage: "generate <model_name> <prompt>" }.to_string()));
    }

    #[test]
    fn test_context_metadata_updates_session() {
        let (registry, _, mut session, _, _) = setup();

        execute_line(&registry, &mut session, "g llama3.2 hello");

        assert_eq!(session.context(), &[1, 2, 3]);
    }

    #[test]
    fn test_unreadable_context_keeps_previous_token() {
        let (registry, _, mut session, _, _) = setup();
        session.set_context(vec![42]);

        execute_line(&registry, &mut session, "generate broken hello");

        assert_eq!(session.context(), &[42]);
    }

    #[test]
    fn test_exit_stops_the_batch() {
        let (registry, calls, mut session, _, _) = setup();

        let flow = execute_line(&registry, &mut session, "tags; quit; ps");

        assert_eq!(flow, ControlFlow::Exit);
        assert_eq!(*calls.borrow(), vec!["tags"]);
    }

    #[test]
    fn test_help_prints_menu() {
        let (registry, _, mut session, out, _) = setup();
        execute_line(&registry, &mut session, "menu");
        assert!(out.contents().contains(&render_menu(registry.specs())));
    }

    #[test]
    fn test_completion_candidates() {
        let completer = CommandCompleter::new(vec!["chat", "exit", "quit", "generate", "ls", "list", "tags"]);

        assert_eq!(completer.candidates("l", 1), (0, vec!["ls", "list"]));
        assert_eq!(completer.candidates("ls; ge", 6), (4, vec!["generate"]));
        assert_eq!(completer.candidates("", 0), (0, completer.triggers.clone()));
        // Arguments are not completed.
        assert_eq!(completer.candidates("generate ll", 11), (11, vec![]));
    }
}
