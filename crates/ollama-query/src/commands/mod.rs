//! REPL commands and the shared session they run against.

pub mod chat;
pub mod exit;
pub mod generate;
pub mod models;
pub mod registry;
pub mod repl;
pub mod stream;
pub mod version;

use std::collections::HashMap;
use std::io::Write;

use ollama_query_client::OllamaClient;

use registry::{CommandSpec, Registry};

/// Metadata key carrying a JSON-encoded continuation token.
pub const CONTEXT_KEY: &str = "context";

/// Metadata key asking the REPL to stop.
pub const EXIT_KEY: &str = "exit";

/// Side channel from an action back to the dispatch loop.
pub type Metadata = HashMap<String, String>;

/// What every action returns.
pub type ActionResult = anyhow::Result<Option<Metadata>>;

/// The action bound to a command.
pub type ActionFn = Box<dyn Fn(&mut Session, &[String]) -> ActionResult>;

/// Errors raised by actions before any request is made.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Fewer arguments than the command needs.
    #[error("not enough arguments provided. Usage: {usage}")]
    Usage { usage: &'static str },
}

/// Fail with a usage error unless at least `min` arguments were given.
pub fn require_args(args: &[String], min: usize, usage: &'static str) -> Result<(), CommandError> {
    if args.len() < min {
        return Err(CommandError::Usage { usage });
    }
    Ok(())
}

/// Output verbosity, set once at startup.
///
/// Drives the console log filter and whether actions print extra detail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Verbosity(u8);

impl Verbosity {
    pub fn new(level: u8) -> Self {
        Self(level)
    }

    pub fn level(self) -> u8 {
        self.0
    }

    pub fn is_verbose(self) -> bool {
        self.0 > 0
    }

    /// `EnvFilter` directives for the console log layer.
    pub fn console_filter(self) -> String {
        let level = match self.0 {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        format!(
            "ollama_query={level},ollama_query_client={level},ollama_query_config={level},error"
        )
    }
}

/// State shared by every command for the lifetime of the process.
///
/// Only the dispatch loop changes the continuation token; actions read it and
/// write to the output sinks.
pub struct Session {
    client: OllamaClient,
    context: Vec<i64>,
    verbosity: Verbosity,
    /// Normal output.
    pub out: Box<dyn Write>,
    /// Error output.
    pub err: Box<dyn Write>,
}

impl Session {
    /// Create a session writing to stdout/stderr.
    pub fn new(client: OllamaClient, verbosity: Verbosity) -> Self {
        Self::with_sinks(
            client,
            verbosity,
            Box::new(std::io::stdout()),
            Box::new(std::io::stderr()),
        )
    }

    /// Create a session writing to the given sinks.
    pub fn with_sinks(
        client: OllamaClient,
        verbosity: Verbosity,
        out: Box<dyn Write>,
        err: Box<dyn Write>,
    ) -> Self {
        Self {
            client,
            context: Vec::new(),
            verbosity,
            out,
            err,
        }
    }

    pub fn client(&self) -> &OllamaClient {
        &self.client
    }

    /// Continuation token from the last generation, empty if none.
    pub fn context(&self) -> &[i64] {
        &self.context
    }

    pub(crate) fn set_context(&mut self, context: Vec<i64>) {
        self.context = context;
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }
}

/// Build the command table.
///
/// Order matters: when an abbreviation matches several commands, the first
/// one listed here wins.
pub fn registry() -> Registry {
    Registry::builder()
        .command(
            CommandSpec::new("Chat", &["chat"], "<model> <role> <prompt>", "Chat with model"),
            chat::run,
        )
        .command(
            CommandSpec::new("Exit", &["exit", "quit"], "", "Exit the application"),
            exit::run,
        )
        .command(
            CommandSpec::new("Generate", &["generate"], "<name> <prompt>", "Converse using context"),
            generate::run,
        )
        .menu(CommandSpec::new("Help", &["help", "menu"], "", "Display this menu"))
        .command(
            CommandSpec::new("List", &["ls", "list", "tags"], "", "List Models"),
            models::list,
        )
        .command(
            CommandSpec::new("Processes", &["ps", "processes"], "", "Execute ps command"),
            models::ps,
        )
        .command(
            CommandSpec::new("Show", &["show", "details"], "<name>", "Show Model Details"),
            models::show,
        )
        .command(
            CommandSpec::new("Version", &["version"], "", "Get Version"),
            version::run,
        )
        .build()
}

/// Horizontal rule printed above each command's output.
pub(crate) fn rule() -> String {
    "*".repeat(80)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_args() {
        let args = testing::args(&["llama3.2"]);
        assert!(require_args(&args, 1, "show <name>").is_ok());

        let err = require_args(&args, 2, "generate <model_name> <prompt>").unwrap_err();
        assert_eq!(
            err.to_string(),
            "not enough arguments provided. Usage: generate <model_name> <prompt>"
        );
    }

    #[test]
    fn test_verbosity_filters() {
        assert!(Verbosity::new(0).console_filter().starts_with("ollama_query=warn"));
        assert!(Verbosity::new(1).console_filter().starts_with("ollama_query=info"));
        assert!(Verbosity::new(2).console_filter().contains("ollama_query_client=debug"));
        assert!(Verbosity::new(9).console_filter().contains("ollama_query_config=trace"));
        assert!(!Verbosity::default().is_verbose());
    }

    #[test]
    fn test_session_starts_without_context() {
        let (mut session, _, _) = testing::session("http://localhost:11434");
        assert!(session.context().is_empty());
        assert_eq!(session.client().base_url().as_str(), "http://localhost:11434/");

        session.set_context(vec![1, 2, 3]);
        assert_eq!(session.context(), &[1, 2, 3]);
    }

    #[test]
    fn test_default_registry_order() {
        let registry = registry();
        let names: Vec<&str> = registry.iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec!["Chat", "Exit", "Generate", "Help", "List", "Processes", "Show", "Version"]
        );
    }

    #[test]
    fn test_default_registry_abbreviations() {
        let registry = registry();
        let resolve = |word: &str| registry.resolve(word).map(|c| c.name());

        assert_eq!(resolve("c"), Some("Chat"));
        assert_eq!(resolve("q"), Some("Exit"));
        assert_eq!(resolve("g"), Some("Generate"));
        assert_eq!(resolve("m"), Some("Help"));
        assert_eq!(resolve("t"), Some("List"));
        assert_eq!(resolve("l"), Some("List"));
        assert_eq!(resolve("proc"), Some("Processes"));
        assert_eq!(resolve("det"), Some("Show"));
        assert_eq!(resolve("v"), Some("Version"));
        // "p" is a prefix of "ps" and "processes", both on Processes.
        assert_eq!(resolve("p"), Some("Processes"));
        assert_eq!(resolve("Chat"), None);
        assert_eq!(resolve("bogus"), None);
    }
}
