//! Command table and trigger resolution.
//!
//! A command matches a typed word when any of its triggers starts with that
//! word, so `gen`, `g` and `generate` all reach Generate. Commands are tried
//! in registration order and the first match wins; ambiguous abbreviations
//! are not an error.
//!
//! The help command prints the table it belongs to. [`RegistryBuilder::build`]
//! therefore works in two phases: it freezes the ordered list of
//! [`CommandSpec`]s first, then binds the help action to a shared handle on
//! that frozen list. Nothing is rebound afterwards.

use std::io::Write;
use std::rc::Rc;

use super::{ActionFn, ActionResult, Session, rule};

/// Column layout of the menu table.
fn menu_row(name: &str, triggers: &str, params: &str, help: &str) -> String {
    format!("{:>10} {:<15} {:<23} {}", name, triggers, params, help)
}

/// Static description of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    /// Canonical name.
    pub name: &'static str,
    /// Words (or their prefixes) that invoke the command.
    pub triggers: &'static [&'static str],
    /// Parameter hint shown in the menu.
    pub params: &'static str,
    /// One-line description.
    pub help: &'static str,
}

impl CommandSpec {
    pub const fn new(
        name: &'static str,
        triggers: &'static [&'static str],
        params: &'static str,
        help: &'static str,
    ) -> Self {
        Self {
            name,
            triggers,
            params,
            help,
        }
    }

    /// True if `word` is a prefix of any trigger.
    pub fn matches(&self, word: &str) -> bool {
        !word.is_empty() && self.triggers.iter().any(|t| t.starts_with(word))
    }

    fn row(&self) -> String {
        menu_row(self.name, &self.triggers.join(", "), self.params, self.help)
    }
}

/// A command with its bound action.
pub struct CommandDescriptor {
    spec: CommandSpec,
    action: ActionFn,
}

impl CommandDescriptor {
    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    /// Run the command.
    pub fn invoke(&self, session: &mut Session, args: &[String]) -> ActionResult {
        (self.action)(session, args)
    }
}

/// Render the menu for a list of commands.
pub fn render_menu(specs: &[CommandSpec]) -> String {
    let mut menu = String::new();
    menu.push_str(&menu_row("Name", "Triggers", "Parameters", "Description"));
    menu.push('\n');
    menu.push_str(&menu_row("----", "--------", "----------", "-----------"));
    menu.push('\n');
    for spec in specs {
        menu.push_str(&spec.row());
        menu.push('\n');
    }
    menu
}

/// Print the menu the way the help command and the invalid-option path do.
pub fn print_menu(out: &mut dyn Write, specs: &[CommandSpec]) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", rule())?;
    writeln!(out, "{}", render_menu(specs))?;
    writeln!(out, "Choose an option:")?;
    Ok(())
}

/// Ordered, immutable command table.
pub struct Registry {
    commands: Vec<CommandDescriptor>,
    specs: Rc<[CommandSpec]>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Find the first command with a trigger starting with `word`.
    pub fn resolve(&self, word: &str) -> Option<&CommandDescriptor> {
        self.commands.iter().find(|c| c.spec.matches(word))
    }

    /// The frozen table of command specs, in registration order.
    pub fn specs(&self) -> &[CommandSpec] {
        &self.specs
    }

    /// Every trigger of every command, in registration order.
    pub fn triggers(&self) -> Vec<&'static str> {
        self.specs
            .iter()
            .flat_map(|s| s.triggers.iter().copied())
            .collect()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.commands.iter()
    }
}

enum Slot {
    Command(CommandSpec, ActionFn),
    Menu(CommandSpec),
}

impl Slot {
    fn spec(&self) -> CommandSpec {
        match self {
            Slot::Command(spec, _) | Slot::Menu(spec) => *spec,
        }
    }
}

/// Collects commands in order, then builds the [`Registry`].
#[derive(Default)]
pub struct RegistryBuilder {
    slots: Vec<Slot>,
}

impl RegistryBuilder {
    /// Register a command.
    pub fn command<F>(mut self, spec: CommandSpec, action: F) -> Self
    where
        F: Fn(&mut Session, &[String]) -> ActionResult + 'static,
    {
        self.slots.push(Slot::Command(spec, Box::new(action)));
        self
    }

    /// Register the help command, which prints the finished table.
    pub fn menu(mut self, spec: CommandSpec) -> Self {
        self.slots.push(Slot::Menu(spec));
        self
    }

    pub fn build(self) -> Registry {
        // Phase 1: freeze the table.
        let specs: Rc<[CommandSpec]> = self.slots.iter().map(Slot::spec).collect();

        // Phase 2: bind actions, giving the help command the frozen table.
        let commands = self
            .slots
            .into_iter()
            .map(|slot| match slot {
                Slot::Command(spec, action) => CommandDescriptor { spec, action },
                Slot::Menu(spec) => {
                    let table = Rc::clone(&specs);
                    CommandDescriptor {
                        spec,
                        action: Box::new(move |session: &mut Session, _args: &[String]| -> ActionResult {
                            print_menu(&mut session.out, &table)?;
                            Ok(None)
                        }),
                    }
                }
            })
            .collect();

        Registry { commands, specs }
    }
}
