use crate::command::{Context, Control, ShellCommand, ShellState};
use crate::error::{ShellError, ShellResult};
use crate::source::LineSource;
use std::collections::HashMap;
use tracing::debug;

/// Lines starting with this marker are comments.
pub const COMMENT_MARKER: &str = "//";

/// Flat table mapping command names (and aliases) to their handlers.
pub struct Registry {
    commands: Vec<Box<dyn ShellCommand>>,
    index: HashMap<&'static str, usize>,
}

impl Registry {
    /// Create a registry with a custom set of commands.
    ///
    /// A later command silently takes over a name already used by an earlier one.
    pub fn new(commands: Vec<Box<dyn ShellCommand>>) -> Self {
        let mut index = HashMap::new();
        for (position, command) in commands.iter().enumerate() {
            index.insert(command.name(), position);
            for alias in command.aliases() {
                index.insert(*alias, position);
            }
        }
        Self { commands, index }
    }

    /// Look a command up by an already lower-cased name.
    pub fn lookup(&self, name: &str) -> Option<&dyn ShellCommand> {
        self.index
            .get(name)
            .map(|&position| self.commands[position].as_ref())
    }

    /// Commands in registration order.
    pub fn commands(&self) -> impl Iterator<Item = &dyn ShellCommand> {
        self.commands.iter().map(|command| command.as_ref())
    }

    /// Parse one line and run the command it names.
    ///
    /// The invocation is recorded in the history before the name is even looked up, so unknown
    /// commands and arity mistakes show up there too. Errors raised by the handler are returned
    /// unchanged.
    pub fn dispatch(
        &self,
        line: &str,
        state: &mut ShellState,
        input: &mut dyn LineSource,
    ) -> ShellResult<Control> {
        let line = line.trim();
        if line.is_empty() || line.starts_with(COMMENT_MARKER) {
            return Ok(Control::Continue);
        }

        let mut tokens = line.split_whitespace();
        let name = tokens.next().unwrap_or_default().to_lowercase();
        let args: Vec<&str> = tokens.collect();
        state.history.record(&name, &args);

        let command = self
            .lookup(&name)
            .ok_or_else(|| ShellError::InvalidCommand(name.clone()))?;
        if args.len() != command.arity() {
            return Err(ShellError::WrongArity {
                name,
                expected: command.arity(),
                actual: args.len(),
            });
        }

        debug!(command = command.name(), ?args, "dispatching");
        command.execute(
            &args,
            &mut Context {
                registry: self,
                state,
                input,
            },
        )
    }
}

impl Default for Registry {
    /// Registry with every built-in command.
    fn default() -> Self {
        Self::new(crate::builtin::all())
    }
}
