use crate::error::ShellResult;
use crate::history::HistoryLog;
use crate::registry::Registry;
use crate::script::ScriptStack;
use crate::source::LineSource;
use crate::storage::CollectionStorage;
use crate::store::MovieStore;
use crate::validate::PassportRegistry;
use std::io::Write;
use std::path::PathBuf;

/// What the loop that dispatched a command should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    /// `exit` was executed: every enclosing script loop and the shell loop unwind.
    Exit,
}

/// Whether the current line came from the console or from a script.
///
/// Field prompts re-ask on invalid input interactively, but abort the whole record in a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionMode {
    Interactive,
    /// Running the script at the given path (the innermost one when scripts are nested).
    Script(PathBuf),
}

/// Everything that lives for the whole session and that commands operate on.
pub struct ShellState {
    pub store: MovieStore,
    pub passports: PassportRegistry,
    pub history: HistoryLog,
    pub scripts: ScriptStack,
    pub storage: Box<dyn CollectionStorage>,
    pub out: Box<dyn Write>,
}

impl ShellState {
    pub fn new(
        store: MovieStore,
        passports: PassportRegistry,
        storage: Box<dyn CollectionStorage>,
        out: Box<dyn Write>,
    ) -> Self {
        Self {
            store,
            passports,
            history: HistoryLog::new(),
            scripts: ScriptStack::default(),
            storage,
            out,
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        match self.scripts.current() {
            Some(path) => ExecutionMode::Script(path.to_path_buf()),
            None => ExecutionMode::Interactive,
        }
    }
}

/// Borrowed view handed to a command while it runs.
pub struct Context<'a> {
    /// Needed by `help` and by `execute_script`, which dispatches the lines it reads.
    pub registry: &'a Registry,
    pub state: &'a mut ShellState,
    /// The source the command line was read from; multi-line commands keep reading from it.
    pub input: &'a mut dyn LineSource,
}

/// Object-safe trait for any command the shell can dispatch.
///
/// Implemented by every built-in through a blanket impl over [`crate::builtin::Builtin`].
pub trait ShellCommand {
    /// Canonical lower-case name.
    fn name(&self) -> &'static str;

    /// Extra names the command answers to.
    fn aliases(&self) -> &'static [&'static str];

    /// Usage line shown by `help`.
    fn usage(&self) -> &'static str;

    /// One-line description shown by `help`.
    fn about(&self) -> &'static str;

    /// Exact number of positional arguments.
    fn arity(&self) -> usize;

    /// Run the command. `args` has already been checked against [`ShellCommand::arity`].
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> ShellResult<Control>;
}
