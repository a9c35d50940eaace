use crate::command::{Control, ShellState};
use crate::env::Environment;
use crate::error::ShellResult;
use crate::registry::Registry;
use crate::source::LineSource;
use crate::storage::{CollectionStorage, XmlFileStorage};
use crate::store::MovieStore;
use crate::validate::PassportRegistry;
use std::io::Write;
use tracing::{error, info};

/// The top-level shell: reads lines from a [`LineSource`] and dispatches them until `exit`.
///
/// Example
/// ```
/// use movie_shell::Interpreter;
/// use movie_shell::io_adapters::{MemWriter, MemorySource};
/// use movie_shell::storage::XmlFileStorage;
///
/// let (out, buf) = MemWriter::with_handle();
/// let storage = XmlFileStorage::new(std::env::temp_dir().join("unused-collection.xml"));
/// let mut sh = Interpreter::with_empty_store(Box::new(storage), Box::new(out));
/// sh.run(&mut MemorySource::new(["info", "exit"])).unwrap();
/// assert!(String::from_utf8_lossy(&buf.borrow()).contains("Number of elements   : 0"));
/// ```
pub struct Interpreter {
    registry: Registry,
    state: ShellState,
}

impl Interpreter {
    /// Create an interpreter with a custom command registry over an existing session state.
    pub fn new(registry: Registry, state: ShellState) -> Self {
        Self { registry, state }
    }

    /// Load the collection named by the environment and build a shell with every built-in.
    pub fn from_environment(env: &Environment, out: Box<dyn Write>) -> ShellResult<Self> {
        let storage = XmlFileStorage::new(env.collection_path()?);
        let mut passports = PassportRegistry::new();
        let store = storage.load(&mut passports)?;
        info!(
            path = %storage.path().display(),
            elements = store.len(),
            "collection loaded"
        );
        let state = ShellState::new(store, passports, Box::new(storage), out);
        Ok(Self::new(Registry::default(), state))
    }

    pub fn with_empty_store(storage: Box<dyn CollectionStorage>, out: Box<dyn Write>) -> Self {
        let state = ShellState::new(MovieStore::default(), PassportRegistry::new(), storage, out);
        Self::new(Registry::default(), state)
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    /// Dispatch a single line read from `input`.
    pub fn execute_line(&mut self, line: &str, input: &mut dyn LineSource) -> ShellResult<Control> {
        self.registry.dispatch(line, &mut self.state, input)
    }

    /// Read-eval-print loop.
    ///
    /// Recoverable errors are printed and the loop goes on. Returns `Ok` after `exit`, or the
    /// first fatal error (such as the end of input).
    pub fn run(&mut self, input: &mut dyn LineSource) -> ShellResult<()> {
        loop {
            let line = input.read_line()?;
            match self.execute_line(&line, input) {
                Ok(Control::Continue) => {}
                Ok(Control::Exit) => {
                    info!("exit requested");
                    return Ok(());
                }
                Err(err) if err.is_fatal() => {
                    error!(%err, "fatal error");
                    return Err(err);
                }
                Err(err) => writeln!(self.state.out, "{err}")?,
            }
        }
    }
}
