//! Nested execution of script files.

use crate::command::{Control, ShellState};
use crate::error::{ShellError, ShellResult};
use crate::registry::Registry;
use crate::source::{FileSource, LineSource};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone)]
struct Frame {
    /// Path as the user wrote it, used in diagnostics.
    shown: PathBuf,
    /// Resolved identity, used for cycle detection.
    canonical: PathBuf,
}

/// Scripts currently running, outermost first.
#[derive(Debug, Default)]
pub struct ScriptStack {
    frames: Vec<Frame>,
}

impl ScriptStack {
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// The innermost running script.
    pub fn current(&self) -> Option<&Path> {
        self.frames.last().map(|frame| frame.shown.as_path())
    }

    /// Whether a script that resolves to `canonical` is already running.
    pub fn contains(&self, canonical: &Path) -> bool {
        self.frames.iter().any(|frame| frame.canonical == canonical)
    }

    /// Paths of all running scripts joined with `:`, outermost first.
    pub fn joined(&self) -> String {
        self.frames
            .iter()
            .map(|frame| frame.shown.display().to_string())
            .collect::<Vec<_>>()
            .join(":")
    }

    fn push(&mut self, shown: &Path, canonical: PathBuf) {
        self.frames.push(Frame {
            shown: shown.to_path_buf(),
            canonical,
        });
    }

    fn pop(&mut self) {
        self.frames.pop();
    }
}

/// Run every line of the script at `path` through `registry`.
///
/// The script is rejected without being opened when it resolves to a file that is already
/// running. Failing lines are reported with the joined stack and line number and do not stop the
/// script; only fatal errors, read failures of the script itself and `exit` end it early.
pub fn execute_script(
    registry: &Registry,
    state: &mut ShellState,
    path: &Path,
) -> ShellResult<Control> {
    let canonical = fs::canonicalize(path)
        .map_err(|err| ShellError::file_access(path, err, ShellError::script_read))?;
    if state.scripts.contains(&canonical) {
        warn!(path = %path.display(), "rejected recursive script");
        return Err(ShellError::FileRecursion(path.to_path_buf()));
    }

    let mut source = FileSource::open(path)?;
    state.scripts.push(path, canonical);
    info!(path = %path.display(), depth = state.scripts.depth(), "running script");

    let outcome = run_lines(registry, state, &mut source);

    state.scripts.pop();
    info!(path = %source.path().display(), lines = source.line_number(), "script finished");
    outcome
}

fn run_lines(
    registry: &Registry,
    state: &mut ShellState,
    source: &mut FileSource,
) -> ShellResult<Control> {
    while source.has_next_line()? {
        let line = source.read_line()?;
        let line_number = source.line_number();
        match registry.dispatch(&line, state, source) {
            Ok(Control::Continue) => {}
            Ok(Control::Exit) => return Ok(Control::Exit),
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                writeln!(state.out, "{}:{}: {}", state.scripts.joined(), line_number, err)?;
            }
        }
    }
    Ok(Control::Continue)
}
