use crate::error::{ShellError, ShellResult};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Where command lines and field values come from.
///
/// The interactive console and script files implement the same interface, so the dispatcher
/// and the field prompts never care which one they are reading.
pub trait LineSource {
    /// Read the next command line.
    fn read_line(&mut self) -> ShellResult<String>;

    /// Read one field value, showing `prompt` where that makes sense.
    fn read_prompted(&mut self, prompt: &str) -> ShellResult<String>;

    /// Whether another line can be read without reaching the end of input.
    fn has_next_line(&mut self) -> ShellResult<bool>;

    /// Number of lines consumed so far, counting from 1 for the first line.
    fn line_number(&self) -> usize;
}

/// Interactive terminal input backed by `rustyline`.
pub struct ConsoleSource {
    editor: DefaultEditor,
    line_number: usize,
}

impl ConsoleSource {
    pub const COMMAND_PROMPT: &'static str = "$ ";

    pub fn new() -> ShellResult<Self> {
        let editor = DefaultEditor::new().map_err(readline_failure)?;
        Ok(Self {
            editor,
            line_number: 0,
        })
    }

    fn read_with(&mut self, prompt: &str) -> ShellResult<String> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                self.line_number += 1;
                Ok(line)
            }
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => {
                Err(ShellError::EndOfInput)
            }
            Err(err) => Err(readline_failure(err)),
        }
    }
}

impl LineSource for ConsoleSource {
    fn read_line(&mut self) -> ShellResult<String> {
        let line = self.read_with(Self::COMMAND_PROMPT)?;
        if !line.trim().is_empty() {
            self.editor
                .add_history_entry(line.as_str())
                .map_err(readline_failure)?;
        }
        Ok(line)
    }

    fn read_prompted(&mut self, prompt: &str) -> ShellResult<String> {
        self.read_with(&format!("{prompt} > "))
    }

    /// The console blocks for input, so there is always a next line until end of input.
    fn has_next_line(&mut self) -> ShellResult<bool> {
        Ok(true)
    }

    fn line_number(&self) -> usize {
        self.line_number
    }
}

fn readline_failure(err: ReadlineError) -> ShellError {
    match err {
        ReadlineError::Io(err) => ShellError::Io(err),
        other => ShellError::Io(io::Error::other(other.to_string())),
    }
}

/// Script file read one line at a time.
pub struct FileSource {
    path: PathBuf,
    reader: BufReader<File>,
    peeked: Option<String>,
    line_number: usize,
}

impl FileSource {
    /// Open a script. The file must be readable and writable.
    pub fn open(path: &Path) -> ShellResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|err| ShellError::file_access(path, err, ShellError::script_read))?;
        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
            peeked: None,
            line_number: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn fill(&mut self) -> ShellResult<bool> {
        if self.peeked.is_some() {
            return Ok(true);
        }
        let mut buf = String::new();
        let read = self
            .reader
            .read_line(&mut buf)
            .map_err(|source| ShellError::ScriptRead {
                path: self.path.clone(),
                source,
            })?;
        if read == 0 {
            return Ok(false);
        }
        let trimmed = buf.trim_end_matches(['\n', '\r']).len();
        buf.truncate(trimmed);
        self.peeked = Some(buf);
        Ok(true)
    }

    fn take(&mut self) -> ShellResult<Option<String>> {
        if !self.fill()? {
            return Ok(None);
        }
        self.line_number += 1;
        Ok(self.peeked.take())
    }
}

impl LineSource for FileSource {
    fn read_line(&mut self) -> ShellResult<String> {
        self.take()?.ok_or(ShellError::EndOfInput)
    }

    fn read_prompted(&mut self, _prompt: &str) -> ShellResult<String> {
        self.take()?.ok_or_else(|| ShellError::InvalidScript {
            path: self.path.display().to_string(),
            line: String::new(),
            message: "! unexpected end of script !".to_string(),
        })
    }

    fn has_next_line(&mut self) -> ShellResult<bool> {
        self.fill()
    }

    fn line_number(&self) -> usize {
        self.line_number
    }
}
