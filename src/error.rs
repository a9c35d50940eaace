use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type used throughout the shell.
pub type ShellResult<T> = Result<T, ShellError>;

/// Every failure a command, a script or the shell itself can produce.
///
/// Most variants are recoverable: the loop that observes them prints the message and moves on.
/// See [`ShellError::is_fatal`] for the ones that end the process.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("! invalid command: {0} !")]
    InvalidCommand(String),

    #[error("! wrong number of arguments: {name} expects {expected}, got {actual} !")]
    WrongArity {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// A field value failed validation. The message is already user-facing.
    #[error("{0}")]
    InvalidArgument(String),

    #[error("! not an integer !")]
    NotAnInteger,

    #[error("! key does not exist !")]
    KeyNotFound,

    #[error("! key already exists !")]
    KeyExists,

    #[error("! id does not exist !")]
    IdNotFound,

    #[error("! collection is empty !")]
    EmptyCollection,

    #[error("Invalid line in script {path}, line: '{line}', error message: {message}")]
    InvalidScript {
        path: String,
        line: String,
        message: String,
    },

    #[error("! recursion detected: script {} is already running !", .0.display())]
    FileRecursion(PathBuf),

    #[error("! file {} not found !", .0.display())]
    FileNotFound(PathBuf),

    #[error("! no read/write permission for file {} !", .0.display())]
    FilePermission(PathBuf),

    #[error("! failed to read script {}: {source} !", path.display())]
    ScriptRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("! failed to save collection to {}: {source} !", path.display())]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("! invalid file data: {0} !")]
    InvalidFileData(String),

    #[error("! environment variable {0} is not set !")]
    MissingConfig(&'static str),

    #[error("! unexpected end of input !")]
    EndOfInput,

    #[error("! i/o error: {0} !")]
    Io(#[from] io::Error),
}

impl ShellError {
    /// Whether the error must terminate the whole process instead of being reported.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ShellError::EndOfInput
                | ShellError::MissingConfig(_)
                | ShellError::InvalidFileData(_)
                | ShellError::Io(_)
        )
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        ShellError::InvalidArgument(message.into())
    }

    /// Classify a failure to open or resolve `path`. Missing files and permission failures get
    /// their own variants, anything else goes through `other`.
    pub(crate) fn file_access(
        path: &Path,
        err: io::Error,
        other: impl FnOnce(PathBuf, io::Error) -> ShellError,
    ) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => ShellError::FileNotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => ShellError::FilePermission(path.to_path_buf()),
            _ => other(path.to_path_buf(), err),
        }
    }

    pub(crate) fn script_read(path: PathBuf, source: io::Error) -> Self {
        ShellError::ScriptRead { path, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(ShellError::EndOfInput.is_fatal());
        assert!(ShellError::MissingConfig("X").is_fatal());
        assert!(ShellError::InvalidFileData("bad".into()).is_fatal());

        assert!(!ShellError::InvalidCommand("foo".into()).is_fatal());
        assert!(!ShellError::FileRecursion(PathBuf::from("a.txt")).is_fatal());
        assert!(!ShellError::KeyNotFound.is_fatal());
    }

    #[test]
    fn test_file_access_classification() {
        let path = Path::new("movies.xml");
        let not_found = io::Error::from(io::ErrorKind::NotFound);
        let denied = io::Error::from(io::ErrorKind::PermissionDenied);
        let other = io::Error::other("disk on fire");

        assert!(matches!(
            ShellError::file_access(path, not_found, ShellError::script_read),
            ShellError::FileNotFound(p) if p.as_path() == path
        ));
        assert!(matches!(
            ShellError::file_access(path, denied, ShellError::script_read),
            ShellError::FilePermission(_)
        ));
        assert!(matches!(
            ShellError::file_access(path, other, |_, err| ShellError::Io(err)),
            ShellError::Io(_)
        ));
    }

    #[test]
    fn test_script_error_message_carries_path_and_line() {
        let err = ShellError::InvalidScript {
            path: "run.txt".into(),
            line: "abc".into(),
            message: "! not an integer !".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid line in script run.txt, line: 'abc', error message: ! not an integer !"
        );
    }
}
