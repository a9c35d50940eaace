use crate::error::{ShellError, ShellResult};
use std::collections::HashMap;
use std::env as stdenv;
use std::path::PathBuf;

/// Variable holding the path of the collection file.
pub const COLLECTION_PATH_VAR: &str = "MOVIE_COLLECTION";

/// Snapshot of the process environment the shell is configured from.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// Capture the variables of the current process.
    pub fn new() -> Self {
        Self::from_vars(stdenv::vars())
    }

    pub fn from_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Look `key` up in the snapshot; the live process environment is not consulted.
    pub fn get_var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Set or override a variable in this snapshot only.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// Path of the collection file; an unset or blank variable is a configuration error.
    pub fn collection_path(&self) -> ShellResult<PathBuf> {
        self.get_var(COLLECTION_PATH_VAR)
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .map(PathBuf::from)
            .ok_or(ShellError::MissingConfig(COLLECTION_PATH_VAR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_set_and_get_var() {
        let mut env = Environment::default();

        assert_eq!(env.get_var("SOME_RANDOM_ENV_VAR_12345"), None);

        env.set_var("KEY", "VALUE");

        assert_eq!(env.get_var("KEY"), Some("VALUE"));
    }

    #[test]
    fn test_env_reads_from_process_env() {
        let env = Environment::new();
        assert!(env.get_var("PATH").is_some());
    }

    #[test]
    fn test_lookup_reads_only_the_snapshot() {
        let env = Environment::from_vars([("ONLY", "here")]);
        assert_eq!(env.get_var("ONLY"), Some("here"));
        assert_eq!(env.get_var("PATH"), None);
    }

    #[test]
    fn test_collection_path() {
        let env = Environment::from_vars([(COLLECTION_PATH_VAR, "/tmp/movies.xml")]);
        assert_eq!(
            env.collection_path().unwrap(),
            PathBuf::from("/tmp/movies.xml")
        );
    }

    #[test]
    fn test_missing_collection_path_is_fatal() {
        for env in [
            Environment::default(),
            Environment::from_vars([(COLLECTION_PATH_VAR, "  ")]),
        ] {
            let err = env.collection_path().unwrap_err();
            assert!(matches!(err, ShellError::MissingConfig(COLLECTION_PATH_VAR)));
            assert!(err.is_fatal());
        }
    }
}
