//! Field-level checks shared by the record constructors, the field prompts and the file loader.

use crate::error::{ShellError, ShellResult};
use std::collections::HashSet;

pub const PASSPORT_MIN_LEN: usize = 7;
pub const PASSPORT_MAX_LEN: usize = 32;

pub fn check_key(key: i32) -> ShellResult<()> {
    check(key > 0, "! argument key cannot be <= 0 !")
}

pub fn check_movie_name(name: &str) -> ShellResult<()> {
    check(!name.is_empty(), "! argument name cannot be empty !")
}

pub fn check_oscars_count(oscars_count: i64) -> ShellResult<()> {
    check(oscars_count > 0, "! argument oscarsCount cannot be <= 0 !")
}

pub fn check_person_name(name: &str) -> ShellResult<()> {
    check(!name.is_empty(), "! parameter name cannot be empty !")
}

pub fn check_weight(weight: Option<i32>) -> ShellResult<()> {
    match weight {
        Some(w) => check(w > 0, "! argument weight cannot be <= 0 !"),
        None => Ok(()),
    }
}

/// Length rules only; uniqueness is the job of [`PassportRegistry`].
pub fn check_passport_format(passport_id: &str) -> ShellResult<()> {
    let len = passport_id.chars().count();
    check(
        len >= PASSPORT_MIN_LEN,
        "! argument passportID length cannot be < 7 !",
    )?;
    check(
        len <= PASSPORT_MAX_LEN,
        "! argument passportID length cannot be > 32 !",
    )
}

/// Parse a whole token as an `i32`, rejecting anything else with [`ShellError::NotAnInteger`].
pub fn parse_int(token: &str) -> ShellResult<i32> {
    token.trim().parse().map_err(|_| ShellError::NotAnInteger)
}

pub fn parse_long(token: &str) -> ShellResult<i64> {
    token.trim().parse().map_err(|_| ShellError::NotAnInteger)
}

fn check(statement: bool, message: &str) -> ShellResult<()> {
    if statement {
        Ok(())
    } else {
        Err(ShellError::invalid(message))
    }
}

/// Passport IDs claimed by every person constructed during the session.
///
/// An ID stays claimed after the person holding it is removed from the store.
#[derive(Debug, Default)]
pub struct PassportRegistry {
    used: HashSet<String>,
}

impl PassportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_used(&self, passport_id: &str) -> bool {
        self.used.contains(passport_id)
    }

    /// Validate an optional passport ID against the format rules and the claimed set,
    /// without claiming it.
    pub fn check(&self, passport_id: Option<&str>) -> ShellResult<()> {
        if let Some(id) = passport_id {
            check_passport_format(id)?;
            check(!self.is_used(id), "! argument passportID must be unique !")?;
        }
        Ok(())
    }

    /// Validate and claim. A `None` ID is always accepted and claims nothing.
    pub fn claim(&mut self, passport_id: Option<&str>) -> ShellResult<()> {
        self.check(passport_id)?;
        if let Some(id) = passport_id {
            self.used.insert(id.to_string());
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_checks() {
        assert!(check_key(1).is_ok());
        assert!(check_key(0).is_err());
        assert!(check_movie_name("").is_err());
        assert!(check_oscars_count(0).is_err());
        assert!(check_oscars_count(1).is_ok());
        assert!(check_weight(None).is_ok());
        assert!(check_weight(Some(-3)).is_err());
    }

    #[test]
    fn test_parse_int_rejects_garbage() {
        assert_eq!(parse_int(" 42 ").unwrap(), 42);
        assert!(matches!(parse_int("4x"), Err(ShellError::NotAnInteger)));
        assert!(matches!(parse_long(""), Err(ShellError::NotAnInteger)));
    }

    #[test]
    fn test_passport_length_bounds() {
        assert!(check_passport_format("ABC123").is_err());
        assert!(check_passport_format("ABC1234").is_ok());
        assert!(check_passport_format(&"A".repeat(32)).is_ok());
        assert!(check_passport_format(&"A".repeat(33)).is_err());
    }

    #[test]
    fn test_registry_rejects_reuse() {
        let mut registry = PassportRegistry::new();
        registry.claim(Some("ABC1234")).unwrap();
        registry.claim(None).unwrap();

        let err = registry.claim(Some("ABC1234")).unwrap_err();
        assert_eq!(err.to_string(), "! argument passportID must be unique !");
        assert!(registry.is_used("ABC1234"));
        assert!(!registry.is_used("XYZ9876"));
    }
}
