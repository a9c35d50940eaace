//! Field-by-field entry of a movie for the data-entry commands.

use crate::command::ExecutionMode;
use crate::error::{ShellError, ShellResult};
use crate::model::{
    self, Coordinates, MovieDraft, MovieFields, MovieGenre, MpaaRating, PersonFields,
};
use crate::source::LineSource;
use crate::validate::{self, PassportRegistry};
use std::io::Write;

/// Reads the ten fields of a movie, in a fixed order, from a [`LineSource`].
///
/// An invalid value is reported and asked for again in interactive mode. In script mode the
/// first invalid value aborts the whole record with [`ShellError::InvalidScript`].
pub struct FieldPrompter<'a> {
    input: &'a mut dyn LineSource,
    out: &'a mut dyn Write,
    passports: &'a PassportRegistry,
    mode: ExecutionMode,
}

impl<'a> FieldPrompter<'a> {
    pub fn new(
        input: &'a mut dyn LineSource,
        out: &'a mut dyn Write,
        passports: &'a PassportRegistry,
        mode: ExecutionMode,
    ) -> Self {
        Self {
            input,
            out,
            passports,
            mode,
        }
    }

    pub fn read_draft(&mut self) -> ShellResult<MovieDraft> {
        let name = self.read_field("Enter movie name", |s, _| {
            validate::check_movie_name(s)?;
            Ok(s.to_string())
        })?;
        let x = self.read_field("Enter X coordinate", |s, _| validate::parse_int(s))?;
        let y = self.read_field("Enter Y coordinate", |s, _| validate::parse_int(s))?;
        let oscars_count = self.read_field("Enter oscars count", |s, _| {
            let count = validate::parse_long(s)?;
            validate::check_oscars_count(count)?;
            Ok(count)
        })?;
        let genre = self.read_field(&choice_prompt("Enter movie genre", &MovieGenre::ALL), |s, _| {
            s.parse::<MovieGenre>()
        })?;
        let mpaa_rating = self
            .read_field(&choice_prompt("Enter MPAA rating", &MpaaRating::ALL), |s, _| {
                s.parse::<MpaaRating>()
            })?;
        let director_name = self.read_field("Enter director name", |s, _| {
            validate::check_person_name(s)?;
            Ok(s.to_string())
        })?;
        let birthday = self.read_field(
            "Enter director birthday in DD.MM.YYYY format",
            |s, _| model::parse_birthday(s),
        )?;
        let weight = self.read_field("Enter director weight", |s, _| {
            let weight = optional(s).map(validate::parse_int).transpose()?;
            validate::check_weight(weight)?;
            Ok(weight)
        })?;
        let passport_id = self.read_field("Enter director passport ID", |s, passports| {
            let passport_id = optional(s);
            passports.check(passport_id)?;
            Ok(passport_id.map(str::to_string))
        })?;

        Ok(MovieDraft {
            movie: MovieFields {
                name,
                coordinates: Coordinates { x, y },
                oscars_count,
                genre,
                mpaa_rating,
            },
            director: PersonFields {
                name: director_name,
                birthday,
                weight,
                passport_id,
            },
        })
    }

    fn read_field<T>(
        &mut self,
        prompt: &str,
        parse: impl Fn(&str, &PassportRegistry) -> ShellResult<T>,
    ) -> ShellResult<T> {
        loop {
            let line = self.input.read_prompted(prompt)?;
            let err = match parse(line.trim(), self.passports) {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            match &self.mode {
                ExecutionMode::Script(path) => {
                    return Err(ShellError::InvalidScript {
                        path: path.display().to_string(),
                        line,
                        message: err.to_string(),
                    });
                }
                ExecutionMode::Interactive => writeln!(self.out, "{err}")?,
            }
        }
    }
}

fn optional(s: &str) -> Option<&str> {
    if s.is_empty() { None } else { Some(s) }
}

fn choice_prompt<T: std::fmt::Display>(message: &str, choices: &[T]) -> String {
    let choices: Vec<String> = choices.iter().map(ToString::to_string).collect();
    format!("{message} ({})", choices.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io_adapters::MemorySource;
    use std::path::PathBuf;

    const NOMAD: [&str; 10] = [
        "Nomad", "1", "2", "3", "drama", "PG", "Jane", "01.01.1980", "60", "ABC1234",
    ];

    fn read(
        lines: Vec<&str>,
        mode: ExecutionMode,
        passports: &PassportRegistry,
    ) -> (ShellResult<MovieDraft>, String, usize) {
        let mut input = MemorySource::new(lines);
        let mut out = Vec::new();
        let result = FieldPrompter::new(&mut input, &mut out, passports, mode).read_draft();
        (result, String::from_utf8(out).unwrap(), input.remaining())
    }

    #[test]
    fn test_reads_fields_in_order() {
        let (draft, out, remaining) =
            read(NOMAD.to_vec(), ExecutionMode::Interactive, &PassportRegistry::new());
        let draft = draft.unwrap();

        assert_eq!(draft.movie.name, "Nomad");
        assert_eq!(draft.movie.coordinates, Coordinates { x: 1, y: 2 });
        assert_eq!(draft.movie.oscars_count, 3);
        assert_eq!(draft.movie.genre, MovieGenre::Drama);
        assert_eq!(draft.movie.mpaa_rating, MpaaRating::Pg);
        assert_eq!(draft.director.name, "Jane");
        assert_eq!(draft.director.weight, Some(60));
        assert_eq!(draft.director.passport_id.as_deref(), Some("ABC1234"));
        assert!(out.is_empty());
        assert_eq!(remaining, 0);
    }

    #[test]
    fn test_interactive_reprompts_invalid_field() {
        let mut lines = NOMAD.to_vec();
        lines.splice(3..3, ["zero", "0"]);

        let (draft, out, _) = read(lines, ExecutionMode::Interactive, &PassportRegistry::new());

        assert_eq!(draft.unwrap().movie.oscars_count, 3);
        assert_eq!(
            out,
            "! not an integer !\n! argument oscarsCount cannot be <= 0 !\n"
        );
    }

    #[test]
    fn test_script_aborts_on_invalid_field() {
        let mut lines = NOMAD.to_vec();
        lines[1] = "left";

        let (draft, _, remaining) = read(
            lines,
            ExecutionMode::Script(PathBuf::from("load.txt")),
            &PassportRegistry::new(),
        );

        match draft.unwrap_err() {
            ShellError::InvalidScript {
                path,
                line,
                message,
            } => {
                assert_eq!(path, "load.txt");
                assert_eq!(line, "left");
                assert_eq!(message, "! not an integer !");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(remaining, 8);
    }

    #[test]
    fn test_blank_weight_and_passport_are_absent() {
        let mut lines = NOMAD.to_vec();
        lines[8] = "";
        lines[9] = "   ";

        let (draft, _, _) = read(lines, ExecutionMode::Interactive, &PassportRegistry::new());
        let draft = draft.unwrap();
        assert_eq!(draft.director.weight, None);
        assert_eq!(draft.director.passport_id, None);
    }

    #[test]
    fn test_used_passport_is_rejected() {
        let mut passports = PassportRegistry::new();
        passports.claim(Some("ABC1234")).unwrap();

        let mut lines = NOMAD.to_vec();
        lines.push("XYZ98765");
        let (draft, out, _) = read(lines, ExecutionMode::Interactive, &passports);

        assert_eq!(draft.unwrap().director.passport_id.as_deref(), Some("XYZ98765"));
        assert!(out.contains("must be unique"));
    }
}
