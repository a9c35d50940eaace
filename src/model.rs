//! The records kept by the shell: movies and their directors.
//!
//! Records can only be obtained through validating constructors, so a value of [`Movie`] or
//! [`Person`] always satisfies the field rules in [`crate::validate`].

use crate::error::{ShellError, ShellResult};
use crate::validate::{self, PassportRegistry};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime};
use std::fmt;
use std::str::FromStr;

/// Format used when a director's birthday is typed in.
pub const BIRTHDAY_INPUT_FORMAT: &str = "%d.%m.%Y";
/// Format used when a timestamp is shown to the user.
pub const DISPLAY_DATE_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coordinates {
    pub x: i32,
    pub y: i32,
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovieGenre {
    Western,
    Drama,
    Musical,
    Adventure,
    ScienceFiction,
}

impl MovieGenre {
    pub const ALL: [MovieGenre; 5] = [
        MovieGenre::Western,
        MovieGenre::Drama,
        MovieGenre::Musical,
        MovieGenre::Adventure,
        MovieGenre::ScienceFiction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MovieGenre::Western => "WESTERN",
            MovieGenre::Drama => "DRAMA",
            MovieGenre::Musical => "MUSICAL",
            MovieGenre::Adventure => "ADVENTURE",
            MovieGenre::ScienceFiction => "SCIENCE_FICTION",
        }
    }
}

impl fmt::Display for MovieGenre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovieGenre {
    type Err = ShellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|genre| genre.as_str() == token)
            .ok_or_else(|| ShellError::invalid("! wrong movie genre !"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpaaRating {
    G,
    Pg,
    Pg13,
    R,
    Nc17,
}

impl MpaaRating {
    pub const ALL: [MpaaRating; 5] = [
        MpaaRating::G,
        MpaaRating::Pg,
        MpaaRating::Pg13,
        MpaaRating::R,
        MpaaRating::Nc17,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MpaaRating::G => "G",
            MpaaRating::Pg => "PG",
            MpaaRating::Pg13 => "PG_13",
            MpaaRating::R => "R",
            MpaaRating::Nc17 => "NC_17",
        }
    }
}

impl fmt::Display for MpaaRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MpaaRating {
    type Err = ShellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|rating| rating.as_str() == token)
            .ok_or_else(|| ShellError::invalid("! wrong MPAA rating !"))
    }
}

/// Parse a birthday typed as `DD.MM.YYYY`; the result is midnight of that day.
pub fn parse_birthday(input: &str) -> ShellResult<NaiveDateTime> {
    NaiveDate::parse_from_str(input.trim(), BIRTHDAY_INPUT_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| ShellError::invalid("! wrong date format !"))
}

/// Raw user-editable fields of a director, not yet validated.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonFields {
    pub name: String,
    pub birthday: NaiveDateTime,
    pub weight: Option<i32>,
    pub passport_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    name: String,
    birthday: NaiveDateTime,
    weight: Option<i32>,
    passport_id: Option<String>,
}

impl Person {
    /// Validate the fields and claim the passport ID in `passports`.
    ///
    /// Nothing is claimed when any field is invalid.
    pub fn new(fields: PersonFields, passports: &mut PassportRegistry) -> ShellResult<Self> {
        validate::check_person_name(&fields.name)?;
        validate::check_weight(fields.weight)?;
        passports.claim(fields.passport_id.as_deref())?;
        Ok(Self {
            name: fields.name,
            birthday: fields.birthday,
            weight: fields.weight,
            passport_id: fields.passport_id,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn birthday(&self) -> NaiveDateTime {
        self.birthday
    }

    pub fn weight(&self) -> Option<i32> {
        self.weight
    }

    pub fn passport_id(&self) -> Option<&str> {
        self.passport_id.as_deref()
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (born {}", self.name, self.birthday.format("%d.%m.%Y"))?;
        if let Some(weight) = self.weight {
            write!(f, ", weight {weight}")?;
        }
        if let Some(passport_id) = &self.passport_id {
            write!(f, ", passport {passport_id}")?;
        }
        f.write_str(")")
    }
}

/// Raw user-editable fields of a movie, not yet validated.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieFields {
    pub name: String,
    pub coordinates: Coordinates,
    pub oscars_count: i64,
    pub genre: MovieGenre,
    pub mpaa_rating: MpaaRating,
}

/// Everything the field prompts collect for one movie.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieDraft {
    pub movie: MovieFields,
    pub director: PersonFields,
}

impl MovieDraft {
    /// Build a fresh record stamped with the current time.
    pub fn build(self, id: i32, passports: &mut PassportRegistry) -> ShellResult<Movie> {
        Movie::check_id(id)?;
        self.build_with(id, passports)
    }

    /// Build a record that is only compared against and never stored; its id is 0.
    pub fn build_reference(self, passports: &mut PassportRegistry) -> ShellResult<Movie> {
        self.build_with(0, passports)
    }

    fn build_with(self, id: i32, passports: &mut PassportRegistry) -> ShellResult<Movie> {
        Movie::check_fields(&self.movie)?;
        let director = Person::new(self.director, passports)?;
        Ok(Movie::assemble(id, Local::now().fixed_offset(), self.movie, director))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    id: i32,
    name: String,
    coordinates: Coordinates,
    creation_date: DateTime<FixedOffset>,
    oscars_count: i64,
    genre: MovieGenre,
    mpaa_rating: MpaaRating,
    director: Person,
}

impl Movie {
    /// Rebuild a record whose identity and timestamp were persisted earlier.
    pub fn restore(
        id: i32,
        creation_date: DateTime<FixedOffset>,
        fields: MovieFields,
        director: Person,
    ) -> ShellResult<Self> {
        Self::check_id(id)?;
        Self::check_fields(&fields)?;
        Ok(Self::assemble(id, creation_date, fields, director))
    }

    fn check_id(id: i32) -> ShellResult<()> {
        if id <= 0 {
            return Err(ShellError::invalid("! argument id cannot be <= 0 !"));
        }
        Ok(())
    }

    fn check_fields(fields: &MovieFields) -> ShellResult<()> {
        validate::check_movie_name(&fields.name)?;
        validate::check_oscars_count(fields.oscars_count)
    }

    fn assemble(
        id: i32,
        creation_date: DateTime<FixedOffset>,
        fields: MovieFields,
        director: Person,
    ) -> Self {
        Self {
            id,
            name: fields.name,
            coordinates: fields.coordinates,
            creation_date,
            oscars_count: fields.oscars_count,
            genre: fields.genre,
            mpaa_rating: fields.mpaa_rating,
            director,
        }
    }

    /// Replace every user-editable field, keeping id and creation timestamp.
    pub fn update(
        &mut self,
        draft: MovieDraft,
        passports: &mut PassportRegistry,
    ) -> ShellResult<()> {
        Self::check_fields(&draft.movie)?;
        let director = Person::new(draft.director, passports)?;
        let fields = draft.movie;
        self.name = fields.name;
        self.coordinates = fields.coordinates;
        self.oscars_count = fields.oscars_count;
        self.genre = fields.genre;
        self.mpaa_rating = fields.mpaa_rating;
        self.director = director;
        Ok(())
    }

    pub(crate) fn with_id(mut self, id: i32) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    pub fn creation_date(&self) -> DateTime<FixedOffset> {
        self.creation_date
    }

    /// The sole ordering key of the collection.
    pub fn oscars_count(&self) -> i64 {
        self.oscars_count
    }

    pub fn genre(&self) -> MovieGenre {
        self.genre
    }

    pub fn mpaa_rating(&self) -> MpaaRating {
        self.mpaa_rating
    }

    pub fn director(&self) -> &Person {
        &self.director
    }
}

impl fmt::Display for Movie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} \"{}\" at {}, {} oscars, {}, {}, created {}, directed by {}",
            self.id,
            self.name,
            self.coordinates,
            self.oscars_count,
            self.genre,
            self.mpaa_rating,
            self.creation_date.format(DISPLAY_DATE_FORMAT),
            self.director
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn draft(name: &str, oscars_count: i64, passport_id: Option<&str>) -> MovieDraft {
        MovieDraft {
            movie: MovieFields {
                name: name.to_string(),
                coordinates: Coordinates { x: 1, y: 2 },
                oscars_count,
                genre: MovieGenre::Drama,
                mpaa_rating: MpaaRating::Pg,
            },
            director: PersonFields {
                name: "Jane".to_string(),
                birthday: parse_birthday("01.01.1980").unwrap(),
                weight: Some(60),
                passport_id: passport_id.map(str::to_string),
            },
        }
    }

    #[test]
    fn test_enum_tokens_are_case_insensitive() {
        assert_eq!("drama".parse::<MovieGenre>().unwrap(), MovieGenre::Drama);
        assert_eq!(
            "Science_Fiction".parse::<MovieGenre>().unwrap(),
            MovieGenre::ScienceFiction
        );
        assert_eq!("pg_13".parse::<MpaaRating>().unwrap(), MpaaRating::Pg13);
        assert!("horror".parse::<MovieGenre>().is_err());
        assert_eq!(MpaaRating::Nc17.to_string(), "NC_17");
    }

    #[test]
    fn test_parse_birthday() {
        let birthday = parse_birthday("01.02.1980").unwrap();
        assert_eq!(birthday.to_string(), "1980-02-01 00:00:00");
        assert!(parse_birthday("1980-02-01").is_err());
        assert!(parse_birthday("31.02.1980").is_err());
    }

    #[test]
    fn test_build_assigns_id_and_claims_passport() {
        let mut passports = PassportRegistry::new();
        let movie = draft("Nomad", 3, Some("ABC1234"))
            .build(7, &mut passports)
            .unwrap();

        assert_eq!(movie.id(), 7);
        assert_eq!(movie.oscars_count(), 3);
        assert_eq!(movie.director().passport_id(), Some("ABC1234"));
        assert!(passports.is_used("ABC1234"));
    }

    #[test]
    fn test_invalid_movie_claims_nothing() {
        let mut passports = PassportRegistry::new();
        let err = draft("Nomad", 0, Some("ABC1234"))
            .build(1, &mut passports)
            .unwrap_err();

        assert_eq!(err.to_string(), "! argument oscarsCount cannot be <= 0 !");
        assert!(passports.is_empty());
    }

    #[test]
    fn test_passport_ids_unique_across_people() {
        let mut passports = PassportRegistry::new();
        draft("One", 1, Some("ABC1234"))
            .build(1, &mut passports)
            .unwrap();
        let err = draft("Two", 1, Some("ABC1234"))
            .build(2, &mut passports)
            .unwrap_err();
        assert_eq!(err.to_string(), "! argument passportID must be unique !");
    }

    #[test]
    fn test_update_keeps_identity() {
        let mut passports = PassportRegistry::new();
        let mut movie = draft("Old", 1, None).build(4, &mut passports).unwrap();
        let created = movie.creation_date();

        movie.update(draft("New", 9, None), &mut passports).unwrap();

        assert_eq!(movie.id(), 4);
        assert_eq!(movie.name(), "New");
        assert_eq!(movie.oscars_count(), 9);
        assert_eq!(movie.creation_date(), created);
    }
}
