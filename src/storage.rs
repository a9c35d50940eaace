//! Whole-file persistence of the collection as XML.

use crate::error::{ShellError, ShellResult};
use crate::model::{Coordinates, Movie, MovieFields, Person, PersonFields};
use crate::store::MovieStore;
use crate::validate::PassportRegistry;
use chrono::{DateTime, FixedOffset, Local, NaiveDateTime};
use quick_xml::se::Serializer;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Where the collection is loaded from at startup and written to on `save`.
pub trait CollectionStorage {
    /// Read the whole collection. Every passport ID found is claimed in `passports`.
    fn load(&self, passports: &mut PassportRegistry) -> ShellResult<MovieStore>;

    /// Overwrite the stored collection with `store`.
    fn save(&self, store: &MovieStore) -> ShellResult<()>;
}

/// XML file storage.
#[derive(Debug, Clone)]
pub struct XmlFileStorage {
    path: PathBuf,
}

impl XmlFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn access_error(&self, err: io::Error) -> ShellError {
        ShellError::file_access(&self.path, err, |_, err| ShellError::Io(err))
    }

    fn save_error(&self, source: io::Error) -> ShellError {
        warn!(path = %self.path.display(), %source, "save failed");
        ShellError::SaveFailed {
            path: self.path.clone(),
            source,
        }
    }
}

impl CollectionStorage for XmlFileStorage {
    fn load(&self, passports: &mut PassportRegistry) -> ShellResult<MovieStore> {
        let contents = fs::read_to_string(&self.path).map_err(|err| self.access_error(err))?;
        if contents.trim().is_empty() {
            info!(path = %self.path.display(), "collection file is empty, starting fresh");
            return Ok(MovieStore::new(Local::now().fixed_offset()));
        }
        decode(&contents, passports)
    }

    fn save(&self, store: &MovieStore) -> ShellResult<()> {
        // A missing file is never created.
        OpenOptions::new()
            .write(true)
            .open(&self.path)
            .map_err(|err| self.access_error(err))?;
        let xml = encode(store).map_err(|err| self.save_error(err))?;
        fs::write(&self.path, xml).map_err(|err| self.save_error(err))?;
        info!(path = %self.path.display(), elements = store.len(), "collection saved");
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "movieCollection")]
struct CollectionDoc {
    #[serde(rename = "@creationDate")]
    creation_date: DateTime<FixedOffset>,
    #[serde(rename = "movie", default)]
    movies: Vec<MovieDoc>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MovieDoc {
    id: i32,
    name: String,
    coordinates: CoordinatesDoc,
    creation_date: DateTime<FixedOffset>,
    oscars_count: i64,
    genre: String,
    mpaa_rating: String,
    director: DirectorDoc,
}

#[derive(Debug, Serialize, Deserialize)]
struct CoordinatesDoc {
    x: i32,
    y: i32,
}

/// Absent weight and passport are kept as empty elements.
#[derive(Debug, Serialize, Deserialize)]
struct DirectorDoc {
    name: String,
    birthday: NaiveDateTime,
    #[serde(default)]
    weight: String,
    #[serde(rename = "passportID", default)]
    passport_id: String,
}

impl From<&Movie> for MovieDoc {
    fn from(movie: &Movie) -> Self {
        let director = movie.director();
        Self {
            id: movie.id(),
            name: movie.name().to_string(),
            coordinates: CoordinatesDoc {
                x: movie.coordinates().x,
                y: movie.coordinates().y,
            },
            creation_date: movie.creation_date(),
            oscars_count: movie.oscars_count(),
            genre: movie.genre().as_str().to_string(),
            mpaa_rating: movie.mpaa_rating().as_str().to_string(),
            director: DirectorDoc {
                name: director.name().to_string(),
                birthday: director.birthday(),
                weight: director.weight().map(|w| w.to_string()).unwrap_or_default(),
                passport_id: director.passport_id().unwrap_or_default().to_string(),
            },
        }
    }
}

impl MovieDoc {
    /// Rebuild the record through the validating constructors, claiming its passport ID.
    fn into_movie(self, passports: &mut PassportRegistry) -> ShellResult<Movie> {
        let weight = match self.director.weight.trim() {
            "" => None,
            text => Some(
                text.parse()
                    .map_err(|_| invalid(format!("weight is not an integer: '{text}'")))?,
            ),
        };
        let passport_id = Some(self.director.passport_id.trim())
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        let person = Person::new(
            PersonFields {
                name: self.director.name,
                birthday: self.director.birthday,
                weight,
                passport_id,
            },
            passports,
        )
        .map_err(as_file_error)?;

        let fields = MovieFields {
            name: self.name,
            coordinates: Coordinates {
                x: self.coordinates.x,
                y: self.coordinates.y,
            },
            oscars_count: self.oscars_count,
            genre: self.genre.parse().map_err(as_file_error)?,
            mpaa_rating: self.mpaa_rating.parse().map_err(as_file_error)?,
        };
        Movie::restore(self.id, self.creation_date, fields, person).map_err(as_file_error)
    }
}

/// Render the whole collection as an XML document.
pub fn encode(store: &MovieStore) -> io::Result<String> {
    let doc = CollectionDoc {
        creation_date: store.creation_date(),
        movies: store.iter().map(|(_, movie)| MovieDoc::from(movie)).collect(),
    };
    let mut xml = String::from(XML_DECLARATION);
    let mut serializer = Serializer::new(&mut xml);
    serializer.indent(' ', 4);
    doc.serialize(serializer)
        .map_err(|err| io::Error::other(err.to_string()))?;
    Ok(xml)
}

/// Parse a document produced by [`encode`], rebuilding every record through the validating
/// constructors.
pub fn decode(xml: &str, passports: &mut PassportRegistry) -> ShellResult<MovieStore> {
    let doc: CollectionDoc =
        quick_xml::de::from_str(xml).map_err(|err| invalid(format!("malformed xml: {err}")))?;
    let mut store = MovieStore::new(doc.creation_date);
    for movie in doc.movies {
        let movie = movie.into_movie(passports)?;
        if store.contains_key(movie.id()) {
            return Err(invalid("movie id must be unique"));
        }
        store.put(movie.id(), movie);
    }
    Ok(store)
}

fn invalid(message: impl Into<String>) -> ShellError {
    ShellError::InvalidFileData(message.into())
}

fn as_file_error(err: ShellError) -> ShellError {
    match err {
        ShellError::InvalidFileData(_) => err,
        other => invalid(other.to_string().trim_matches('!').trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MpaaRating;
    use crate::model::tests::draft;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<movieCollection creationDate="2023-03-01T12:30:00+03:00">
    <movie>
        <id>4</id>
        <name>Tom &amp; Jerry</name>
        <coordinates><x>-1</x><y>7</y></coordinates>
        <creationDate>2023-03-01T12:31:00.5+03:00</creationDate>
        <oscarsCount>2</oscarsCount>
        <genre>MUSICAL</genre>
        <mpaaRating>PG_13</mpaaRating>
        <director>
            <name>Fred</name>
            <birthday>1970-05-04T00:00:00</birthday>
            <weight/>
            <passportID/>
        </director>
    </movie>
</movieCollection>"#;

    #[test]
    fn test_decode_sample_document() {
        let mut passports = PassportRegistry::new();
        let store = decode(SAMPLE, &mut passports).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.creation_date().to_rfc3339(), "2023-03-01T12:30:00+03:00");
        let movie = store.get(4).unwrap();
        assert_eq!(movie.name(), "Tom & Jerry");
        assert_eq!(movie.coordinates(), Coordinates { x: -1, y: 7 });
        assert_eq!(movie.mpaa_rating(), MpaaRating::Pg13);
        assert_eq!(movie.director().weight(), None);
        assert_eq!(movie.director().passport_id(), None);
        assert!(passports.is_empty());
    }

    #[test]
    fn test_saved_file_loads_back() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let storage = XmlFileStorage::new(file.path());
        let mut passports = PassportRegistry::new();
        let mut store = MovieStore::default();
        store.put(
            1,
            draft("<Nomad>", 3, Some("ABC1234"))
                .build(1, &mut passports)
                .unwrap(),
        );
        store.put(2, draft("Second", 8, None).build(2, &mut passports).unwrap());

        storage.save(&store).unwrap();
        let loaded = storage.load(&mut PassportRegistry::new()).unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get(1), store.get(1));
        assert_eq!(loaded.get(2), store.get(2));
        assert_eq!(
            loaded.creation_date().timestamp(),
            store.creation_date().timestamp()
        );
    }

    #[test]
    fn test_absent_optionals_are_written_as_empty_elements() {
        let mut passports = PassportRegistry::new();
        let mut movie = draft("Plain", 1, None);
        movie.director.weight = None;
        let mut store = MovieStore::default();
        store.put(7, movie.build(7, &mut passports).unwrap());

        let xml = encode(&store).unwrap();

        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<movieCollection creationDate="));
        assert!(xml.contains("<weight"));
        assert!(xml.contains("<passportID"));
        assert!(!xml.contains("ABC"));
        let reloaded = decode(&xml, &mut PassportRegistry::new()).unwrap();
        assert_eq!(reloaded.get(7).unwrap().director().weight(), None);
        assert_eq!(reloaded.get(7).unwrap().director().passport_id(), None);
    }

    #[test]
    fn test_empty_collection_round_trips() {
        let store = MovieStore::default();
        let reloaded = decode(&encode(&store).unwrap(), &mut PassportRegistry::new()).unwrap();
        assert!(reloaded.is_empty());
        assert_eq!(reloaded.creation_date(), store.creation_date());
    }

    #[test]
    fn test_empty_file_gives_empty_store() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let store = XmlFileStorage::new(file.path())
            .load(&mut PassportRegistry::new())
            .unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = XmlFileStorage::new(dir.path().join("absent.xml"));

        assert!(matches!(
            storage.load(&mut PassportRegistry::new()),
            Err(ShellError::FileNotFound(_))
        ));
        assert!(matches!(
            storage.save(&MovieStore::default()),
            Err(ShellError::FileNotFound(_))
        ));
        assert!(!dir.path().join("absent.xml").exists());
    }

    #[test]
    fn test_malformed_documents_are_rejected() {
        let cases = [
            "<movieCollection creationDate=\"2023-03-01T12:30:00Z\"><movie>".to_string(),
            "<library/>".to_string(),
            "<movieCollection/>".to_string(),
            SAMPLE.replace("<oscarsCount>2</oscarsCount>", "<oscarsCount>0</oscarsCount>"),
            SAMPLE.replace("<genre>MUSICAL</genre>", "<genre>OPERA</genre>"),
            SAMPLE.replace("<id>4</id>", "<id>four</id>"),
        ];
        for case in &cases {
            let err = decode(case, &mut PassportRegistry::new()).unwrap_err();
            assert!(
                matches!(err, ShellError::InvalidFileData(_)),
                "accepted: {case}"
            );
            assert!(err.is_fatal());
        }
    }

    #[test]
    fn test_duplicate_ids_and_passports_are_rejected() {
        let movie = SAMPLE
            .split_once("<movie>")
            .and_then(|(_, rest)| rest.split_once("</movie>"))
            .map(|(body, _)| format!("<movie>{body}</movie>"))
            .unwrap();
        let doubled = SAMPLE.replace("</movieCollection>", &format!("{movie}</movieCollection>"));
        let err = decode(&doubled, &mut PassportRegistry::new()).unwrap_err();
        assert_eq!(err.to_string(), "! invalid file data: movie id must be unique !");

        let with_passport = SAMPLE.replace("<passportID/>", "<passportID>ABC1234</passportID>");
        let other = with_passport.replace("<id>4</id>", "<id>5</id>");
        let second = other
            .split_once("<movie>")
            .and_then(|(_, rest)| rest.split_once("</movie>"))
            .map(|(body, _)| format!("<movie>{body}</movie>"))
            .unwrap();
        let both =
            with_passport.replace("</movieCollection>", &format!("{second}</movieCollection>"));
        let err = decode(&both, &mut PassportRegistry::new()).unwrap_err();
        assert!(err.to_string().contains("passportID must be unique"));
    }
}
