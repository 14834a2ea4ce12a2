//! House ads. The ad file is a JSON object with an `ads` list; a post carries
//! at most one ad, always the first in the list.

use serde::Deserialize;
use std::fmt;
use std::io;
use std::path::Path;

/// A single house ad, rendered as a blockquote line in a post.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Ad {
    pub label: String,
    pub disclosure: String,
    pub url: String,
}

#[derive(Deserialize)]
struct AdFile {
    #[serde(default)]
    ads: Vec<Ad>,
}

/// Loads the ad list from `path`. A missing file is not an error: it yields
/// an empty list. An unreadable or malformed file is an error so the caller
/// can report it before carrying on without ads.
pub fn load_ads(path: &Path) -> Result<Vec<Ad>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::Io(e)),
    };
    let file: AdFile = serde_json::from_str(&contents)?;
    Ok(file.ads)
}

/// Picks the ad for today's post.
pub fn pick_ad(ads: &[Ad]) -> Option<&Ad> {
    ads.first()
}

/// The result of loading the ad file.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem reading the ad file.
#[derive(Debug)]
pub enum Error {
    /// Returned when the file exists but can't be read.
    Io(io::Error),

    /// Returned when the file isn't the expected JSON shape.
    DeserializeJson(serde_json::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "reading ad file: {}", err),
            Error::DeserializeJson(err) => write!(f, "parsing ad file: {}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::DeserializeJson(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for Error {
    /// Converts a [`serde_json::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for JSON deserialization.
    fn from(err: serde_json::Error) -> Error {
        Error::DeserializeJson(err)
    }
}
