//! Locating and loading CSV resources.
//!
//! A location is either an absolute `http(s)` URL, a path relative to a base
//! URL, or a filesystem path relative to a base directory. Every load reads
//! the full body as bytes, rejects empty bodies, decodes explicitly, and
//! hands the text to the CSV reader.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use encoding_rs::{Encoding, UTF_8};
use log::{debug, info};
use reqwest::{Url, blocking::Client};

use crate::{
    dataset::{Dataset, RawRow},
    error::LoadError,
    io_utils,
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(Url),
    Path(PathBuf),
}

impl Source {
    /// Resolves `location` against an optional base. Absolute URLs and
    /// absolute paths ignore the base.
    pub fn resolve(location: &str, base: Option<&Base>) -> Result<Self, LoadError> {
        let location = location.trim();
        if is_remote(location) {
            return Url::parse(location)
                .map(Source::Url)
                .map_err(|err| fetch_error(location, err));
        }
        match base {
            Some(Base::Url(url)) => url
                .join(location)
                .map(Source::Url)
                .map_err(|err| fetch_error(location, err)),
            Some(Base::Dir(dir)) if Path::new(location).is_relative() => {
                Ok(Source::Path(dir.join(location)))
            }
            _ => Ok(Source::Path(PathBuf::from(location))),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Source::Url(_))
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Url(url) => write!(f, "{url}"),
            Source::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Where relative locations are resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Base {
    Url(Url),
    Dir(PathBuf),
}

impl Base {
    pub fn parse(value: &str) -> Result<Self, LoadError> {
        let value = value.trim();
        if is_remote(value) {
            let with_slash = if value.ends_with('/') {
                value.to_string()
            } else {
                format!("{value}/")
            };
            Url::parse(&with_slash)
                .map(Base::Url)
                .map_err(|err| fetch_error(value, err))
        } else {
            Ok(Base::Dir(PathBuf::from(value)))
        }
    }
}

fn is_remote(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn fetch_error(location: &str, reason: impl fmt::Display) -> LoadError {
    LoadError::Fetch {
        location: location.to_string(),
        reason: reason.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct Loader {
    client: Client,
    encoding: &'static Encoding,
}

impl Loader {
    pub fn new(timeout: Duration) -> Result<Self, LoadError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| fetch_error("http client", err))?;
        Ok(Self {
            client,
            encoding: UTF_8,
        })
    }

    /// Overrides the text encoding used for local files. Remote bodies are
    /// always decoded as UTF-8.
    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn fetch_bytes(&self, source: &Source) -> Result<Vec<u8>, LoadError> {
        let location = source.to_string();
        let bytes = match source {
            Source::Url(url) => {
                let response = self
                    .client
                    .get(url.clone())
                    .send()
                    .map_err(|err| fetch_error(&location, err))?;
                let status = response.status();
                if !status.is_success() {
                    return Err(fetch_error(&location, format!("HTTP status {status}")));
                }
                response
                    .bytes()
                    .map_err(|err| fetch_error(&location, err))?
                    .to_vec()
            }
            Source::Path(path) => fs::read(path).map_err(|err| fetch_error(&location, err))?,
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(LoadError::EmptyBody { location });
        }
        debug!("Fetched {} byte(s) from {location}", bytes.len());
        Ok(bytes)
    }

    pub fn load_rows(&self, source: &Source) -> Result<Vec<RawRow>, LoadError> {
        let bytes = self.fetch_bytes(source)?;
        let encoding = if source.is_remote() {
            UTF_8
        } else {
            self.encoding
        };
        let location = source.to_string();
        let text = io_utils::decode_bytes(&bytes, encoding).ok_or_else(|| LoadError::Decode {
            location: location.clone(),
            encoding: encoding.name(),
        })?;
        io_utils::parse_rows(&text, io_utils::DEFAULT_CSV_DELIMITER)
            .map_err(|source| LoadError::Parse { location, source })
    }

    pub fn load(&self, source: &Source) -> Result<Dataset, LoadError> {
        let rows = self.load_rows(source)?;
        let dataset = Dataset::from_rows(&rows);
        info!(
            "Loaded {} row(s) across {} column(s) from {source} (delimiter '{}')",
            dataset.row_count(),
            dataset.header().len(),
            io_utils::printable_delimiter(io_utils::DEFAULT_CSV_DELIMITER)
        );
        Ok(dataset)
    }
}
