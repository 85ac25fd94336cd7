use thiserror::Error;

use crate::io_utils::ParseError;

/// Failure while turning a CSV location into rows.
///
/// `Fetch`, `EmptyBody` and `Decode` form the fetch family; `Parse` is raised
/// once a body is in hand but is not well-formed CSV, including a quoted
/// field that never closes.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Fetching {location}: {reason}")]
    Fetch { location: String, reason: String },
    #[error("Fetching {location}: response body is empty")]
    EmptyBody { location: String },
    #[error("Decoding {location} as {encoding}")]
    Decode {
        location: String,
        encoding: &'static str,
    },
    #[error("Parsing {location}: {source}")]
    Parse {
        location: String,
        #[source]
        source: ParseError,
    },
}

impl LoadError {
    pub fn is_fetch(&self) -> bool {
        !matches!(self, LoadError::Parse { .. })
    }
}
