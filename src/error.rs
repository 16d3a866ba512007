use thiserror::Error;

use crate::nexus::products::{BuildType, Product, RepositoryClass};
use crate::util::fetcher::FetchError;

/// Everything that can go wrong while turning a request into a single artifact.
///
/// The first three variants are detected before any network traffic happens.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("A repository build type can only be one of: {names}, got {0:?}", names = BuildType::names().join(", "))]
    InvalidBuildType(String),

    #[error("A repository type can only be one of: {names}, got {0:?}", names = RepositoryClass::names().join(", "))]
    InvalidRepositoryClass(String),

    #[error("A product can only be one of: {names}, got {0:?}", names = Product::names().join(", "))]
    UnknownProduct(String),

    #[error("not a valid last-modified timestamp: {0:?}")]
    MalformedTimestamp(String),

    #[error("a version number must not be empty")]
    MalformedVersion,

    #[error("not a valid repository listing: {0}")]
    MalformedListing(String),

    #[error("The requested build could not be found at the URL: {uri}")]
    NotFound { uri: String },

    #[error("{message}")]
    Fetch { message: String },

    #[error("{0}")]
    NoArtifactFound(String),
}

/// A 404 becomes 'not found', everything else is passed on verbatim
impl From<FetchError> for ResolveError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::NotFound { uri } => ResolveError::NotFound { uri },
            other => ResolveError::Fetch { message: other.to_string() },
        }
    }
}
