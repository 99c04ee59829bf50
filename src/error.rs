use std::path::PathBuf;
use thiserror::Error;

/// Failure to obtain XML content from a source.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request for {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("could not read {}: {}", .path.display(), .source)]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid source URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Any failure while extracting links from a source.
///
/// Callers that go through [`crate::extract_links`] never see this type; the
/// boundary there converts every failure into an empty result. The `try_`
/// variants surface it for callers that need to tell the cases apart.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("malformed XML: {0}")]
    Parse(#[from] roxmltree::Error),
}
