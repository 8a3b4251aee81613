/// Errors raised by the HTTP transport.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("base URL cannot be extended with a resource path: {0}")]
    InvalidBaseUrl(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },
    #[error("failed to parse response bundle: {0}")]
    Fhir(#[from] fhir::FhirError),
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Errors raised while running patient searches.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(
        "failed to read names file {path}: {source}",
        path = path.display()
    )]
    NamesFileRead {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write search output: {0}")]
    OutputWrite(std::io::Error),
    #[error("search for '{query}' failed: {source}")]
    Transport {
        query: String,
        #[source]
        source: ClientError,
    },
}

pub type SearchResult<T> = std::result::Result<T, SearchError>;
