//! Errors of chordal-rpc.

/// A wrap `Result` contains custom errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors enum mapping global custom errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Unknown protocol verb.
    #[error("Invalid method: {0}")]
    InvalidMethod(String),
    /// Unknown url scheme.
    #[error("Invalid protocol: {0}")]
    InvalidProtocol(String),
    /// The target can not be turned into a url.
    #[error("Invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The http client could not be created.
    #[error("Failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
