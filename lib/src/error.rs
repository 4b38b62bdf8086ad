use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Error decoding image
    #[error("Image {path} could not be decoded")]
    ImageError {
        path: String,
        source: image::error::ImageError,
    },
    /// Error writing a debug image
    #[error("Image {path} could not be saved")]
    ImageSaveError {
        path: String,
        source: image::error::ImageError,
    },
    /// Error listing a template folder
    #[error("Template folder {path} could not be read")]
    TemplateReadError { path: String, source: io::Error },
    #[error("No tiles detected")]
    NoTiles,
    #[error("Unknown dictionary {0}")]
    UnknownDictionary(String),
    #[error("Unknown strategy {0}")]
    UnknownStrategy(String),
    #[error("Unknown font {0}")]
    UnknownFont(String),
    /// A single request to the dictionary service failed
    #[error("Dictionary request failed: {0}")]
    Transport(String),
    /// All attempts for one query failed
    #[error("Failed to fetch words for {pattern} after {attempts} attempts")]
    FetchFailed {
        pattern: String,
        attempts: u32,
        #[source]
        last: Box<Error>,
    },
    #[error("Failed to build worker pool")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
    #[error("Config {path} could not be read")]
    ConfigReadError { path: String, source: io::Error },
    #[error("Config {path} could not be parsed")]
    ConfigParseError {
        path: String,
        source: serde_json::Error,
    },
}
