//! Errors raised while producing report artifacts.

use pantry_history::HistoryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to read file: {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write file: {path}: {source}")]
    WriteFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create directory: {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render json for {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("refusing to overwrite source token file in place: {path}")]
    InPlaceWrite { path: String },

    #[error("two token files map to the same optimized output: {path}")]
    OutputCollision { path: String },

    #[error(transparent)]
    History(#[from] HistoryError),
}
