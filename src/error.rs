//! Top-level server error definitions.

use thiserror::Error;

use crate::domain::CatalogError;

/// Errors that can abort the server process
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind or serve on the configured address
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to seed the room catalog at startup
    #[error("room catalog error: {0}")]
    Catalog(#[from] CatalogError),
}
