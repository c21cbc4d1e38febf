// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the viewer core.

use thiserror::Error;

/// Result type for viewer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while bootstrapping the viewer or handling models
#[derive(Error, Debug)]
pub enum Error {
    /// A step of the viewer bootstrap failed.
    #[error("initialization failed: {0}")]
    Initialization(String),

    /// The server answered with a non-success status.
    #[error("{url} returned {status}")]
    NotFound { url: String, status: u16 },

    /// The request never produced a response.
    #[error("network error for {url}: {reason}")]
    Network { url: String, reason: String },

    /// The engine rejected a fragment buffer.
    #[error("could not decode fragment '{model_id}': {reason}")]
    Decode { model_id: String, reason: String },

    /// Serializing a resident model back to bytes failed, or saving it did.
    #[error("could not export '{model_id}': {reason}")]
    Download { model_id: String, reason: String },

    /// No model identifier can be derived from the path.
    #[error("no model identifier in path '{0}'")]
    InvalidModelId(String),

    #[error("invalid fragment url '{path}': {reason}")]
    InvalidUrl { path: String, reason: String },

    #[error("fragment engine is not initialized")]
    EngineNotInitialized,

    /// The viewer shell has not reached Ready.
    #[error("viewer is not ready")]
    NotReady,

    /// Another batch operation is still in flight.
    #[error("another operation is in progress")]
    Busy,

    #[error("model '{0}' is not loaded")]
    UnknownModel(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the error is a dispatch guard rather than a failed operation.
    ///
    /// Guard errors are never shown in the error banner.
    pub fn is_guard(&self) -> bool {
        matches!(self, Error::NotReady | Error::Busy)
    }
}
