use core_library::LibraryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Storage unavailable for {key}: {message}")]
    StorageUnavailable { key: String, message: String },

    #[error("Failed to encode {key}: {source}")]
    SerializationFailed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("No user is signed in")]
    NotSignedIn,

    #[error("Only artists can manage releases")]
    NotArtist,

    #[error(transparent)]
    Library(#[from] LibraryError),
}

pub type Result<T> = std::result::Result<T, SessionError>;
