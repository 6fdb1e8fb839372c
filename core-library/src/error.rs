use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid input: {field} - {message}")]
    InvalidInput { field: String, message: String },
}

impl LibraryError {
    pub fn not_found(entity_type: &str, id: impl Into<String>) -> Self {
        LibraryError::NotFound {
            entity_type: entity_type.to_string(),
            id: id.into(),
        }
    }

    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        LibraryError::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LibraryError>;
