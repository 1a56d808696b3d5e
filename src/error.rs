use std::path::PathBuf;
use thiserror::Error;

/// Failure to read or write persisted state
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("failed to {action} {}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {key}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

/// Input rejected before it reaches the store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Task name must be at least {min} characters")]
    TaskNameTooShort { min: usize },

    #[error("Task name must be at most {max} characters")]
    TaskNameTooLong { max: usize },

    #[error("Description must be at most {max} characters")]
    DescriptionTooLong { max: usize },

    #[error("Please select a category")]
    MissingCategory,

    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    #[error("Category \"{0}\" already exists")]
    DuplicateCategory(String),

    #[error("Invalid color \"{0}\", expected a hex code like #RRGGBB")]
    InvalidColor(String),
}
