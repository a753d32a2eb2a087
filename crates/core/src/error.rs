use std::path::PathBuf;
use thiserror::Error;

use crate::types::SourceKind;

pub type PulseResult<T> = Result<T, PulseError>;

#[derive(Error, Debug)]
pub enum PulseError {
    #[error("Data folder '{}' not found", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Missing files: {}", .missing.join(", "))]
    MissingSource { missing: Vec<String> },

    #[error("Error loading file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("No date-like column found in {0} data")]
    NoDateColumn(SourceKind),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl PulseError {
    /// Hint shown next to load and validation failures.
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::DirectoryNotFound(_) | Self::MissingSource { .. } | Self::Parse { .. } => {
                let files: Vec<String> = SourceKind::ALL
                    .iter()
                    .map(|s| format!("- {}", s.file_name()))
                    .collect();
                Some(format!(
                    "Please ensure all CSV files are in the data folder:\n{}",
                    files.join("\n")
                ))
            }
            _ => None,
        }
    }
}
