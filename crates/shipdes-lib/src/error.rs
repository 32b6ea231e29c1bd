use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the ship design library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
///
/// Solver outcomes such as constraint violations are not errors; they are
/// reported through [`crate::SolveStatus`] on the returned result. Errors are
/// reserved for requests that cannot be solved at all.
#[derive(Debug, Error)]
pub enum Error {
    /// A request field failed validation before solving began.
    #[error("invalid input for {field}: {message}")]
    InvalidInput { field: String, message: String },

    /// Raised when a ship type name is not in the profile registry.
    #[error("unknown ship type: {name}{}", format_suggestions(.suggestions))]
    UnknownShipType {
        name: String,
        suggestions: Vec<String>,
    },

    /// Raised when a propulsion/fuel name is not in the profile registry.
    #[error("unknown fuel type: {name}{}", format_suggestions(.suggestions))]
    UnknownFuelType {
        name: String,
        suggestions: Vec<String>,
    },

    /// Raised when a named route is not in the route catalog.
    #[error("unknown route: {name}{}", format_suggestions(.suggestions))]
    UnknownRoute {
        name: String,
        suggestions: Vec<String>,
    },

    /// Raised when a sweep definition cannot be sampled.
    #[error("invalid sweep: {message}")]
    InvalidSweep { message: String },

    /// No suitable project directories could be resolved for this platform.
    #[error("failed to resolve project directories for parameter files")]
    ProjectDirsUnavailable,

    /// Raised when a parameter or request file could not be parsed.
    #[error("failed to parse {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Wrapper for CSV writer errors.
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl Error {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        Error::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
