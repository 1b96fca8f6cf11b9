//! Error types for the console core.

use thiserror::Error;

/// The main error type for console operations.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Raw input does not match the action's grammar.
    #[error("Invalid syntax. Use: {usage}")]
    Syntax { usage: String },

    /// Comparison characters that do not form a known operator.
    #[error("Invalid operator \"{0}\"")]
    Operator(String),

    /// Blank submission.
    #[error("Please enter a command")]
    EmptyInput,

    /// A schema-dependent action was run with nothing loaded.
    #[error("Please load data first")]
    NoDataset,

    /// A named column is missing from the loaded schema.
    #[error("Column \"{column}\" not found. Available: {}{}", .available.join(", "), suggestion_suffix(.suggestion))]
    UnknownColumn {
        column: String,
        available: Vec<String>,
        suggestion: Option<String>,
    },

    /// Compound filter mixes separators or a sub-clause is broken.
    #[error("{0}")]
    CompoundLogic(String),

    /// The service answered with a failure status.
    #[error("{message}")]
    Backend { message: String },

    /// The request never completed.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(". Did you mean '{}'?", s),
        None => String::new(),
    }
}

impl ConsoleError {
    /// Create a syntax error carrying the action's canonical usage string.
    pub fn syntax(usage: impl Into<String>) -> Self {
        Self::Syntax {
            usage: usage.into(),
        }
    }

    /// Create an invalid-operator error.
    pub fn operator(op: impl Into<String>) -> Self {
        Self::Operator(op.into())
    }

    /// Create an unknown-column error listing the live columns.
    pub fn unknown_column(
        column: impl Into<String>,
        available: &[String],
        suggestion: Option<String>,
    ) -> Self {
        Self::UnknownColumn {
            column: column.into(),
            available: available.to_vec(),
            suggestion,
        }
    }

    /// Create a compound-filter error.
    pub fn compound(message: impl Into<String>) -> Self {
        Self::CompoundLogic(message.into())
    }

    /// Create a backend error from a server-supplied message.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Result type alias for console operations.
pub type ConsoleResult<T> = Result<T, ConsoleError>;
