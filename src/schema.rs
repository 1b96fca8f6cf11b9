//! Schema registry for the currently loaded dataset.

use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

/// Column and row metadata for one loaded frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    pub columns: Vec<String>,
    pub row_count: usize,
}

impl Schema {
    pub fn new(name: impl Into<String>, columns: Vec<String>, row_count: usize) -> Self {
        Self {
            name: name.into(),
            columns,
            row_count,
        }
    }

    /// Exact, case-sensitive column lookup.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Comma-joined column names for error messages.
    pub fn column_list(&self) -> String {
        self.columns.join(", ")
    }
}

/// Holds the schema of the most recently loaded dataset.
///
/// One frame at a time: a successful load replaces whatever was here.
/// Shared between the validator and the dispatcher, so access goes
/// through a mutex.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    current: Mutex<Option<Schema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Schema>> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the registered schema.
    pub fn set(&self, schema: Schema) {
        *self.lock() = Some(schema);
    }

    /// A clone of the registered schema, if any.
    pub fn get(&self) -> Option<Schema> {
        self.lock().clone()
    }

    /// Drop the registered schema.
    pub fn clear(&self) {
        *self.lock() = None;
    }

    /// True when no dataset has been loaded yet.
    pub fn is_empty(&self) -> bool {
        self.lock().is_none()
    }

    /// True when a schema is registered and contains `column`.
    pub fn has_column(&self, column: &str) -> bool {
        self.lock()
            .as_ref()
            .map(|s| s.has_column(column))
            .unwrap_or(false)
    }
}
