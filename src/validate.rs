//! Command validation: the no-dataset guard, the grammar, then column
//! existence, in that order. A string that fails the grammar reports
//! usage even when it happens to mention a real column.

use std::sync::Arc;

use crate::ast::{Action, Command, DEFAULT_FRAME};
use crate::error::{ConsoleError, ConsoleResult};
use crate::parser;
use crate::schema::{Schema, SchemaRegistry};

/// Validates raw input against the grammar and the live schema.
pub struct Validator {
    registry: Arc<SchemaRegistry>,
    default_frame: String,
}

impl Validator {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self::with_default_frame(registry, DEFAULT_FRAME)
    }

    pub fn with_default_frame(registry: Arc<SchemaRegistry>, frame: impl Into<String>) -> Self {
        Self {
            registry,
            default_frame: frame.into(),
        }
    }

    /// Validate one line of input under `action`.
    ///
    /// Reads the registry once, so a validation sees a single schema
    /// snapshot from guard through column checks.
    pub fn validate(&self, action: Action, input: &str) -> ConsoleResult<Command> {
        let schema = self.registry.get();
        if action != Action::Load && schema.is_none() {
            return Err(ConsoleError::NoDataset);
        }

        let command = parser::parse_with_default(action, input, &self.default_frame)?;

        if let Some(schema) = &schema {
            check_columns(&command, schema)?;
        }
        Ok(command)
    }
}

/// Column existence per command shape. Load needs no schema; Join is
/// syntax-only because it can reference frames that are not loaded.
fn check_columns(command: &Command, schema: &Schema) -> ConsoleResult<()> {
    match command {
        Command::Load { .. } | Command::Join { .. } => Ok(()),
        Command::Filter { clauses, .. } => clauses
            .iter()
            .try_for_each(|clause| check_column(&clause.column, schema)),
        Command::Select { columns, .. } => columns
            .iter()
            .try_for_each(|column| check_column(column, schema)),
        Command::Aggregate { column, .. } => check_column(column, schema),
        Command::GroupBy {
            group_column,
            agg_column,
            ..
        } => {
            check_column(group_column, schema)?;
            check_column(agg_column, schema)
        }
    }
}

fn check_column(column: &str, schema: &Schema) -> ConsoleResult<()> {
    if schema.has_column(column) {
        return Ok(());
    }
    Err(ConsoleError::unknown_column(
        column,
        &schema.columns,
        did_you_mean(column, &schema.columns),
    ))
}

/// Closest column by edit distance, with the allowed distance scaled
/// to the length of what was typed.
fn did_you_mean(input: &str, candidates: &[String]) -> Option<String> {
    let max_distance = match input.len() {
        0..=2 => 0,
        3..=5 => 2,
        _ => 3,
    };
    candidates
        .iter()
        .map(|candidate| (candidate, strsim::levenshtein(input, candidate)))
        .filter(|(_, distance)| *distance <= max_distance)
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate.clone())
}
