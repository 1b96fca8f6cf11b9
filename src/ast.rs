//! Abstract syntax tree for console commands.
//!
//! This module defines the canonical structures a raw input string is
//! parsed into, one variant per action.

use serde::{Deserialize, Serialize};

/// Frame name resolved when an input omits the leading identifier.
pub const DEFAULT_FRAME: &str = "df";

/// The six console actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Load,
    Filter,
    Select,
    Aggregate,
    GroupBy,
    Join,
}

impl Action {
    /// Every action, in UI order.
    pub const ALL: [Action; 6] = [
        Action::Load,
        Action::Filter,
        Action::Select,
        Action::Aggregate,
        Action::GroupBy,
        Action::Join,
    ];

    /// The stable key used in configuration and on the command line.
    pub fn key(&self) -> &'static str {
        match self {
            Action::Load => "load",
            Action::Filter => "filter",
            Action::Select => "select",
            Action::Aggregate => "aggregate",
            Action::GroupBy => "groupby",
            Action::Join => "join",
        }
    }

    /// Look an action up by its key.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "load" => Some(Action::Load),
            "filter" => Some(Action::Filter),
            "select" => Some(Action::Select),
            "aggregate" => Some(Action::Aggregate),
            "groupby" => Some(Action::GroupBy),
            "join" => Some(Action::Join),
            _ => None,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// A parsed console command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Command {
    /// Load a CSV file into the service.
    Load { path: String },
    /// Keep the rows matching one or more comparisons.
    Filter {
        dataframe: String,
        clauses: Vec<FilterClause>,
        logic: FilterLogic,
    },
    /// Project a subset of columns, in the order given.
    Select {
        dataframe: String,
        columns: Vec<String>,
    },
    /// Reduce one column to a single value.
    Aggregate {
        dataframe: String,
        column: String,
        function: AggFunc,
    },
    /// Aggregate one column per group of another.
    GroupBy {
        dataframe: String,
        group_column: String,
        agg_column: String,
        function: AggFunc,
    },
    /// Merge two frames held by the service.
    Join {
        left: String,
        right: String,
        left_on: String,
        right_on: String,
        how: String,
    },
}

impl Command {
    /// Create a Load command.
    pub fn load(path: impl Into<String>) -> Self {
        Self::Load { path: path.into() }
    }

    /// Create a Filter command.
    pub fn filter(
        dataframe: impl Into<String>,
        clauses: Vec<FilterClause>,
        logic: FilterLogic,
    ) -> Self {
        Self::Filter {
            dataframe: dataframe.into(),
            clauses,
            logic,
        }
    }

    /// Create a Select command.
    pub fn select(dataframe: impl Into<String>, columns: Vec<String>) -> Self {
        Self::Select {
            dataframe: dataframe.into(),
            columns,
        }
    }

    /// Create an Aggregate command.
    pub fn aggregate(
        dataframe: impl Into<String>,
        column: impl Into<String>,
        function: AggFunc,
    ) -> Self {
        Self::Aggregate {
            dataframe: dataframe.into(),
            column: column.into(),
            function,
        }
    }

    /// Create a GroupBy command.
    pub fn group_by(
        dataframe: impl Into<String>,
        group_column: impl Into<String>,
        agg_column: impl Into<String>,
        function: AggFunc,
    ) -> Self {
        Self::GroupBy {
            dataframe: dataframe.into(),
            group_column: group_column.into(),
            agg_column: agg_column.into(),
            function,
        }
    }

    /// Create a Join command.
    pub fn join(
        left: impl Into<String>,
        right: impl Into<String>,
        left_on: impl Into<String>,
        right_on: impl Into<String>,
        how: impl Into<String>,
    ) -> Self {
        Self::Join {
            left: left.into(),
            right: right.into(),
            left_on: left_on.into(),
            right_on: right_on.into(),
            how: how.into(),
        }
    }

    /// The action this command belongs to.
    pub fn action(&self) -> Action {
        match self {
            Command::Load { .. } => Action::Load,
            Command::Filter { .. } => Action::Filter,
            Command::Select { .. } => Action::Select,
            Command::Aggregate { .. } => Action::Aggregate,
            Command::GroupBy { .. } => Action::GroupBy,
            Command::Join { .. } => Action::Join,
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Load { path } => write!(f, "{}", path),
            Command::Filter {
                dataframe,
                clauses,
                logic,
            } => {
                for (i, clause) in clauses.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{}", logic.separator())?;
                    }
                    write!(
                        f,
                        "{}[{}] {} {}",
                        dataframe, clause.column, clause.operator, clause.value
                    )?;
                }
                Ok(())
            }
            Command::Select { dataframe, columns } => {
                write!(f, "{}[{}]", dataframe, columns.join(", "))
            }
            Command::Aggregate {
                dataframe,
                column,
                function,
            } => write!(f, "{}.{}({})", dataframe, function, column),
            Command::GroupBy {
                dataframe,
                group_column,
                agg_column,
                function,
            } => write!(
                f,
                "{}.groupby({}).{}({})",
                dataframe, group_column, function, agg_column
            ),
            Command::Join {
                left,
                right,
                left_on,
                right_on,
                how,
            } => {
                write!(f, "{}.merge({}, ", left, right)?;
                if left_on == right_on {
                    write!(f, "on={}", left_on)?;
                } else {
                    write!(f, "left_on={}, right_on={}", left_on, right_on)?;
                }
                if how != "inner" {
                    write!(f, ", how={}", how)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// A single column/operator/value comparison within a filter.
///
/// The value stays a raw string; numeric coercion is the service's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterClause {
    pub column: String,
    pub operator: CompareOp,
    pub value: String,
}

impl FilterClause {
    pub fn new(column: impl Into<String>, operator: CompareOp, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            operator,
            value: value.into(),
        }
    }
}

/// Comparison operators, serialized as their surface symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    /// Greater than (>)
    #[serde(rename = ">")]
    Gt,
    /// Greater than or equal (>=)
    #[serde(rename = ">=")]
    Gte,
    /// Less than (<)
    #[serde(rename = "<")]
    Lt,
    /// Less than or equal (<=)
    #[serde(rename = "<=")]
    Lte,
    /// Equal (==)
    #[serde(rename = "==")]
    Eq,
    /// Not equal (!=)
    #[serde(rename = "!=")]
    Ne,
}

impl CompareOp {
    /// The surface symbol for this operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
        }
    }

    /// Map a run of comparison characters back to an operator.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            ">" => Some(CompareOp::Gt),
            ">=" => Some(CompareOp::Gte),
            "<" => Some(CompareOp::Lt),
            "<=" => Some(CompareOp::Lte),
            "==" => Some(CompareOp::Eq),
            "!=" => Some(CompareOp::Ne),
            _ => None,
        }
    }
}

impl std::fmt::Display for CompareOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Logical operator joining the clauses of a compound filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FilterLogic {
    #[default]
    And,
    Or,
}

impl FilterLogic {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterLogic::And => "and",
            FilterLogic::Or => "or",
        }
    }

    /// The surface separator that selects this logic.
    pub fn separator(&self) -> &'static str {
        match self {
            FilterLogic::And => " & ",
            FilterLogic::Or => " | ",
        }
    }
}

impl std::fmt::Display for FilterLogic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Aggregate functions the service understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggFunc {
    Sum,
    Mean,
    Max,
    Min,
    Count,
}

impl AggFunc {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggFunc::Sum => "sum",
            AggFunc::Mean => "mean",
            AggFunc::Max => "max",
            AggFunc::Min => "min",
            AggFunc::Count => "count",
        }
    }
}

impl std::fmt::Display for AggFunc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_keys_round_trip() {
        for action in Action::ALL {
            assert_eq!(Action::from_key(action.key()), Some(action));
        }
        assert_eq!(Action::from_key("merge"), None);
    }

    #[test]
    fn test_filter_display() {
        let cmd = Command::filter(
            "df",
            vec![
                FilterClause::new("Score", CompareOp::Gt, "10"),
                FilterClause::new("Name", CompareOp::Eq, "Oslo"),
            ],
            FilterLogic::And,
        );
        assert_eq!(cmd.to_string(), "df[Score] > 10 & df[Name] == Oslo");
    }

    #[test]
    fn test_join_display_collapses_on() {
        let cmd = Command::join("df1", "df2", "Code", "Code", "inner");
        assert_eq!(cmd.to_string(), "df1.merge(df2, on=Code)");

        let cmd = Command::join("df1", "df2", "Id", "Code", "left");
        assert_eq!(
            cmd.to_string(),
            "df1.merge(df2, left_on=Id, right_on=Code, how=left)"
        );
    }

    #[test]
    fn test_operator_symbols() {
        assert_eq!(CompareOp::from_symbol(">="), Some(CompareOp::Gte));
        assert_eq!(CompareOp::from_symbol("==="), None);
        assert_eq!(
            serde_json::to_string(&CompareOp::Gte).unwrap(),
            "\">=\""
        );
    }

    #[test]
    fn test_logic_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&FilterLogic::Or).unwrap(), "\"or\"");
        assert_eq!(serde_json::to_string(&AggFunc::Mean).unwrap(), "\"mean\"");
    }
}
