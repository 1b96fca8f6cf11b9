//! Per-action micro-grammars.
//!
//! Each action owns a tiny parser that turns one line of input into a
//! [`Command`](crate::ast::Command). The grammars are strict: an input
//! either matches in full or fails with the usage string for that
//! action. No grammar touches the network or the schema registry;
//! column existence is the validator's business.

pub mod aggregate;
pub mod filter;
pub mod join;
pub mod select;

use nom::{bytes::complete::take_while1, IResult};

use crate::ast::{Action, Command, DEFAULT_FRAME};
use crate::error::{ConsoleError, ConsoleResult};

/// Usage strings quoted verbatim in syntax errors.
pub mod usage {
    pub const LOAD: &str = "data/cities.csv";
    pub const FILTER: &str = "df[Column] > 100";
    pub const FILTER_COMPOUND: &str = "df[Column1] > 100 & df[Column2] == \"Value\"";
    pub const SELECT: &str = "df[Column1, Column2, Column3]";
    pub const AGGREGATE: &str = "df.sum(Column) or df.mean(Column)";
    pub const GROUPBY: &str = "df.groupby(Column).sum(AggColumn)";
    pub const JOIN: &str =
        "df1.merge(df2, on=Column) or df1.merge(df2, left_on=Col1, right_on=Col2)";
}

/// Word characters: letters, digits, underscore.
pub(crate) fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_')(input)
}

/// Parse one line of input under `action`, defaulting the frame name
/// to `df` where the grammar allows it to be omitted.
pub fn parse(action: Action, input: &str) -> ConsoleResult<Command> {
    parse_with_default(action, input, DEFAULT_FRAME)
}

/// Parse one line of input, resolving omitted frame names to
/// `default_frame`.
pub fn parse_with_default(
    action: Action,
    input: &str,
    default_frame: &str,
) -> ConsoleResult<Command> {
    let input = input.trim();
    match action {
        Action::Load => parse_load(input),
        Action::Filter => filter::parse(input, default_frame),
        Action::Select => select::parse(input, default_frame),
        Action::Aggregate => aggregate::parse(input, default_frame),
        Action::GroupBy => aggregate::parse_groupby(input, default_frame),
        Action::Join => join::parse(input),
    }
}

/// Load takes a bare path; the only shape check is the `.csv` suffix.
fn parse_load(input: &str) -> ConsoleResult<Command> {
    if input.is_empty() || !input.to_lowercase().ends_with(".csv") {
        return Err(ConsoleError::syntax(usage::LOAD));
    }
    Ok(Command::load(input))
}
