//! Filter grammar: single comparisons and flat compound expressions.
//!
//! ```text
//! df[Population] > 1000000
//! ─┬ ─────┬───── ┬ ───┬───
//!  │      │      │    └── Value (raw remainder, trimmed)
//!  │      │      └── Comparison operator
//!  │      └── Column (anything but `]`)
//!  └── Frame name, optional
//! ```
//!
//! Compound expressions chain clauses with exactly one of `" & "` or
//! `" | "`. Mixing the two in one expression is rejected; there is no
//! precedence and no grouping.

use nom::{
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    combinator::{opt, rest},
    IResult,
};

use super::{identifier, usage};
use crate::ast::{Command, CompareOp, FilterClause, FilterLogic};
use crate::error::{ConsoleError, ConsoleResult};

const AND_SEP: &str = " & ";
const OR_SEP: &str = " | ";

/// Parse a filter expression, compound or single-clause.
pub fn parse(input: &str, default_frame: &str) -> ConsoleResult<Command> {
    let has_and = input.contains(AND_SEP);
    let has_or = input.contains(OR_SEP);
    if has_and && has_or {
        return Err(ConsoleError::compound(
            "Compound filters cannot mix \" & \" and \" | \"",
        ));
    }

    let (logic, separator) = if has_and {
        (FilterLogic::And, AND_SEP)
    } else if has_or {
        (FilterLogic::Or, OR_SEP)
    } else {
        let (frame, clause) = parse_clause(input)?;
        return Ok(Command::filter(
            frame.unwrap_or_else(|| default_frame.to_string()),
            vec![clause],
            FilterLogic::And,
        ));
    };

    // The frame name comes from the first clause; later prefixes are
    // parsed but ignored.
    let mut frame = None;
    let mut clauses = Vec::new();
    for (i, part) in input.split(separator).enumerate() {
        let (prefix, clause) = parse_clause(part.trim()).map_err(|_| {
            ConsoleError::compound(format!(
                "Invalid compound filter. Use: {}",
                usage::FILTER_COMPOUND
            ))
        })?;
        if i == 0 {
            frame = prefix;
        }
        clauses.push(clause);
    }

    Ok(Command::filter(
        frame.unwrap_or_else(|| default_frame.to_string()),
        clauses,
        logic,
    ))
}

/// Parse one `frame[Column] op value` clause.
///
/// Returns the clause and the frame prefix when one was written.
fn parse_clause(input: &str) -> ConsoleResult<(Option<String>, FilterClause)> {
    let (frame, column, symbol, value) = match clause_parts(input) {
        Ok(("", parts)) => parts,
        _ => return Err(ConsoleError::syntax(usage::FILTER)),
    };
    if value.is_empty() {
        return Err(ConsoleError::syntax(usage::FILTER));
    }
    let operator =
        CompareOp::from_symbol(symbol).ok_or_else(|| ConsoleError::operator(symbol))?;
    Ok((
        frame.map(str::to_string),
        FilterClause::new(column, operator, value.trim()),
    ))
}

/// Split a clause into its raw parts.
///
/// The operator is taken as a run of comparison characters so that a
/// typo like `===` is reported as a bad operator, not bad syntax.
fn clause_parts(input: &str) -> IResult<&str, (Option<&str>, &str, &str, &str)> {
    let (input, frame) = opt(identifier)(input)?;
    let (input, _) = char('[')(input)?;
    let (input, column) = take_while1(|c| c != ']')(input)?;
    let (input, _) = char(']')(input)?;
    let (input, _) = multispace0(input)?;
    let (input, symbol) = take_while1(|c| matches!(c, '>' | '<' | '=' | '!'))(input)?;
    let (input, _) = multispace0(input)?;
    let (input, value) = rest(input)?;
    Ok((input, (frame, column, symbol, value)))
}
