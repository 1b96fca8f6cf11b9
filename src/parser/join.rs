//! Join grammar: `df1.merge(df2, on=Code)` with optional `how=`.
//!
//! Both frame names are required here. Join is the one action that can
//! reference frames other than the loaded one, so validation stops at
//! syntax and the service resolves the names.

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, multispace0},
    combinator::opt,
    sequence::preceded,
    IResult,
};

use super::{identifier, usage};
use crate::ast::Command;
use crate::error::{ConsoleError, ConsoleResult};

/// Parse a merge of two named frames.
pub fn parse(input: &str) -> ConsoleResult<Command> {
    match join_parts(input) {
        Ok(("", (left, right, (left_on, right_on), how))) => Ok(Command::join(
            left,
            right,
            left_on,
            right_on,
            how.unwrap_or("inner"),
        )),
        _ => Err(ConsoleError::syntax(usage::JOIN)),
    }
}

type JoinParts<'a> = (&'a str, &'a str, (&'a str, &'a str), Option<&'a str>);

fn join_parts(input: &str) -> IResult<&str, JoinParts<'_>> {
    let (input, left) = identifier(input)?;
    let (input, _) = tag(".merge(")(input)?;
    let (input, right) = identifier(input)?;
    let (input, _) = char(',')(input)?;
    let (input, _) = multispace0(input)?;
    let (input, keys) = alt((on_clause, left_right_clause))(input)?;
    let (input, how) = opt(how_clause)(input)?;
    let (input, _) = char(')')(input)?;
    Ok((input, (left, right, keys, how)))
}

/// `on=Code` applies one column to both sides.
fn on_clause(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, column) = preceded(tag("on="), identifier)(input)?;
    Ok((input, (column, column)))
}

fn left_right_clause(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, left_on) = preceded(tag("left_on="), identifier)(input)?;
    let (input, _) = char(',')(input)?;
    let (input, _) = multispace0(input)?;
    let (input, right_on) = preceded(tag("right_on="), identifier)(input)?;
    Ok((input, (left_on, right_on)))
}

fn how_clause(input: &str) -> IResult<&str, &str> {
    let (input, _) = char(',')(input)?;
    let (input, _) = multispace0(input)?;
    preceded(tag("how="), identifier)(input)
}
