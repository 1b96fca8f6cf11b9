//! Aggregate grammars: `df.sum(Column)` and
//! `df.groupby(Column).sum(AggColumn)`.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::char,
    combinator::{opt, value},
    IResult,
};

use super::{identifier, usage};
use crate::ast::{AggFunc, Command};
use crate::error::{ConsoleError, ConsoleResult};

/// Parse a whole-column reduction.
pub fn parse(input: &str, default_frame: &str) -> ConsoleResult<Command> {
    match aggregate_parts(input) {
        Ok(("", (frame, function, column))) => Ok(Command::aggregate(
            frame.unwrap_or(default_frame),
            column,
            function,
        )),
        _ => Err(ConsoleError::syntax(usage::AGGREGATE)),
    }
}

/// Parse a grouped reduction.
pub fn parse_groupby(input: &str, default_frame: &str) -> ConsoleResult<Command> {
    match groupby_parts(input) {
        Ok(("", (frame, group, function, agg))) => Ok(Command::group_by(
            frame.unwrap_or(default_frame),
            group,
            agg,
            function,
        )),
        _ => Err(ConsoleError::syntax(usage::GROUPBY)),
    }
}

fn func_name(input: &str) -> IResult<&str, AggFunc> {
    alt((
        value(AggFunc::Sum, tag("sum")),
        value(AggFunc::Mean, tag("mean")),
        value(AggFunc::Max, tag("max")),
        value(AggFunc::Min, tag("min")),
        value(AggFunc::Count, tag("count")),
    ))(input)
}

fn paren_arg(input: &str) -> IResult<&str, &str> {
    let (input, _) = char('(')(input)?;
    let (input, arg) = take_while1(|c| c != ')')(input)?;
    let (input, _) = char(')')(input)?;
    Ok((input, arg))
}

fn aggregate_parts(input: &str) -> IResult<&str, (Option<&str>, AggFunc, &str)> {
    let (input, frame) = opt(identifier)(input)?;
    let (input, _) = char('.')(input)?;
    let (input, function) = func_name(input)?;
    let (input, column) = paren_arg(input)?;
    Ok((input, (frame, function, column)))
}

fn groupby_parts(input: &str) -> IResult<&str, (Option<&str>, &str, AggFunc, &str)> {
    let (input, frame) = opt(identifier)(input)?;
    let (input, _) = tag(".groupby")(input)?;
    let (input, group) = paren_arg(input)?;
    let (input, _) = char('.')(input)?;
    let (input, function) = func_name(input)?;
    let (input, agg) = paren_arg(input)?;
    Ok((input, (frame, group, function, agg)))
}
