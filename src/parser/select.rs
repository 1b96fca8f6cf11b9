//! Select grammar: `df[Column1, Column2, Column3]`.

use nom::{
    bytes::complete::take_while1,
    character::complete::char,
    combinator::opt,
    IResult,
};

use super::{identifier, usage};
use crate::ast::Command;
use crate::error::{ConsoleError, ConsoleResult};

/// Parse a projection, preserving the column order as written.
pub fn parse(input: &str, default_frame: &str) -> ConsoleResult<Command> {
    let (frame, body) = match select_parts(input) {
        Ok(("", parts)) => parts,
        _ => return Err(ConsoleError::syntax(usage::SELECT)),
    };
    let columns: Vec<String> = body.split(',').map(|c| c.trim().to_string()).collect();
    if columns.iter().any(String::is_empty) {
        return Err(ConsoleError::syntax(usage::SELECT));
    }
    Ok(Command::select(
        frame.unwrap_or(default_frame).to_string(),
        columns,
    ))
}

fn select_parts(input: &str) -> IResult<&str, (Option<&str>, &str)> {
    let (input, frame) = opt(identifier)(input)?;
    let (input, _) = char('[')(input)?;
    let (input, body) = take_while1(|c| c != ']')(input)?;
    let (input, _) = char(']')(input)?;
    Ok((input, (frame, body)))
}
