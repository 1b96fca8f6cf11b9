//! # dfq — the DataFrame console
//!
//! > **Type a pandas-flavored command, get a table.**
//!
//! dfq parses terse dataframe commands, validates them against the
//! schema of the loaded dataset, and runs them against a data service
//! over JSON.
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use dfq::prelude::*;
//!
//! // Parse a command under an action
//! let cmd = dfq::parse(Action::Filter, "df[Population] > 1000000")?;
//!
//! // Its canonical form round-trips
//! assert_eq!(cmd.to_string(), "df[Population] > 1000000");
//! ```
//!
//! ## Command shapes
//!
//! | Action    | Shape                                  |
//! |-----------|----------------------------------------|
//! | load      | `data/cities.csv`                      |
//! | filter    | `df[Population] > 1000000`             |
//! | select    | `df[Name, Region, Population]`         |
//! | aggregate | `df.sum(Population)`                   |
//! | groupby   | `df.groupby(Region).sum(Population)`   |
//! | join      | `df1.merge(df2, on=Code)`              |
//!
//! Filters chain with `" & "` or `" | "` (never both at once), and the
//! frame name may be left off anywhere a single frame is implied.

pub mod ast;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod parser;
pub mod protocol;
pub mod render;
pub mod repl;
pub mod schema;
pub mod validate;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::client::{DataService, HttpService};
    pub use crate::dispatch::{Dispatcher, Outcome};
    pub use crate::error::*;
    pub use crate::parser::parse;
    pub use crate::render::RenderMode;
    pub use crate::schema::{Schema, SchemaRegistry};
    pub use crate::validate::Validator;
}

/// Parse one line of input under an action.
///
/// # Example
///
/// ```
/// use dfq::ast::Action;
///
/// let cmd = dfq::parse(Action::Filter, "df[Score] > 10").unwrap();
/// assert_eq!(cmd.to_string(), "df[Score] > 10");
/// ```
pub fn parse(action: ast::Action, input: &str) -> error::ConsoleResult<ast::Command> {
    parser::parse(action, input)
}
