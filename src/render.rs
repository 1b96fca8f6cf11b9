//! Terminal and JSON rendering of submission outcomes.

use std::collections::HashMap;

use colored::*;

use crate::dispatch::Outcome;
use crate::protocol::{display_order, DataMap, FrameInfo, FramesResponse};

/// How outcomes reach the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Table,
    Json,
}

/// Render one outcome to stdout.
pub fn render(outcome: &Outcome, mode: RenderMode) {
    match mode {
        RenderMode::Json => render_json(outcome),
        RenderMode::Table => render_pretty(outcome),
    }
}

fn render_json(outcome: &Outcome) {
    if matches!(outcome, Outcome::Stale) {
        return;
    }
    println!(
        "{}",
        serde_json::to_string_pretty(outcome).unwrap_or_default()
    );
}

fn render_pretty(outcome: &Outcome) {
    match outcome {
        Outcome::Loaded {
            schema,
            total_columns,
            preview,
        } => {
            println!(
                "{} {}",
                "✓ Data Loaded Successfully".green().bold(),
                schema.name.cyan()
            );
            let total = total_columns.unwrap_or(schema.columns.len());
            println!(
                "  {} rows × {} columns",
                group_digits(schema.row_count).yellow(),
                total.to_string().yellow()
            );
            println!("  {} {}", "Columns:".dimmed(), schema.column_list());
            if total > schema.columns.len() {
                println!(
                    "  {}",
                    format!(
                        "Displaying a max of {} out of {} columns",
                        schema.columns.len(),
                        total
                    )
                    .dimmed()
                );
            }
            if let Some(preview) = preview {
                println!();
                print_table(&display_order(&schema.columns, preview), preview);
            }
        }
        Outcome::Table {
            title,
            rows,
            columns,
            data,
            total_columns,
            displayed_columns,
        } => {
            let unit = if *title == "Data Aggregated" {
                "groups"
            } else {
                "rows"
            };
            println!(
                "{} {}",
                format!("✓ {}", title).green().bold(),
                format!("{} {}", group_digits(*rows), unit).dimmed()
            );
            let displayed = displayed_columns.unwrap_or(columns.len());
            if let Some(total) = total_columns {
                if *total > displayed {
                    println!(
                        "{}",
                        format!(
                            "Displaying a max of {} out of {} columns",
                            displayed, total
                        )
                        .dimmed()
                    );
                }
            }
            print_table(columns, data);
        }
        Outcome::Scalar {
            label,
            value,
            row_count,
        } => {
            println!(
                "{} {}",
                "✓ Aggregate Calculated".green().bold(),
                label.cyan()
            );
            println!("  {}", val_to_string(value).yellow().bold());
            println!(
                "  {}",
                format!("across all {} rows", group_digits(*row_count)).dimmed()
            );
        }
        Outcome::Cleared { message } => {
            let message = if message.is_empty() {
                "DataFrames cleared"
            } else {
                message.as_str()
            };
            println!("{} {}", "✓".green().bold(), message);
        }
        Outcome::Stale => {}
    }
}

/// Print the frames listing.
pub fn render_frames(frames: &FramesResponse) {
    if frames.dataframes.is_empty() {
        println!("{}", "(no dataframes loaded)".dimmed());
        return;
    }
    let mut names: Vec<&String> = frames.dataframes.keys().collect();
    names.sort();
    for name in names {
        let summary = &frames.dataframes[name];
        println!(
            "  {} {} rows × {} columns",
            name.cyan().bold(),
            group_digits(summary.rows),
            summary.columns.len()
        );
    }
}

/// Print one frame's shape, columns, and preview.
pub fn render_frame_info(info: &FrameInfo) {
    println!("{} {}", "Frame:".dimmed(), info.name.cyan().bold());
    println!(
        "  {} rows × {} columns",
        group_digits(info.rows),
        info.columns.len()
    );
    println!("  {} {}", "Columns:".dimmed(), info.columns.join(", "));
    if let Some(preview) = &info.preview {
        println!();
        print_table(&display_order(&info.columns, preview), preview);
    }
}

/// Print a column-major table, capped at 100 rows.
fn print_table(columns: &[String], data: &DataMap) {
    if columns.is_empty() {
        println!("{}", "(no results)".dimmed());
        return;
    }
    let row_count = columns
        .iter()
        .filter_map(|column| data.get(column))
        .map(|values| values.len())
        .max()
        .unwrap_or(0);
    if row_count == 0 {
        println!("{}", "(no results)".dimmed());
        return;
    }
    let shown = row_count.min(100);

    // Calculate column widths
    let mut widths: HashMap<&String, usize> =
        columns.iter().map(|c| (c, c.len())).collect();
    for column in columns {
        let Some(values) = data.get(column) else {
            continue;
        };
        for value in values.iter().take(shown) {
            let len = val_to_string(value).len();
            if let Some(w) = widths.get_mut(column) {
                *w = (*w).max(len);
            }
        }
    }

    // Print header
    let header: Vec<String> = columns
        .iter()
        .map(|c| format!("{:width$}", c, width = widths[c]))
        .collect();
    println!("{}", header.join(" │ ").white().bold());

    // Print separator
    let sep: Vec<String> = columns.iter().map(|c| "─".repeat(widths[c])).collect();
    println!("{}", sep.join("─┼─").dimmed());

    // Print rows
    for i in 0..shown {
        let cells: Vec<String> = columns
            .iter()
            .map(|c| {
                let val = data
                    .get(c)
                    .and_then(|values| values.get(i))
                    .map(val_to_string)
                    .unwrap_or_default();
                format!("{:width$}", val, width = widths[c])
            })
            .collect();
        println!("{}", cells.join(" │ "));
    }

    if row_count > 100 {
        println!(
            "{}",
            format!(
                "Displaying a max of 100 out of {} rows",
                group_digits(row_count)
            )
            .dimmed()
        );
    }
}

fn val_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "null".to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => format_number(n),
        serde_json::Value::String(s) => s.clone(),
        _ => value.to_string(),
    }
}

/// Integers get digit grouping; floats are rounded to at most two
/// decimal places.
fn format_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        group_signed(&i.to_string())
    } else if let Some(f) = n.as_f64() {
        let mut text = format!("{:.2}", f);
        while text.ends_with('0') {
            text.pop();
        }
        if text.ends_with('.') {
            text.pop();
        }
        match text.split_once('.') {
            Some((int, frac)) => format!("{}.{}", group_signed(int), frac),
            None => group_signed(&text),
        }
    } else {
        n.to_string()
    }
}

fn group_digits(n: usize) -> String {
    group_signed(&n.to_string())
}

fn group_signed(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}{}", sign, grouped)
}
