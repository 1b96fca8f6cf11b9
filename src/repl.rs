//! Interactive console mode.

use colored::*;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::runtime::Runtime;

use crate::ast::Action;
use crate::dispatch::{descriptor, Dispatcher, ACTIONS};
use crate::render::{render, render_frame_info, render_frames, RenderMode};

/// Run the interactive console until exit.
pub fn run(dispatcher: &Dispatcher, mode: RenderMode, rt: &Runtime) {
    println!("{}", "🐼 dfq — Interactive Console".cyan().bold());
    println!(
        "{}",
        "Pick an action with .use, then type commands for it:".dimmed()
    );
    println!("  {}   - Switch action (load, filter, ...)", ".use".yellow());
    println!("  {}  - Show commands and examples", ".help".yellow());
    println!("  {}  - Exit the console", ".exit".yellow());
    println!();

    let mut rl = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("{} {}", "Failed to initialize console:".red(), e);
            return;
        }
    };

    // Load history if available
    let history_path = dirs::home_dir()
        .map(|p| p.join(".dfq_history"))
        .unwrap_or_default();
    let _ = rl.load_history(&history_path);

    // Reattach if the service already holds the configured frame.
    match rt.block_on(dispatcher.hydrate()) {
        Ok(true) => {
            if let Some(schema) = dispatcher.registry().get() {
                println!(
                    "{}",
                    format!(
                        "Reattached to '{}' ({} rows, {} columns)",
                        schema.name,
                        schema.row_count,
                        schema.columns.len()
                    )
                    .dimmed()
                );
            }
        }
        Ok(false) => {}
        Err(_) => println!(
            "{}",
            "Service not reachable yet; load will retry it.".dimmed()
        ),
    }

    let mut action = Action::Load;

    loop {
        let prompt = format!("dfq:{}> ", action.key()).cyan().bold().to_string();
        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                match line {
                    ".exit" | ".quit" | "exit" | "quit" => {
                        println!("{}", "Goodbye! 👋".green());
                        break;
                    }
                    ".help" | "help" => {
                        show_repl_help();
                        continue;
                    }
                    ".clear" | "clear" => {
                        print!("\x1B[2J\x1B[1;1H");
                        continue;
                    }
                    ".schema" => {
                        show_schema(dispatcher);
                        continue;
                    }
                    ".frames" => {
                        match rt.block_on(dispatcher.frames()) {
                            Ok(frames) => render_frames(&frames),
                            Err(e) => eprintln!("{} {}", "✗".red(), e.to_string().red()),
                        }
                        continue;
                    }
                    ".reset" => {
                        match rt.block_on(dispatcher.clear()) {
                            Ok(outcome) => render(&outcome, mode),
                            Err(e) => eprintln!("{} {}", "✗".red(), e.to_string().red()),
                        }
                        continue;
                    }
                    _ => {}
                }

                if line == ".use" || line.starts_with(".use ") {
                    action = switch_action(&line[4..], action);
                    continue;
                }

                if line == ".info" || line.starts_with(".info ") {
                    let name = line[5..].trim();
                    let name = (!name.is_empty()).then_some(name);
                    match rt.block_on(dispatcher.frame_info(name)) {
                        Ok(info) => render_frame_info(&info),
                        Err(e) => eprintln!("{} {}", "✗".red(), e.to_string().red()),
                    }
                    continue;
                }

                match rt.block_on(dispatcher.submit(action, line)) {
                    Ok(outcome) => {
                        render(&outcome, mode);
                        println!();
                    }
                    Err(e) => {
                        eprintln!("{} {}", "✗".red(), e.to_string().red());
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".dimmed());
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "Goodbye! 👋".green());
                break;
            }
            Err(err) => {
                eprintln!("{} {:?}", "Error:".red(), err);
                break;
            }
        }
    }

    let _ = rl.save_history(&history_path);
}

fn switch_action(arg: &str, current: Action) -> Action {
    let key = arg.trim();
    match Action::from_key(key) {
        Some(action) => {
            let d = descriptor(action);
            println!(
                "{} {} {}",
                "Action:".dimmed(),
                action.to_string().cyan().bold(),
                format!("(e.g. {})", d.placeholder).dimmed()
            );
            action
        }
        None => {
            eprintln!(
                "{} Unknown action '{}'. One of: {}",
                "✗".red(),
                key,
                Action::ALL.map(|a| a.key()).join(", ")
            );
            current
        }
    }
}

fn show_schema(dispatcher: &Dispatcher) {
    match dispatcher.registry().get() {
        Some(schema) => {
            println!("{} {}", "Frame:".dimmed(), schema.name.cyan().bold());
            println!(
                "  {} rows × {} columns",
                schema.row_count,
                schema.columns.len()
            );
            println!("  {} {}", "Columns:".dimmed(), schema.column_list());
        }
        None => println!("{}", "(nothing loaded)".dimmed()),
    }
}

/// Show console help information.
pub fn show_repl_help() {
    println!("{}", "dfq Console Commands:".cyan().bold());
    println!("  {}      - Switch the current action", ".use <action>".yellow());
    println!("  {}             - Show the loaded schema", ".schema".yellow());
    println!("  {}             - List frames on the service", ".frames".yellow());
    println!("  {}        - Shape and preview of a frame", ".info [name]".yellow());
    println!("  {}              - Clear all frames", ".reset".yellow());
    println!("  {}              - Clear screen", ".clear".yellow());
    println!("  {}               - Exit the console", ".exit".yellow());
    println!();
    println!("{}", "Actions and examples:".cyan().bold());
    for entry in &ACTIONS {
        println!(
            "  {} {}  {}",
            format!("{:9}", entry.action.key()).yellow(),
            entry.placeholder,
            format!("({})", entry.description).dimmed()
        );
    }
    println!();
}
