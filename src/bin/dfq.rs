//! dfq — the DataFrame console CLI
//!
//! # Usage
//!
//! ```bash
//! # Load a CSV into the data service
//! dfq data/cities.csv
//!
//! # Run a command under another action
//! dfq -a filter 'df[Population] > 1000000'
//!
//! # Interactive console
//! dfq repl
//! ```

use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use tokio::runtime::Runtime;

use dfq::ast::Action;
use dfq::client::HttpService;
use dfq::config::DfqConfig;
use dfq::dispatch::Dispatcher;
use dfq::render::{render, render_frame_info, render_frames, RenderMode};
use dfq::repl;
use dfq::schema::SchemaRegistry;

#[derive(Parser)]
#[command(name = "dfq")]
#[command(version)]
#[command(about = "🐼 A pandas-flavored console for tabular data", long_about = None)]
#[command(after_help = "EXAMPLES:
    dfq data/cities.csv
    dfq -a filter 'df[Population] > 1000000'
    dfq -a groupby 'df.groupby(Region).sum(Population)' -f json
    dfq repl")]
struct Cli {
    /// The command to run under the selected action
    input: Option<String>,

    /// Action the input belongs to
    #[arg(short, long, value_enum, default_value = "load")]
    action: ActionArg,

    /// Data service base URL
    #[arg(long, env = "DFQ_SERVICE_URL")]
    url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ActionArg {
    Load,
    Filter,
    Select,
    Aggregate,
    #[value(name = "groupby")]
    GroupBy,
    Join,
}

impl From<ActionArg> for Action {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::Load => Action::Load,
            ActionArg::Filter => Action::Filter,
            ActionArg::Select => Action::Select,
            ActionArg::Aggregate => Action::Aggregate,
            ActionArg::GroupBy => Action::GroupBy,
            ActionArg::Join => Action::Join,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

impl From<OutputFormat> for RenderMode {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Table => RenderMode::Table,
            OutputFormat::Json => RenderMode::Json,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive console mode
    Repl,
    /// List the frames held by the service
    Frames,
    /// Shape and preview of one frame
    Info {
        /// Frame name (the configured frame when omitted)
        name: Option<String>,
    },
    /// Clear every frame on the service
    Reset,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = DfqConfig::load()?.with_url(cli.url.clone());
    let registry = Arc::new(SchemaRegistry::new());
    let service = Arc::new(HttpService::new(
        config.service.url.as_str(),
        config.timeout(),
    )?);
    let dispatcher = Dispatcher::with_frame(registry, service, &config.console.dataframe);

    let rt = Runtime::new()?;
    let mode = RenderMode::from(cli.format);

    match &cli.command {
        Some(Commands::Repl) => repl::run(&dispatcher, mode, &rt),
        Some(Commands::Frames) => {
            let frames = rt.block_on(dispatcher.frames())?;
            match mode {
                RenderMode::Json => println!("{}", serde_json::to_string_pretty(&frames)?),
                RenderMode::Table => render_frames(&frames),
            }
        }
        Some(Commands::Info { name }) => {
            let info = rt.block_on(dispatcher.frame_info(name.as_deref()))?;
            match mode {
                RenderMode::Json => println!("{}", serde_json::to_string_pretty(&info)?),
                RenderMode::Table => render_frame_info(&info),
            }
        }
        Some(Commands::Reset) => {
            let outcome = rt.block_on(dispatcher.clear())?;
            render(&outcome, mode);
        }
        None => match &cli.input {
            Some(input) => {
                let action = Action::from(cli.action);
                if let Err(e) = rt.block_on(run_once(&dispatcher, action, input, mode, &cli)) {
                    eprintln!("{} {}", "Error:".red().bold(), e);
                    std::process::exit(1);
                }
            }
            // No input and no subcommand drops into the console.
            None => repl::run(&dispatcher, mode, &rt),
        },
    }

    Ok(())
}

async fn run_once(
    dispatcher: &Dispatcher,
    action: Action,
    input: &str,
    mode: RenderMode,
    cli: &Cli,
) -> anyhow::Result<()> {
    if cli.verbose {
        println!("{} {}", "Input:".dimmed(), input.yellow());
    }

    // One-shot runs validate against whatever the service holds.
    if action != Action::Load {
        dispatcher.hydrate().await?;
    }

    let outcome = dispatcher.submit(action, input).await?;
    render(&outcome, mode);
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "dfq=debug" } else { "dfq=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}
