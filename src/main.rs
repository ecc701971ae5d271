use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use cardwizard::app::{App, LaunchOptions};
use cardwizard::config::Config;
use cardwizard::logging;
use cardwizard::wizard::{FileFlowStore, FlowStateStore};
use cardwizard::workspace::AssignmentLog;

#[derive(Parser)]
#[command(name = "cardwizard")]
#[command(about = "Assign company cards to workspace members, one step at a time")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    #[command(flatten)]
    launch: LaunchArgs,
}

#[derive(Args, Clone, Default)]
struct LaunchArgs {
    /// Card feed to assign from (e.g. oauth.chase.com)
    #[arg(long)]
    feed: Option<String>,

    /// Workspace policy ID
    #[arg(long)]
    policy: Option<String>,

    /// Step to open (e.g. CARD, card-name)
    #[arg(long)]
    step: Option<String>,

    /// Where to return once the card is assigned
    #[arg(long)]
    back_to: Option<String>,

    /// Route query string, e.g. "feed=vcf&backTo=cards&step=CARD"
    #[arg(long)]
    route: Option<String>,
}

impl From<LaunchArgs> for LaunchOptions {
    fn from(args: LaunchArgs) -> Self {
        LaunchOptions {
            route: args.route,
            feed: args.feed,
            policy_id: args.policy,
            step: args.step,
            back_to: args.back_to,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Open the assign card wizard (default)
    Run(LaunchArgs),

    /// Show the flow in progress and recent assignments
    Status,

    /// Discard the flow in progress
    Reset,

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;

    let is_tui_mode = matches!(cli.command, None | Some(Commands::Run(_)));

    // File logging for the TUI, stderr otherwise
    let logging_handle = logging::init_logging(&config, is_tui_mode, cli.debug)?;

    match cli.command {
        Some(Commands::Run(launch)) => {
            run_tui(config, launch.into(), logging_handle.log_file_path).await?;
        }
        Some(Commands::Status) => cmd_status(&config)?,
        Some(Commands::Reset) => cmd_reset(&config)?,
        Some(Commands::Config) => print!("{}", config.to_toml()?),
        None => {
            run_tui(config, cli.launch.into(), logging_handle.log_file_path).await?;
        }
    }

    Ok(())
}

async fn run_tui(config: Config, launch: LaunchOptions, log_file_path: Option<PathBuf>) -> Result<()> {
    let mut app = App::new(config, &launch)?;
    let result = app.run().await;

    // Print log file path on exit if logs were written
    if let Some(log_path) = log_file_path {
        if let Ok(metadata) = log_path.metadata() {
            if metadata.len() > 0 {
                eprintln!("Session log: {}", log_path.display());
            }
        }
    }

    result
}

fn cmd_status(config: &Config) -> Result<()> {
    let store = FileFlowStore::in_dir(&config.state_path());
    match store.read()? {
        Some(state) => {
            println!("Assign card flow in progress ({})", store.path().display());
            println!("{}", "─".repeat(60));
            println!(
                "Step:     {}",
                state.current_step.map_or("-", |s| s.title())
            );
            println!("Editing:  {}", state.is_editing);
            println!("{}", serde_json::to_string_pretty(&state.data)?);
        }
        None => println!("No assign card flow in progress"),
    }

    let assignments = AssignmentLog::load(&config.assignments_path())?;
    if !assignments.is_empty() {
        println!();
        println!("Recent assignments ({})", assignments.len());
        println!("{}", "─".repeat(60));
        for assignment in assignments.iter().rev().take(5) {
            println!(
                "{}  {:<24} {:<20} {}",
                assignment.assigned_at.format("%Y-%m-%d %H:%M"),
                assignment.email,
                assignment.card_number,
                assignment.card_name
            );
        }
    }
    Ok(())
}

fn cmd_reset(config: &Config) -> Result<()> {
    let store = FileFlowStore::in_dir(&config.state_path());
    store.clear()?;
    tracing::info!(path = %store.path().display(), "Flow state reset");
    println!("Assign card flow cleared");
    Ok(())
}
