use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use claude_monitor::config::get_config;
use claude_monitor::display::DisplayManager;
use claude_monitor::engine::MonitorEngine;
use claude_monitor::logging::init_logging;
use claude_monitor::plans::Plan;

#[derive(Parser)]
#[command(name = "claude-monitor")]
#[command(about = "Local analytics for Claude Code usage logs")]
#[command(version)]
struct Cli {
    /// Override the Claude projects directory
    #[arg(long, global = true)]
    dir: Option<PathBuf>,
    /// Restrict to a single project
    #[arg(long, global = true)]
    project: Option<String>,
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,
    /// Subscription plan used for limits and savings (free|pro|max5|max20|team)
    #[arg(long, global = true)]
    plan: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Show the current billing session and today's totals
    Current,
    /// Show daily usage buckets
    Daily {
        /// Lookback in days
        #[arg(long)]
        days: Option<usize>,
    },
    /// Show weekly usage buckets
    Weekly {
        /// Number of recent weeks
        #[arg(long)]
        weeks: Option<usize>,
    },
    /// Show monthly usage buckets with plan savings
    Monthly {
        /// Number of recent months
        #[arg(long)]
        months: Option<usize>,
    },
    /// List known projects
    Projects,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let plan_name = cli.plan.as_deref().unwrap_or("pro");
    let Some(plan) = Plan::by_name(plan_name) else {
        eprintln!(
            "Unknown plan: {}. Use free, pro, max5, max20, or team.",
            plan_name
        );
        process::exit(1);
    };

    let engine = match MonitorEngine::new(cli.dir.clone(), plan) {
        Ok(engine) => engine,
        Err(e) => return handle_error(e, cli.json),
    };

    let config = get_config();
    let sweeper = engine.spawn_sweeper(Duration::from_secs(config.cache.sweep_interval_secs));
    let result = run(&cli, &engine).await;
    sweeper.shutdown();

    match result {
        Ok(()) => Ok(()),
        Err(e) => handle_error(e, cli.json),
    }
}

async fn run(cli: &Cli, engine: &MonitorEngine) -> Result<()> {
    let display = DisplayManager::new();
    let project = cli.project.as_deref();
    let config = get_config();

    match cli.command.clone().unwrap_or(Commands::Current) {
        Commands::Current => {
            let stats = engine.current_stats(project).await?;
            display.display_current(&stats, cli.json);
        }
        Commands::Daily { days } => {
            let days = days.unwrap_or(config.reports.daily_days);
            let stats = engine.daily_report(days, project).await?;
            display.display_daily(&stats, cli.json);
        }
        Commands::Weekly { weeks } => {
            let weeks = weeks.unwrap_or(config.reports.weekly_weeks);
            let stats = engine.weekly_report(weeks, project).await?;
            display.display_weekly(&stats, cli.json);
        }
        Commands::Monthly { months } => {
            let months = months.unwrap_or(config.reports.monthly_months);
            let stats = engine.monthly_report(months, project).await?;
            display.display_monthly(&stats, cli.json);
        }
        Commands::Projects => {
            let projects = engine.list_projects()?;
            display.display_projects(&projects, cli.json);
        }
    }

    Ok(())
}

fn handle_error(e: anyhow::Error, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::json!({ "error": e.to_string() }));
    } else {
        eprintln!("Error: {}", e);
    }
    process::exit(1);
}
