//! Output formatting for reports and current-session snapshots.
//!
//! Human-readable output is colorized for the terminal; `--json` callers get
//! the structures serialized verbatim under a top-level key naming the
//! report.

use crate::engine::CurrentStats;
use crate::models::{DailyStats, MonthlyStats, Session, WeeklyStats};
use crate::plans::AlertSeverity;
use colored::Colorize;

pub struct DisplayManager;

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayManager {
    pub fn new() -> Self {
        Self
    }

    pub fn display_projects(&self, projects: &[String], json_output: bool) {
        if json_output {
            self.print_json(&serde_json::json!({ "projects": projects }));
            return;
        }

        if projects.is_empty() {
            println!("No projects found.");
            return;
        }
        println!("{}", "Projects".bright_white().bold());
        for project in projects {
            println!("  {}", project.bright_cyan());
        }
    }

    pub fn display_current(&self, stats: &CurrentStats, json_output: bool) {
        if json_output {
            self.print_json(&serde_json::json!({ "current": stats }));
            return;
        }

        self.header("Claude Code Usage Monitor - Current Session");

        match &stats.current_session {
            Some(session) => {
                self.session_line("Current session", session);
                println!(
                    "   {} {} events/min | {} {} min until reset",
                    "🔥".bright_yellow(),
                    stats.burn_rate.to_string().bright_white().bold(),
                    "♻️ ".bright_blue(),
                    stats.minutes_until_reset.to_string().bright_white().bold()
                );
            }
            None => println!("{}", "No active session.".bright_black()),
        }
        if let Some(session) = &stats.previous_session {
            self.session_line("Previous session", session);
        }

        println!(
            "\n{} Today: {} messages • {} tokens • {} • {} sessions started",
            "📊".bright_yellow(),
            stats.today_message_count.to_string().bright_white().bold(),
            stats.today_tokens.to_string().bright_white(),
            format!("${:.2}", stats.today_cost).bright_green().bold(),
            stats.sessions_started_today.to_string().bright_white()
        );
        println!("   Plan: {}", stats.plan.name.bright_cyan());

        for alert in &stats.alerts {
            let tag = match alert.severity {
                AlertSeverity::Critical => "CRITICAL".bright_red().bold(),
                AlertSeverity::Warning => "WARNING".bright_yellow().bold(),
                AlertSeverity::Info => "INFO".bright_blue(),
            };
            println!("   {} {}", tag, alert.message);
        }
    }

    pub fn display_daily(&self, stats: &[DailyStats], json_output: bool) {
        if json_output {
            self.print_json(&serde_json::json!({ "daily": stats }));
            return;
        }

        self.header("Claude Code Usage Report - Daily");
        if stats.is_empty() {
            println!("No usage data found.");
            return;
        }

        let total_cost: f64 = stats.iter().map(|d| d.total_cost).sum();
        let total_events: u64 = stats.iter().map(|d| d.events).sum();
        println!(
            "\n{} {} days • {} events • {} total\n",
            "📊".bright_yellow(),
            stats.len().to_string().bright_white().bold(),
            total_events.to_string().bright_white().bold(),
            format!("${:.2}", total_cost).bright_green().bold()
        );

        for day in stats {
            println!(
                "{} {} — {} ({} events, {} tokens)",
                "📅".bright_blue(),
                day.date.bright_white().bold(),
                format!("${:.2}", day.total_cost).bright_green().bold(),
                day.events.to_string().bright_white(),
                day.total_tokens.to_string().bright_white()
            );
            if day.cache_cost > 0.0 {
                println!(
                    "   cache: {} spent, {} saved vs. no caching",
                    format!("${:.2}", day.cache_cost).bright_green(),
                    format!("${:.2}", day.cache_savings).bright_yellow()
                );
            }
            self.model_lines(&day.cost_by_model);
        }
    }

    pub fn display_weekly(&self, stats: &[WeeklyStats], json_output: bool) {
        if json_output {
            self.print_json(&serde_json::json!({ "weekly": stats }));
            return;
        }

        self.header("Claude Code Usage Report - Weekly");
        if stats.is_empty() {
            println!("No usage data found.");
            return;
        }

        for week in stats {
            println!(
                "{} {} to {} — {} ({} active days, avg {}/day)",
                "📅".bright_blue(),
                week.week_start.bright_white().bold(),
                week.week_end.bright_white().bold(),
                format!("${:.2}", week.total_cost).bright_green().bold(),
                week.days.to_string().bright_white(),
                format!("${:.2}", week.daily_average).bright_green()
            );
            self.model_lines(&week.cost_by_model);
        }
    }

    pub fn display_monthly(&self, stats: &[MonthlyStats], json_output: bool) {
        if json_output {
            self.print_json(&serde_json::json!({ "monthly": stats }));
            return;
        }

        self.header("Claude Code Usage Report - Monthly");
        if stats.is_empty() {
            println!("No usage data found.");
            return;
        }

        for month in stats {
            let savings = if month.savings >= 0.0 {
                format!("${:.2}", month.savings).bright_green()
            } else {
                format!("-${:.2}", month.savings.abs()).bright_red()
            };
            println!(
                "{} {}-{:02} — {} API-equivalent | plan {} | savings {}",
                "📅".bright_blue(),
                month.year.to_string().bright_white().bold(),
                month.month,
                format!("${:.2}", month.api_equivalent_cost)
                    .bright_green()
                    .bold(),
                format!("${:.2}", month.plan_cost).bright_white(),
                savings
            );
            self.model_lines(&month.cost_by_model);
        }
    }

    fn header(&self, title: &str) {
        println!("\n{}", "=".repeat(80).bright_cyan());
        println!("{}", title.bright_white().bold());
        println!("{}", "=".repeat(80).bright_cyan());
    }

    fn session_line(&self, label: &str, session: &Session) {
        println!(
            "{} {}: {} to {} — {} tokens, {}",
            "🕐".bright_blue(),
            label.bright_white().bold(),
            session.start_time.format("%H:%M").to_string().bright_white(),
            session.end_time.format("%H:%M").to_string().bright_white(),
            session.total_tokens.to_string().bright_white(),
            format!("${:.2}", session.total_cost).bright_green()
        );
    }

    fn model_lines(&self, cost_by_model: &std::collections::HashMap<String, f64>) {
        let mut models: Vec<_> = cost_by_model.iter().collect();
        models.sort_by(|a, b| a.0.cmp(b.0));
        for (model, cost) in models {
            println!(
                "   {}: {}",
                model.bright_cyan(),
                format!("${:.4}", cost).bright_green()
            );
        }
    }

    fn print_json(&self, value: &serde_json::Value) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error serializing output to JSON: {}", e),
        }
    }
}
