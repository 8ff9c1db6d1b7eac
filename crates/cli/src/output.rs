//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print any response body as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format a percentage already scaled to 0-100
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value)
}

/// Color status based on value
pub fn color_status(status: &str) -> String {
    match status.to_lowercase().as_str() {
        "healthy" | "success" | "successful" => status.green().to_string(),
        "live" | "suspended" | "canceled" => status.yellow().to_string(),
        "error" | "failed" => status.red().to_string(),
        _ => status.to_string(),
    }
}

/// Color a yes/no flag
pub fn color_flag(flag: bool) -> String {
    if flag {
        "yes".green().to_string()
    } else {
        "no".red().to_string()
    }
}

/// Color a success probability based on value
pub fn color_probability(value: f64) -> String {
    let formatted = format_percent(value);
    if value >= 60.0 {
        formatted.green().to_string()
    } else if value >= 40.0 {
        formatted.yellow().to_string()
    } else {
        formatted.red().to_string()
    }
}
