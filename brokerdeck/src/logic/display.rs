use crate::logic::sync::roster::RosterRender;
use crate::logic::sync::table::{TableRender, TABLE_COLUMNS};
use crate::logic::sync::terminal::LogRender;
use crate::logic::types::{DataPoint, Notification, Severity};
use colored::*;

/// Get colored status indicator for a notification severity
pub fn severity_dot(severity: Severity) -> ColoredString {
    match severity {
        Severity::Success => "●".green(),
        Severity::Error => "●".red(),
        Severity::Info => "●".yellow(),
    }
}

pub fn status_line(note: &Notification) -> String {
    format!("{} {}", severity_dot(note.severity), note.message)
}

/// Shorten to `width` characters, marking the cut with "..."
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Local time when the timestamp parses, the raw text otherwise
pub fn format_timestamp(point: &DataPoint) -> String {
    point
        .received_at()
        .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| point.timestamp.clone())
}

pub fn roster_lines(roster: &RosterRender) -> Vec<String> {
    match roster {
        RosterRender::Empty => vec!["No active connections".yellow().to_string()],
        RosterRender::Brokers(rows) => {
            let mut lines = vec![format!(
                "{:<3} {:<32} {:<10}",
                "ST".bright_white().bold(),
                "BROKER".bright_white().bold(),
                "SESSION".bright_white().bold()
            )];
            lines.push("─".repeat(48).bright_blue().to_string());
            for row in rows {
                let dot = match row.connected {
                    Some(false) => "●".red(),
                    _ => "●".green(),
                };
                let origin = if row.opened_here { "this console" } else { "" };
                lines.push(format!("{:<3} {:<32} {:<10}", dot, truncate(&row.id, 32), origin.dimmed()));
            }
            lines
        }
    }
}

pub fn table_lines(table: &TableRender) -> Vec<String> {
    let header = format!(
        "{:<20} {:<14} {:<28} {:<32} {:<3}",
        TABLE_COLUMNS[0].bright_white().bold(),
        TABLE_COLUMNS[1].bright_white().bold(),
        TABLE_COLUMNS[2].bright_white().bold(),
        TABLE_COLUMNS[3].bright_white().bold(),
        TABLE_COLUMNS[4].bright_white().bold()
    );
    let rule = "─".repeat(101).bright_blue().to_string();
    let mut lines = vec![header, rule];

    match table {
        TableRender::Empty => lines.push(format!("{:^101}", "No data points received").yellow().to_string()),
        TableRender::Rows(points) => {
            for point in points {
                lines.push(format!(
                    "{:<20} {:<14} {:<28} {:<32} {:<3}",
                    format_timestamp(point),
                    truncate(&point.broker, 14),
                    truncate(&point.topic, 28),
                    truncate(&point.payload.replace('\n', " "), 32),
                    point.qos
                ));
            }
        }
    }
    lines
}

/// The newest `height` lines of the log
pub fn log_lines(log: &LogRender, height: usize) -> Vec<String> {
    match log {
        LogRender::Empty => vec!["(terminal log is empty)".dimmed().to_string()],
        LogRender::Lines(lines) => {
            let flat: Vec<&str> = lines.iter().flat_map(|line| line.lines()).collect();
            let skip = flat.len().saturating_sub(height);
            flat[skip..].iter().map(|line| colorize_log_line(line)).collect()
        }
    }
}

fn colorize_log_line(line: &str) -> String {
    if line.contains("[ERROR]") {
        line.red().to_string()
    } else if line.contains("[SUCCESS]") {
        line.green().to_string()
    } else if line.contains("[DISCONNECT]") {
        line.yellow().to_string()
    } else {
        line.to_string()
    }
}
