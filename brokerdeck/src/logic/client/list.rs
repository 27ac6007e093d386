use crate::cli::OutputFormat;
use crate::logic::client::gateway::ActionGateway;
use crate::logic::display;
use crate::logic::sync::roster::RosterRender;
use crate::logic::sync::table::TableRender;
use chrono::Local;
use colored::*;
use std::collections::BTreeSet;
use std::time::Duration;
use tokio::time::sleep;

pub async fn brokers(gateway: &ActionGateway, format: OutputFormat) -> anyhow::Result<()> {
    let brokers = gateway.list_brokers().await?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&brokers)?),
        OutputFormat::Table => {
            let roster = RosterRender::from_entries(brokers, &BTreeSet::new());
            for line in display::roster_lines(&roster) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

/// Points newest first, like the console table
async fn render_points(gateway: &ActionGateway, limit: usize, format: &OutputFormat) -> anyhow::Result<String> {
    let points = gateway.data_points(limit).await?;
    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&points)?,
        OutputFormat::Table => {
            let table = TableRender::newest_first(points);
            display::table_lines(&table).join("\n")
        }
    };
    Ok(text)
}

pub async fn points(
    gateway: &ActionGateway,
    limit: usize,
    format: OutputFormat,
    watch: bool,
    interval: u64,
) -> anyhow::Result<()> {
    if !watch {
        println!("{}", render_points(gateway, limit, &format).await?);
        return Ok(());
    }

    println!("{}", "Watch mode enabled. Press Ctrl+C to exit...".bright_cyan().bold());
    loop {
        print!("\x1B[2J\x1B[1;1H");
        println!("{} {}", "Last updated:".bright_cyan(), Local::now().format("%Y-%m-%d %H:%M:%S"));
        println!();

        match render_points(gateway, limit, &format).await {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("{} {}", "Error:".red().bold(), e),
        }

        sleep(Duration::from_secs(interval)).await;
    }
}
