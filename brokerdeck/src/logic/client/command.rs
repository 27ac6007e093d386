use crate::logic::client::gateway::ActionGateway;
use crate::logic::types::Ack;
use anyhow::Context;
use colored::*;
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;

pub async fn logs(gateway: &ActionGateway) -> anyhow::Result<()> {
    let lines = gateway.terminal_logs().await?;
    if lines.is_empty() {
        println!("{}", "Terminal log is empty.".yellow());
    }
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

/// Send one terminal command, wait for the service to log its output, then
/// print the log.
pub async fn run(gateway: &ActionGateway, text: &str, follow_up: Duration) -> anyhow::Result<()> {
    let command = text.trim();
    if command.is_empty() {
        anyhow::bail!("empty command");
    }

    let reply = gateway.terminal_command(command).await?;
    if let Ok(Err(refusal)) = serde_json::from_value::<Ack>(reply).map(Ack::into_result) {
        eprintln!("{} {}", "✗".red(), refusal);
    }

    sleep(follow_up).await;
    logs(gateway).await
}

pub async fn export_sql(gateway: &ActionGateway, output: Option<&str>) -> anyhow::Result<()> {
    let export = gateway.export_sql().await?;
    match output {
        Some(path) => {
            let path = shellexpand::tilde(path).into_owned();
            write_sql(Path::new(&path), &export.sql)?;
            println!("{} SQL export written to {}", "✓".green(), path);
        }
        None => println!("{}", export.sql),
    }
    Ok(())
}

fn write_sql(path: &Path, sql: &str) -> anyhow::Result<()> {
    std::fs::write(path, sql).with_context(|| format!("cannot write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::sync::testing::FakeTransport;
    use serde_json::json;
    use std::rc::Rc;

    #[tokio::test(start_paused = true)]
    async fn test_command_posts_then_reads_log() {
        let transport = Rc::new(FakeTransport::default());
        transport.reply("/api/terminal/command", json!({"success": true}));
        transport.reply("/api/terminal/logs", json!(["> status", "Connected brokers: 1"]));
        let gateway = ActionGateway::new(transport.clone());

        run(&gateway, "  status ", Duration::from_millis(100)).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].body, Some(json!({"command": "status"})));
        assert_eq!(requests[1].path, "/api/terminal/logs");
    }

    #[tokio::test]
    async fn test_blank_command_sends_nothing() {
        let transport = Rc::new(FakeTransport::default());
        let gateway = ActionGateway::new(transport.clone());

        assert!(run(&gateway, "   ", Duration::ZERO).await.is_err());
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_export_sql_to_file() {
        let transport = Rc::new(FakeTransport::default());
        transport.reply("/api/data/export/sql", json!({"sql": "INSERT INTO mqtt_data VALUES (1);"}));
        let gateway = ActionGateway::new(transport.clone());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.sql");

        export_sql(&gateway, Some(&path.to_string_lossy())).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "INSERT INTO mqtt_data VALUES (1);");
    }
}
