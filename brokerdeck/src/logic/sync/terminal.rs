use crate::logic::client::gateway::ActionGateway;
use crate::logic::sync::announcer::StatusAnnouncer;
use crate::logic::sync::schedule::schedule_once;
use crate::logic::types::Ack;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum LogRender {
    /// nothing logged yet
    Empty,
    Lines(Vec<String>),
}

pub trait LogView {
    fn set_log_lines(&self, log: &LogRender);
    fn scroll_to_newest(&self);
}

/// Mirror of the service's command/terminal log.
///
/// The service owns ordering and retention, so every refresh replaces the
/// whole rendered log.
pub struct TerminalLog {
    gateway: Rc<ActionGateway>,
    announcer: Rc<StatusAnnouncer>,
    view: Rc<dyn LogView>,
    follow_up: Duration,
    clear_command: String,
}

impl TerminalLog {
    pub fn new(
        gateway: Rc<ActionGateway>,
        announcer: Rc<StatusAnnouncer>,
        view: Rc<dyn LogView>,
        follow_up: Duration,
        clear_command: String,
    ) -> Self {
        Self {
            gateway,
            announcer,
            view,
            follow_up,
            clear_command,
        }
    }

    pub async fn refresh(&self) {
        match self.gateway.terminal_logs().await {
            Ok(lines) => {
                let log = if lines.is_empty() {
                    LogRender::Empty
                } else {
                    LogRender::Lines(lines)
                };
                self.view.set_log_lines(&log);
                self.view.scroll_to_newest();
            }
            Err(e) => warn!(error = %e, "terminal log refresh failed"),
        }
    }

    /// Post a command and schedule one follow-up refresh, since the command's
    /// output only lands in the log after the reply. Returns whether the
    /// command was sent.
    pub async fn submit(self: &Rc<Self>, text: &str) -> bool {
        let command = text.trim();
        if command.is_empty() {
            return false;
        }

        match self.gateway.terminal_command(command).await {
            Ok(reply) => {
                // refusals (unknown command, ...) are logged by the service itself
                if let Ok(Err(refusal)) = serde_json::from_value::<Ack>(reply).map(Ack::into_result) {
                    debug!(%command, reason = %refusal, "command refused");
                }
                let this = Rc::clone(self);
                drop(schedule_once(self.follow_up, async move { this.refresh().await }));
                true
            }
            Err(e) => {
                self.announcer.error(format!("Command error: {}", e));
                false
            }
        }
    }

    /// Ask the service to wipe its log. Just an ordinary command.
    pub async fn clear(self: &Rc<Self>) -> bool {
        let token = self.clear_command.clone();
        self.submit(&token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::sync::testing::{settle, FakeTransport, Recorder};
    use serde_json::json;
    use tokio::task::LocalSet;
    use tokio::time::sleep;

    const LOGS: &str = "/api/terminal/logs";
    const COMMAND: &str = "/api/terminal/command";

    fn terminal(transport: &Rc<FakeTransport>, recorder: &Rc<Recorder>) -> Rc<TerminalLog> {
        let gateway = Rc::new(ActionGateway::new(transport.clone()));
        let announcer = Rc::new(StatusAnnouncer::new(recorder.clone(), Duration::from_millis(3000)));
        Rc::new(TerminalLog::new(
            gateway,
            announcer,
            recorder.clone(),
            Duration::from_millis(100),
            "clear".to_string(),
        ))
    }

    #[tokio::test]
    async fn test_refresh_replaces_and_scrolls() {
        let transport = Rc::new(FakeTransport::default());
        let recorder = Rc::new(Recorder::default());
        transport.reply(LOGS, json!(["[2024-05-01 10:00:00] [INFO] one"]));
        let terminal = terminal(&transport, &recorder);

        terminal.refresh().await;
        transport.reply(LOGS, json!(["[2024-05-01 10:00:00] [INFO] one", "[2024-05-01 10:00:01] [INFO] two"]));
        terminal.refresh().await;

        assert_eq!(
            recorder.logs().last(),
            Some(&LogRender::Lines(vec![
                "[2024-05-01 10:00:00] [INFO] one".to_string(),
                "[2024-05-01 10:00:01] [INFO] two".to_string()
            ]))
        );
        assert_eq!(recorder.scrolls(), 2);
    }

    #[tokio::test]
    async fn test_empty_log_renders_empty_marker() {
        let transport = Rc::new(FakeTransport::default());
        let recorder = Rc::new(Recorder::default());
        transport.reply(LOGS, json!([]));

        terminal(&transport, &recorder).refresh().await;
        assert_eq!(recorder.logs(), vec![LogRender::Empty]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_input_sends_nothing() {
        LocalSet::new()
            .run_until(async {
                let transport = Rc::new(FakeTransport::default());
                let recorder = Rc::new(Recorder::default());
                let terminal = terminal(&transport, &recorder);

                assert!(!terminal.submit("   \t ").await);
                sleep(Duration::from_millis(500)).await;
                settle().await;
                assert_eq!(transport.request_count(), 0);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_command_round_trip_refreshes_after_delay() {
        LocalSet::new()
            .run_until(async {
                let transport = Rc::new(FakeTransport::default());
                let recorder = Rc::new(Recorder::default());
                transport.reply(COMMAND, json!({"success": true}));
                transport.reply(LOGS, json!(["Connected brokers: 0"]));
                let terminal = terminal(&transport, &recorder);

                assert!(terminal.submit("  status ").await);
                assert_eq!(transport.last_request(COMMAND).unwrap().body, Some(json!({"command": "status"})));
                assert_eq!(transport.calls_to(LOGS), 0);

                sleep(Duration::from_millis(99)).await;
                settle().await;
                assert_eq!(transport.calls_to(LOGS), 0);

                sleep(Duration::from_millis(2)).await;
                settle().await;
                assert_eq!(transport.calls_to(LOGS), 1);
                assert_eq!(recorder.logs(), vec![LogRender::Lines(vec!["Connected brokers: 0".to_string()])]);

                sleep(Duration::from_millis(1000)).await;
                settle().await;
                assert_eq!(transport.calls_to(LOGS), 1, "exactly one follow-up");
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_refused_command_still_refreshes() {
        LocalSet::new()
            .run_until(async {
                let transport = Rc::new(FakeTransport::default());
                let recorder = Rc::new(Recorder::default());
                transport.reply(COMMAND, json!({"success": false, "message": "Unknown command"}));
                transport.reply(LOGS, json!(["[ERROR] Unknown command: frobnicate"]));
                let terminal = terminal(&transport, &recorder);

                assert!(terminal.submit("frobnicate").await);
                sleep(Duration::from_millis(150)).await;
                settle().await;
                assert_eq!(transport.calls_to(LOGS), 1);
                assert!(recorder.statuses().is_empty());
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_schedules_nothing() {
        LocalSet::new()
            .run_until(async {
                let transport = Rc::new(FakeTransport::default());
                let recorder = Rc::new(Recorder::default());
                transport.fail(COMMAND, "connection refused");
                transport.reply(LOGS, json!([]));
                let terminal = terminal(&transport, &recorder);

                assert!(!terminal.submit("status").await);
                sleep(Duration::from_millis(500)).await;
                settle().await;
                assert_eq!(transport.calls_to(LOGS), 0);
                assert_eq!(recorder.status().message, "Command error: connection refused");
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_is_an_ordinary_command() {
        LocalSet::new()
            .run_until(async {
                let transport = Rc::new(FakeTransport::default());
                let recorder = Rc::new(Recorder::default());
                transport.reply(COMMAND, json!({"success": true}));
                transport.reply(LOGS, json!(["[INFO] Terminal cleared"]));
                let terminal = terminal(&transport, &recorder);

                assert!(terminal.clear().await);
                assert_eq!(transport.last_request(COMMAND).unwrap().body, Some(json!({"command": "clear"})));
                sleep(Duration::from_millis(150)).await;
                settle().await;
                assert_eq!(recorder.logs(), vec![LogRender::Lines(vec!["[INFO] Terminal cleared".to_string()])]);
            })
            .await;
    }
}
