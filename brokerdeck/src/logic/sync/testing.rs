//! In-memory transport and recording surfaces for the synchronizer tests.

use crate::logic::client::gateway::{GatewayError, Method, Transport};
use crate::logic::sync::announcer::StatusView;
use crate::logic::sync::export::{Clipboard, ExportView};
use crate::logic::sync::roster::{RosterRender, RosterView};
use crate::logic::sync::session::{FormKind, FormSurface};
use crate::logic::sync::table::{TableRender, TableView};
use crate::logic::sync::terminal::{LogRender, LogView};
use crate::logic::sync::visibility::PanelView;
use crate::logic::types::{DataPoint, Notification, Panel, Qos};
use async_trait::async_trait;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io;
use std::time::Duration;

/// Let spawned local tasks run until they block again
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

pub fn point(timestamp: &str, payload: &str) -> DataPoint {
    DataPoint {
        timestamp: timestamp.to_string(),
        broker: "plant".to_string(),
        topic: "plant/line1/temp".to_string(),
        payload: payload.to_string(),
        qos: Qos::AtMostOnce,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

/// Scripted service: each path answers with whatever was last configured,
/// optionally after a delay. The answer is captured when the request is made.
#[derive(Default)]
pub struct FakeTransport {
    replies: RefCell<HashMap<String, Result<String, GatewayError>>>,
    delays: RefCell<HashMap<String, Duration>>,
    requests: RefCell<Vec<RecordedRequest>>,
}

impl FakeTransport {
    pub fn reply(&self, path: &str, body: Value) {
        self.reply_raw(path, &body.to_string());
    }

    pub fn reply_raw(&self, path: &str, body: &str) {
        self.replies.borrow_mut().insert(path.to_string(), Ok(body.to_string()));
    }

    pub fn fail(&self, path: &str, message: &str) {
        self.replies
            .borrow_mut()
            .insert(path.to_string(), Err(GatewayError::network(message)));
    }

    pub fn delay(&self, path: &str, delay: Duration) {
        self.delays.borrow_mut().insert(path.to_string(), delay);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.requests.borrow().iter().filter(|r| r.path == path).count()
    }

    pub fn last_request(&self, path: &str) -> Option<RecordedRequest> {
        self.requests.borrow().iter().rev().find(|r| r.path == path).cloned()
    }
}

#[async_trait(?Send)]
impl Transport for FakeTransport {
    async fn send(&self, method: Method, path: &str, body: Option<String>) -> Result<String, GatewayError> {
        self.requests.borrow_mut().push(RecordedRequest {
            method,
            path: path.to_string(),
            body: body.map(|b| serde_json::from_str(&b).expect("request bodies are JSON")),
        });
        let reply = self
            .replies
            .borrow()
            .get(path)
            .cloned()
            .unwrap_or_else(|| Err(GatewayError::network(format!("no route for {}", path))));
        let delay = self.delays.borrow().get(path).copied().unwrap_or_default();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        reply
    }
}

/// Records every render on every surface
#[derive(Default)]
pub struct Recorder {
    statuses: RefCell<Vec<Notification>>,
    panels: RefCell<Vec<Panel>>,
    rosters: RefCell<Vec<RosterRender>>,
    tables: RefCell<Vec<TableRender>>,
    logs: RefCell<Vec<LogRender>>,
    scrolls: Cell<usize>,
    sql: RefCell<Vec<String>>,
    clipboard: RefCell<Vec<String>>,
    resets: RefCell<Vec<FormKind>>,
}

impl Recorder {
    /// What the status line shows right now
    pub fn status(&self) -> Notification {
        self.statuses.borrow().last().cloned().expect("nothing announced yet")
    }

    pub fn statuses(&self) -> Vec<Notification> {
        self.statuses.borrow().clone()
    }

    pub fn panels(&self) -> Vec<Panel> {
        self.panels.borrow().clone()
    }

    pub fn rosters(&self) -> Vec<RosterRender> {
        self.rosters.borrow().clone()
    }

    pub fn tables(&self) -> Vec<TableRender> {
        self.tables.borrow().clone()
    }

    pub fn logs(&self) -> Vec<LogRender> {
        self.logs.borrow().clone()
    }

    pub fn scrolls(&self) -> usize {
        self.scrolls.get()
    }

    pub fn sql(&self) -> Vec<String> {
        self.sql.borrow().clone()
    }

    pub fn clipboard(&self) -> Vec<String> {
        self.clipboard.borrow().clone()
    }

    pub fn resets(&self) -> Vec<FormKind> {
        self.resets.borrow().clone()
    }
}

impl StatusView for Recorder {
    fn show_status(&self, note: &Notification) {
        self.statuses.borrow_mut().push(note.clone());
    }
}

impl PanelView for Recorder {
    fn show_panel(&self, panel: Panel) {
        self.panels.borrow_mut().push(panel);
    }
}

impl RosterView for Recorder {
    fn set_roster_view(&self, roster: &RosterRender) {
        self.rosters.borrow_mut().push(roster.clone());
    }
}

impl TableView for Recorder {
    fn set_table_rows(&self, rows: &TableRender) {
        self.tables.borrow_mut().push(rows.clone());
    }
}

impl LogView for Recorder {
    fn set_log_lines(&self, log: &LogRender) {
        self.logs.borrow_mut().push(log.clone());
    }

    fn scroll_to_newest(&self) {
        self.scrolls.set(self.scrolls.get() + 1);
    }
}

impl ExportView for Recorder {
    fn show_sql(&self, sql: &str) {
        self.sql.borrow_mut().push(sql.to_string());
    }
}

impl Clipboard for Recorder {
    fn copy_text(&self, text: &str) -> io::Result<()> {
        self.clipboard.borrow_mut().push(text.to_string());
        Ok(())
    }
}

impl FormSurface for Recorder {
    fn reset_form(&self, form: FormKind) {
        self.resets.borrow_mut().push(form);
    }
}
