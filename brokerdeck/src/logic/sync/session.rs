use crate::logic::client::gateway::{ActionGateway, Transport};
use crate::logic::config::ConsoleConfig;
use crate::logic::sync::announcer::{StatusAnnouncer, StatusView};
use crate::logic::sync::export::{Clipboard, ExportView, Exporter};
use crate::logic::sync::roster::{BrokerRoster, RosterView};
use crate::logic::sync::schedule::RepeatingTask;
use crate::logic::sync::table::{DataTable, TableView};
use crate::logic::sync::terminal::{LogView, TerminalLog};
use crate::logic::sync::visibility::{PanelView, VisibilityRouter};
use crate::logic::types::{Ack, BrokerSpec, Panel, PublishRequest, SubscribeRequest};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Connect,
    Subscribe,
    Publish,
}

/// Input forms that are cleared after an accepted submission
pub trait FormSurface {
    fn reset_form(&self, form: FormKind);
}

/// Every render target a session draws on
pub struct Surfaces {
    pub status: Rc<dyn StatusView>,
    pub panels: Rc<dyn PanelView>,
    pub roster: Rc<dyn RosterView>,
    pub table: Rc<dyn TableView>,
    pub log: Rc<dyn LogView>,
    pub export: Rc<dyn ExportView>,
    pub clipboard: Rc<dyn Clipboard>,
    pub forms: Rc<dyn FormSurface>,
}

impl Surfaces {
    /// All regions drawn by one object, e.g. a whole-screen renderer
    pub fn shared<S>(surface: Rc<S>) -> Self
    where
        S: StatusView + PanelView + RosterView + TableView + LogView + ExportView + Clipboard + FormSurface + 'static,
    {
        Self {
            status: surface.clone(),
            panels: surface.clone(),
            roster: surface.clone(),
            table: surface.clone(),
            log: surface.clone(),
            export: surface.clone(),
            clipboard: surface.clone(),
            forms: surface,
        }
    }
}

/// One operator session: owns the synchronizers, their timers and the
/// status line, and turns form submissions into gateway calls.
pub struct Session {
    gateway: Rc<ActionGateway>,
    announcer: Rc<StatusAnnouncer>,
    router: Rc<VisibilityRouter>,
    roster: Rc<BrokerRoster>,
    table: Rc<DataTable>,
    terminal: Rc<TerminalLog>,
    exporter: Exporter,
    forms: Rc<dyn FormSurface>,
    config: ConsoleConfig,
    timers: RefCell<Vec<RepeatingTask>>,
}

impl Session {
    pub fn new(config: &ConsoleConfig, transport: Rc<dyn Transport>, surfaces: Surfaces) -> Self {
        let gateway = Rc::new(ActionGateway::new(transport));
        let announcer = Rc::new(StatusAnnouncer::new(surfaces.status, config.status_reset()));
        let router = Rc::new(VisibilityRouter::new(surfaces.panels));
        let roster = Rc::new(BrokerRoster::new(
            Rc::clone(&gateway),
            Rc::clone(&announcer),
            surfaces.roster,
        ));
        let table = Rc::new(DataTable::new(
            Rc::clone(&gateway),
            Rc::clone(&announcer),
            Rc::clone(&router),
            surfaces.table,
            config.live_window,
        ));
        let terminal = Rc::new(TerminalLog::new(
            Rc::clone(&gateway),
            Rc::clone(&announcer),
            surfaces.log,
            config.command_refresh_delay(),
            config.clear_command.clone(),
        ));
        let exporter = Exporter::new(
            Rc::clone(&gateway),
            Rc::clone(&announcer),
            surfaces.export,
            surfaces.clipboard,
            config.export_window,
        );

        Self {
            gateway,
            announcer,
            router,
            roster,
            table,
            terminal,
            exporter,
            forms: surfaces.forms,
            config: config.clone(),
            timers: RefCell::new(Vec::new()),
        }
    }

    /// Start both polling loops, then load every view once. The initial data
    /// fetch ignores panel visibility. Must run inside a `LocalSet`.
    pub async fn start(&self) {
        if !self.timers.borrow().is_empty() {
            warn!("session already started");
            return;
        }

        let table = Rc::clone(&self.table);
        let data_timer = RepeatingTask::start(self.config.data_refresh(), move || {
            let table = Rc::clone(&table);
            async move { table.tick().await }
        });
        let terminal = Rc::clone(&self.terminal);
        let terminal_timer = RepeatingTask::start(self.config.terminal_refresh(), move || {
            let terminal = Rc::clone(&terminal);
            async move { terminal.refresh().await }
        });
        self.timers.replace(vec![data_timer, terminal_timer]);
        info!(
            data_ms = self.config.data_refresh_ms,
            terminal_ms = self.config.terminal_refresh_ms,
            "session started"
        );

        tokio::join!(self.roster.refresh(), self.terminal.refresh(), self.table.fetch());
    }

    /// Stop the polling loops. Requests already in flight still land.
    pub fn shutdown(&self) {
        for timer in self.timers.borrow_mut().drain(..) {
            timer.cancel();
        }
        info!("session stopped");
    }

    pub fn is_running(&self) -> bool {
        !self.timers.borrow().is_empty()
    }

    pub fn announcer(&self) -> &StatusAnnouncer {
        &self.announcer
    }

    #[cfg(test)]
    pub fn router(&self) -> &VisibilityRouter {
        &self.router
    }

    pub fn activate(&self, panel: Panel) {
        self.router.activate(panel);
    }

    pub async fn connect_broker(&self, spec: &BrokerSpec) {
        if self.roster.connect(spec).await {
            self.forms.reset_form(FormKind::Connect);
        }
    }

    pub async fn disconnect_broker(&self, broker_id: &str) {
        self.roster.disconnect(broker_id).await;
    }

    pub async fn refresh_brokers(&self) {
        self.roster.refresh().await;
    }

    pub async fn subscribe(&self, request: &SubscribeRequest) {
        match self.gateway.subscribe(request).await.and_then(Ack::into_result) {
            Ok(_) => {
                self.announcer.success(format!("Subscribed to {}", request.topic));
                self.forms.reset_form(FormKind::Subscribe);
            }
            Err(e) => self
                .announcer
                .error(e.describe("Failed to subscribe", "Subscription error")),
        }
    }

    pub async fn publish(&self, request: &PublishRequest) {
        match self.gateway.publish(request).await.and_then(Ack::into_result) {
            Ok(_) => {
                self.announcer.success("Message published");
                self.forms.reset_form(FormKind::Publish);
            }
            Err(e) => self.announcer.error(e.describe("Failed to publish", "Publish error")),
        }
    }

    /// Manual refresh of the data table
    pub async fn refresh_data(&self) {
        self.table.fetch().await;
    }

    pub async fn clear_data(&self) {
        self.table.clear().await;
    }

    pub async fn submit_command(&self, text: &str) {
        self.terminal.submit(text).await;
    }

    pub async fn clear_terminal(&self) {
        self.terminal.clear().await;
    }

    pub async fn export_sql(&self) {
        self.exporter.export_sql().await;
    }

    /// Falls back to the configured download directory
    pub async fn download_json(&self, dir: Option<&Path>) -> Option<PathBuf> {
        let fallback = self.config.download_dir();
        self.exporter.download_json(dir.unwrap_or(fallback.as_path())).await
    }

    pub fn copy_sql(&self) {
        self.exporter.copy_sql();
    }

    #[cfg(test)]
    pub fn opened_here(&self) -> Vec<String> {
        self.roster.opened_here()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.is_running() {
            self.shutdown();
        }
    }
}
