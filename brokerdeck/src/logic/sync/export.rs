use crate::logic::client::gateway::{ActionGateway, Endpoint};
use crate::logic::sync::announcer::StatusAnnouncer;
use anyhow::Context;
use chrono::Utc;
use serde_json::Value;
use std::cell::RefCell;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::info;

pub trait ExportView {
    fn show_sql(&self, sql: &str);
}

pub trait Clipboard {
    fn copy_text(&self, text: &str) -> io::Result<()>;
}

/// One-shot export flows. None of these are polled.
pub struct Exporter {
    gateway: Rc<ActionGateway>,
    announcer: Rc<StatusAnnouncer>,
    view: Rc<dyn ExportView>,
    clipboard: Rc<dyn Clipboard>,
    window: usize,
    last_sql: RefCell<Option<String>>,
}

impl Exporter {
    pub fn new(
        gateway: Rc<ActionGateway>,
        announcer: Rc<StatusAnnouncer>,
        view: Rc<dyn ExportView>,
        clipboard: Rc<dyn Clipboard>,
        window: usize,
    ) -> Self {
        Self {
            gateway,
            announcer,
            view,
            clipboard,
            window,
            last_sql: RefCell::new(None),
        }
    }

    pub async fn export_sql(&self) -> bool {
        match self.gateway.export_sql().await {
            Ok(export) => {
                self.view.show_sql(&export.sql);
                self.last_sql.replace(Some(export.sql));
                self.announcer.success("SQL export generated");
                true
            }
            Err(e) => {
                self.announcer.error(format!("Error generating SQL: {}", e));
                false
            }
        }
    }

    /// Save a pretty-printed snapshot of up to `window` points into `dir`,
    /// exactly as the service sent them.
    pub async fn download_json(&self, dir: &Path) -> Option<PathBuf> {
        let saved = match self.gateway.call(Endpoint::DataPoints { limit: self.window }, None).await {
            Ok(points) => write_snapshot(dir, &points),
            Err(e) => Err(e.into()),
        };
        match saved {
            Ok(path) => {
                info!(path = %path.display(), "data point snapshot written");
                self.announcer.success("JSON downloaded");
                Some(path)
            }
            Err(e) => {
                self.announcer.error(format!("Error downloading JSON: {:#}", e));
                None
            }
        }
    }

    pub fn copy_sql(&self) -> bool {
        let sql = self.last_sql.borrow().clone();
        let copied = match sql {
            Some(sql) => self.clipboard.copy_text(&sql).map_err(|e| e.to_string()),
            None => Err("no SQL export generated yet".to_string()),
        };
        match copied {
            Ok(()) => {
                self.announcer.success("SQL copied to clipboard");
                true
            }
            Err(reason) => {
                self.announcer.error(format!("Failed to copy: {}", reason));
                false
            }
        }
    }
}

fn write_snapshot(dir: &Path, points: &Value) -> anyhow::Result<PathBuf> {
    let name = format!("mqtt_data_points_{}.json", Utc::now().format("%Y-%m-%dT%H-%M-%S%.3fZ"));
    let path = dir.join(name);
    let json = serde_json::to_string_pretty(points)?;
    std::fs::write(&path, json).with_context(|| format!("cannot write {}", path.display()))?;
    Ok(path)
}
