use crate::logic::client::gateway::ActionGateway;
use crate::logic::sync::announcer::StatusAnnouncer;
use crate::logic::sync::visibility::VisibilityRouter;
use crate::logic::types::{Ack, DataPoint, Panel};
use std::rc::Rc;
use tracing::{info, warn};

pub const TABLE_COLUMNS: [&str; 5] = ["Timestamp", "Broker", "Topic", "Payload", "QoS"];

#[derive(Debug, Clone, PartialEq)]
pub enum TableRender {
    /// "No data points received", one row spanning every column
    Empty,
    /// newest first
    Rows(Vec<DataPoint>),
}

impl TableRender {
    /// The service answers oldest-first; the live feed reads newest-first.
    pub fn newest_first(mut points: Vec<DataPoint>) -> Self {
        if points.is_empty() {
            return TableRender::Empty;
        }
        points.reverse();
        TableRender::Rows(points)
    }
}

pub trait TableView {
    fn set_table_rows(&self, rows: &TableRender);
}

/// Live view of the most recent data points.
///
/// Polled on a timer by the session; `tick` skips the request entirely while
/// the data panel is hidden.
pub struct DataTable {
    gateway: Rc<ActionGateway>,
    announcer: Rc<StatusAnnouncer>,
    router: Rc<VisibilityRouter>,
    view: Rc<dyn TableView>,
    window: usize,
}

impl DataTable {
    pub fn new(
        gateway: Rc<ActionGateway>,
        announcer: Rc<StatusAnnouncer>,
        router: Rc<VisibilityRouter>,
        view: Rc<dyn TableView>,
        window: usize,
    ) -> Self {
        Self {
            gateway,
            announcer,
            router,
            view,
            window,
        }
    }

    /// Scheduled refresh; a no-op while the data panel is not shown.
    pub async fn tick(&self) {
        if !self.router.is_active(Panel::Data) {
            return;
        }
        self.fetch().await;
    }

    /// Fetch and render regardless of visibility
    pub async fn fetch(&self) {
        match self.gateway.data_points(self.window).await {
            Ok(points) => self.view.set_table_rows(&TableRender::newest_first(points)),
            Err(e) => warn!(error = %e, "data point refresh failed"),
        }
    }

    /// Destructive clear, followed at once by an ungated fetch so the empty
    /// table shows without waiting for the next tick.
    pub async fn clear(&self) -> bool {
        let outcome = self.gateway.clear_data().await.and_then(Ack::into_result);
        match outcome {
            Ok(_) => {
                info!("data points cleared");
                self.announcer.success("Data cleared");
                self.fetch().await;
                true
            }
            Err(e) => {
                self.announcer.error(e.describe("Failed to clear data", "Error clearing data"));
                false
            }
        }
    }
}
