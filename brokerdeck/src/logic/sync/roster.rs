use crate::logic::client::gateway::ActionGateway;
use crate::logic::sync::announcer::StatusAnnouncer;
use crate::logic::types::{Ack, BrokerEntry, BrokerSpec};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct RosterRow {
    pub id: String,
    pub connected: Option<bool>,
    /// connected from this session; a display hint only
    pub opened_here: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RosterRender {
    /// "No active connections"
    Empty,
    Brokers(Vec<RosterRow>),
}

impl RosterRender {
    /// Server roster in server order; `opened_here` only annotates rows
    pub fn from_entries(brokers: Vec<BrokerEntry>, opened_here: &BTreeSet<String>) -> Self {
        if brokers.is_empty() {
            return RosterRender::Empty;
        }
        RosterRender::Brokers(
            brokers
                .into_iter()
                .map(|entry| RosterRow {
                    opened_here: opened_here.contains(&entry.id),
                    id: entry.id,
                    connected: entry.connected,
                })
                .collect(),
        )
    }
}

pub trait RosterView {
    fn set_roster_view(&self, roster: &RosterRender);
}

/// Broker roster, refreshed on explicit triggers only.
///
/// The server roster is the source of truth. `opened_here` is a local cache
/// of ids this session connected, used only to annotate the rendered rows.
pub struct BrokerRoster {
    gateway: Rc<ActionGateway>,
    announcer: Rc<StatusAnnouncer>,
    view: Rc<dyn RosterView>,
    opened_here: RefCell<BTreeSet<String>>,
}

impl BrokerRoster {
    pub fn new(gateway: Rc<ActionGateway>, announcer: Rc<StatusAnnouncer>, view: Rc<dyn RosterView>) -> Self {
        Self {
            gateway,
            announcer,
            view,
            opened_here: RefCell::new(BTreeSet::new()),
        }
    }

    /// Fetch the roster and replace the rendered list. On failure the last
    /// render stays up.
    pub async fn refresh(&self) {
        match self.gateway.list_brokers().await {
            Ok(brokers) => self.view.set_roster_view(&self.render(brokers)),
            Err(e) => warn!(error = %e, "broker roster refresh failed"),
        }
    }

    fn render(&self, brokers: Vec<BrokerEntry>) -> RosterRender {
        RosterRender::from_entries(brokers, &self.opened_here.borrow())
    }

    /// Returns whether the service accepted the connection.
    pub async fn connect(&self, spec: &BrokerSpec) -> bool {
        let outcome = self.gateway.connect_broker(spec).await.and_then(Ack::into_result);
        match outcome {
            Ok(_) => {
                info!(broker = %spec.broker_id, host = %spec.host, port = spec.port, "broker connected");
                self.announcer.success("Broker connected successfully");
                self.opened_here.borrow_mut().insert(spec.broker_id.clone());
                self.refresh().await;
                true
            }
            Err(e) => {
                self.announcer.error(e.describe("Failed to connect", "Connection error"));
                false
            }
        }
    }

    pub async fn disconnect(&self, broker_id: &str) -> bool {
        let outcome = self.gateway.disconnect_broker(broker_id).await.and_then(Ack::into_result);
        match outcome {
            Ok(_) => {
                info!(broker = %broker_id, "broker disconnected");
                self.announcer.success("Broker disconnected");
                self.opened_here.borrow_mut().remove(broker_id);
                self.refresh().await;
                true
            }
            Err(e) => {
                self.announcer.error(e.describe("Failed to disconnect", "Disconnect error"));
                false
            }
        }
    }

    #[cfg(test)]
    pub fn opened_here(&self) -> Vec<String> {
        self.opened_here.borrow().iter().cloned().collect()
    }
}
