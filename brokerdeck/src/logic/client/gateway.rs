use crate::logic::types::{
    Ack, BrokerEntry, BrokerSpec, CommandRequest, DataPoint, DisconnectRequest, PublishRequest,
    SqlExport, SubscribeRequest,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::rc::Rc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Which side of the exchange an operation failed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Transport error, or a body that is not the JSON we expect
    NetworkFailure,
    /// Well-formed answer whose success flag is false or missing
    ApplicationFailure,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GatewayError {
    pub kind: FailureKind,
    pub message: String,
}

impl GatewayError {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::NetworkFailure,
            message: message.into(),
        }
    }

    pub fn application(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::ApplicationFailure,
            message: message.into(),
        }
    }

    /// Operator-facing text: `rejected` prefixes server refusals,
    /// `errored` prefixes transport problems.
    pub fn describe(&self, rejected: &str, errored: &str) -> String {
        match self.kind {
            FailureKind::ApplicationFailure => format!("{}: {}", rejected, self.message),
            FailureKind::NetworkFailure => format!("{}: {}", errored, self.message),
        }
    }
}

impl Ack {
    /// Promote a `success: false` acknowledgement into an application failure.
    pub fn into_result(self) -> Result<Option<String>, GatewayError> {
        if self.success {
            Ok(self.message)
        } else {
            Err(GatewayError::application(
                self.message.unwrap_or_else(|| "no reason given".to_string()),
            ))
        }
    }
}

/// The management API surface, one variant per endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    ConnectBroker,
    DisconnectBroker,
    ListBrokers,
    Subscribe,
    Publish,
    DataPoints { limit: usize },
    ClearData,
    TerminalLogs,
    TerminalCommand,
    ExportSql,
}

impl Endpoint {
    pub fn method(&self) -> Method {
        match self {
            Endpoint::ListBrokers
            | Endpoint::DataPoints { .. }
            | Endpoint::TerminalLogs
            | Endpoint::ExportSql => Method::Get,
            Endpoint::ConnectBroker
            | Endpoint::DisconnectBroker
            | Endpoint::Subscribe
            | Endpoint::Publish
            | Endpoint::ClearData
            | Endpoint::TerminalCommand => Method::Post,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Endpoint::ConnectBroker => "/api/brokers/connect".to_string(),
            Endpoint::DisconnectBroker => "/api/brokers/disconnect".to_string(),
            Endpoint::ListBrokers => "/api/brokers".to_string(),
            Endpoint::Subscribe => "/api/topics/subscribe".to_string(),
            Endpoint::Publish => "/api/topics/publish".to_string(),
            Endpoint::DataPoints { limit } => format!("/api/data/points?limit={}", limit),
            Endpoint::ClearData => "/api/data/clear".to_string(),
            Endpoint::TerminalLogs => "/api/terminal/logs".to_string(),
            Endpoint::TerminalCommand => "/api/terminal/command".to_string(),
            Endpoint::ExportSql => "/api/data/export/sql".to_string(),
        }
    }
}

/// One raw HTTP exchange. Implementations return the response body whatever
/// the status code; only a failed exchange is an error.
#[async_trait(?Send)]
pub trait Transport {
    async fn send(&self, method: Method, path: &str, body: Option<String>) -> Result<String, GatewayError>;
}

/// JSON request/response wrapper around the management API.
///
/// The gateway never looks at `success` flags: endpoints disagree on how they
/// signal success, so that is left to the caller (see [`Ack::into_result`]).
pub struct ActionGateway {
    transport: Rc<dyn Transport>,
}

impl ActionGateway {
    pub fn new(transport: Rc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn call(&self, endpoint: Endpoint, body: Option<Value>) -> Result<Value, GatewayError> {
        let method = endpoint.method();
        let path = endpoint.path();
        debug!(?method, %path, "api request");

        let text = self
            .transport
            .send(method, &path, body.map(|b| b.to_string()))
            .await?;
        serde_json::from_str(&text)
            .map_err(|e| GatewayError::network(format!("invalid JSON from {}: {}", path, e)))
    }

    /// `call` plus deserialization into the endpoint's response schema
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        body: Option<Value>,
    ) -> Result<T, GatewayError> {
        let value = self.call(endpoint, body).await?;
        serde_json::from_value(value).map_err(|e| {
            GatewayError::network(format!("unexpected response from {}: {}", endpoint.path(), e))
        })
    }

    async fn submit<B: Serialize>(&self, endpoint: Endpoint, form: &B) -> Result<Ack, GatewayError> {
        let body = serde_json::to_value(form)
            .map_err(|e| GatewayError::network(format!("could not encode request: {}", e)))?;
        self.request(endpoint, Some(body)).await
    }

    pub async fn list_brokers(&self) -> Result<Vec<BrokerEntry>, GatewayError> {
        self.request(Endpoint::ListBrokers, None).await
    }

    pub async fn connect_broker(&self, spec: &BrokerSpec) -> Result<Ack, GatewayError> {
        self.submit(Endpoint::ConnectBroker, spec).await
    }

    pub async fn disconnect_broker(&self, broker_id: &str) -> Result<Ack, GatewayError> {
        let request = DisconnectRequest {
            broker_id: broker_id.to_string(),
        };
        self.submit(Endpoint::DisconnectBroker, &request).await
    }

    pub async fn subscribe(&self, request: &SubscribeRequest) -> Result<Ack, GatewayError> {
        self.submit(Endpoint::Subscribe, request).await
    }

    pub async fn publish(&self, request: &PublishRequest) -> Result<Ack, GatewayError> {
        self.submit(Endpoint::Publish, request).await
    }

    /// Most recent `limit` points, oldest first
    pub async fn data_points(&self, limit: usize) -> Result<Vec<DataPoint>, GatewayError> {
        self.request(Endpoint::DataPoints { limit }, None).await
    }

    pub async fn clear_data(&self) -> Result<Ack, GatewayError> {
        self.request(Endpoint::ClearData, None).await
    }

    pub async fn terminal_logs(&self) -> Result<Vec<String>, GatewayError> {
        self.request(Endpoint::TerminalLogs, None).await
    }

    /// The reply is returned but carries nothing the console relies on:
    /// the command's output shows up in the terminal log later.
    pub async fn terminal_command(&self, command: &str) -> Result<Value, GatewayError> {
        let request = CommandRequest {
            command: command.to_string(),
        };
        let body = serde_json::to_value(&request)
            .map_err(|e| GatewayError::network(format!("could not encode request: {}", e)))?;
        self.call(Endpoint::TerminalCommand, Some(body)).await
    }

    pub async fn export_sql(&self) -> Result<SqlExport, GatewayError> {
        self.request(Endpoint::ExportSql, None).await
    }
}
