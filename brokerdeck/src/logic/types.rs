use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// MQTT quality-of-service level, carried on the wire as 0, 1 or 2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Qos {
    AtMostOnce,
    AtLeastOnce,
    ExactlyOnce,
}

impl TryFrom<u8> for Qos {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(Qos::AtMostOnce),
            1 => Ok(Qos::AtLeastOnce),
            2 => Ok(Qos::ExactlyOnce),
            other => Err(format!("QoS must be 0, 1 or 2, got {}", other)),
        }
    }
}

impl From<Qos> for u8 {
    fn from(qos: Qos) -> u8 {
        match qos {
            Qos::AtMostOnce => 0,
            Qos::AtLeastOnce => 1,
            Qos::ExactlyOnce => 2,
        }
    }
}

impl FromStr for Qos {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level: u8 = s
            .trim()
            .parse()
            .map_err(|_| format!("QoS must be 0, 1 or 2, got `{}`", s))?;
        Qos::try_from(level)
    }
}

impl fmt::Display for Qos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

/// Connection parameters for a broker, fixed at connect time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrokerSpec {
    pub broker_id: String,
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// One entry of the server-side broker roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokerEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected: Option<bool>,
}

/// A captured MQTT message as stored by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub timestamp: String,
    pub broker: String,
    pub topic: String,
    pub payload: String,
    pub qos: Qos,
}

impl DataPoint {
    /// Parsed receive time. The backend writes naive ISO-8601 local times,
    /// but an explicit offset is honoured when present.
    pub fn received_at(&self) -> Option<DateTime<Local>> {
        if let Ok(with_offset) = DateTime::parse_from_rfc3339(&self.timestamp) {
            return Some(with_offset.with_timezone(&Local));
        }
        let naive = NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
        Local.from_local_datetime(&naive).single()
    }
}

/// `{success, message?}` acknowledgement returned by every mutating endpoint
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SqlExport {
    pub sql: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisconnectRequest {
    pub broker_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscribeRequest {
    pub broker_id: String,
    pub topic: String,
    pub qos: Qos,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishRequest {
    pub broker_id: String,
    pub topic: String,
    pub payload: String,
    pub qos: Qos,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandRequest {
    pub command: String,
}

/// Severity coding of a status notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }

    /// Idle state the status line falls back to
    pub fn ready() -> Self {
        Self::new("Ready", Severity::Success)
    }
}

/// The panels of the console; exactly one is shown at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    Connections,
    Data,
    Terminal,
    Export,
}

impl Panel {
    pub const ALL: [Panel; 4] = [Panel::Connections, Panel::Data, Panel::Terminal, Panel::Export];

    pub fn title(self) -> &'static str {
        match self {
            Panel::Connections => "MQTT Connections",
            Panel::Data => "Data Points",
            Panel::Terminal => "Terminal",
            Panel::Export => "Export Data",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Panel::Connections => "connections",
            Panel::Data => "data",
            Panel::Terminal => "terminal",
            Panel::Export => "export",
        }
    }
}

impl FromStr for Panel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Panel::ALL
            .into_iter()
            .find(|panel| panel.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown panel `{}`", s))
    }
}
