use crate::logic::sync::session::FormKind;
use crate::logic::types::{BrokerSpec, Panel, PublishRequest, Qos, SubscribeRequest};
use std::path::PathBuf;
use thiserror::Error;

pub const HELP: &str = "\
:connections | :data | :terminal | :export      switch panel
connect <id> <host> [port] [username] [password]
disconnect <id>
brokers                                         reload the broker list
subscribe <broker> <topic> [qos]
publish <broker> <topic> <qos> <payload...>
refresh                                         reload the data table
clear-data
> <command>  or  !<command>                     send a terminal command
clear-terminal
export-sql | copy-sql | download-json [dir]
help | quit";

/// One console line, parsed
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Show(Panel),
    Connect(BrokerSpec),
    Disconnect(String),
    RefreshBrokers,
    Subscribe(SubscribeRequest),
    Publish(PublishRequest),
    RefreshData,
    ClearData,
    Command(String),
    ClearTerminal,
    ExportSql,
    DownloadJson(Option<PathBuf>),
    CopySql,
    Help,
    Quit,
}

impl Action {
    /// Form this action submits, and the text shown while it is pending.
    /// Credentials never make it into the text.
    pub fn form_draft(&self) -> Option<(FormKind, String)> {
        match self {
            Action::Connect(spec) => {
                let mut draft = format!("connect {} {}:{}", spec.broker_id, spec.host, spec.port);
                if spec.username.is_some() || spec.password.is_some() {
                    draft.push_str(" (credentials hidden)");
                }
                Some((FormKind::Connect, draft))
            }
            Action::Subscribe(request) => Some((
                FormKind::Subscribe,
                format!("subscribe {} {} qos {}", request.broker_id, request.topic, request.qos),
            )),
            Action::Publish(request) => Some((
                FormKind::Publish,
                format!(
                    "publish {} {} qos {}: {}",
                    request.broker_id, request.topic, request.qos, request.payload
                ),
            )),
            _ => None,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("Unknown command: {0} (type `help`)")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("Invalid port: {0}")]
    Port(String),
    #[error("Invalid QoS: {0} (use 0, 1 or 2)")]
    Qos(String),
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse(line: &str) -> Result<Option<Action>, InputError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    if let Some(command) = line.strip_prefix('>').or_else(|| line.strip_prefix('!')) {
        let command = command.trim();
        if command.is_empty() {
            return Err(InputError::Usage("> <command>"));
        }
        return Ok(Some(Action::Command(command.to_string())));
    }

    if let Some(name) = line.strip_prefix(':') {
        return name
            .trim()
            .parse::<Panel>()
            .map(|panel| Some(Action::Show(panel)))
            .map_err(|_| InputError::Unknown(line.to_string()));
    }

    let (word, rest) = split_word(line);
    let args: Vec<&str> = rest.split_whitespace().collect();
    let action = match word {
        "connect" => Action::Connect(connect_spec(&args)?),
        "disconnect" => match args.as_slice() {
            [id] => Action::Disconnect(id.to_string()),
            _ => return Err(InputError::Usage("disconnect <id>")),
        },
        "brokers" => Action::RefreshBrokers,
        "subscribe" => match args.as_slice() {
            [broker, topic] => Action::Subscribe(SubscribeRequest {
                broker_id: broker.to_string(),
                topic: topic.to_string(),
                qos: Qos::AtMostOnce,
            }),
            [broker, topic, qos] => Action::Subscribe(SubscribeRequest {
                broker_id: broker.to_string(),
                topic: topic.to_string(),
                qos: parse_qos(qos)?,
            }),
            _ => return Err(InputError::Usage("subscribe <broker> <topic> [qos]")),
        },
        "publish" => publish_request(rest)?,
        "refresh" => Action::RefreshData,
        "clear-data" => Action::ClearData,
        "clear-terminal" => Action::ClearTerminal,
        "export-sql" => Action::ExportSql,
        "download-json" => {
            Action::DownloadJson((!rest.is_empty()).then(|| PathBuf::from(shellexpand::tilde(rest).into_owned())))
        }
        "copy-sql" => Action::CopySql,
        "help" | "?" => Action::Help,
        "quit" | "exit" => Action::Quit,
        _ => return Err(InputError::Unknown(word.to_string())),
    };
    Ok(Some(action))
}

fn split_word(text: &str) -> (&str, &str) {
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (text, ""),
    }
}

fn parse_qos(raw: &str) -> Result<Qos, InputError> {
    raw.parse().map_err(|_| InputError::Qos(raw.to_string()))
}

fn connect_spec(args: &[&str]) -> Result<BrokerSpec, InputError> {
    const USAGE: &str = "connect <id> <host> [port] [username] [password]";
    let (id, host) = match args {
        [id, host, ..] if args.len() <= 5 => (id, host),
        _ => return Err(InputError::Usage(USAGE)),
    };
    let port = match args.get(2) {
        Some(raw) => raw.parse::<u16>().map_err(|_| InputError::Port(raw.to_string()))?,
        None => 1883,
    };
    Ok(BrokerSpec {
        broker_id: id.to_string(),
        host: host.to_string(),
        port,
        username: args.get(3).map(|s| s.to_string()),
        password: args.get(4).map(|s| s.to_string()),
    })
}

/// The payload is everything after the QoS, inner spacing kept
fn publish_request(rest: &str) -> Result<Action, InputError> {
    const USAGE: &str = "publish <broker> <topic> <qos> <payload...>";
    let (broker, rest) = split_word(rest);
    let (topic, rest) = split_word(rest);
    let (qos, payload) = split_word(rest);
    if broker.is_empty() || topic.is_empty() || qos.is_empty() {
        return Err(InputError::Usage(USAGE));
    }
    Ok(Action::Publish(PublishRequest {
        broker_id: broker.to_string(),
        topic: topic.to_string(),
        payload: payload.to_string(),
        qos: parse_qos(qos)?,
    }))
}
