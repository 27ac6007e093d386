//! Interactive console: one screen, one session, one line of input per action.

pub mod input;
pub mod screen;

use crate::logic::client::transport::HttpTransport;
use crate::logic::config::ConsoleConfig;
use crate::logic::sync::{Session, Surfaces};
use crate::logic::types::Panel;
use input::Action;
use screen::Screen;
use std::future::Future;
use std::io::BufRead;
use std::rc::Rc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Run the console until `quit`, end of input or Ctrl+C.
/// Must be awaited inside a `LocalSet`.
pub async fn run(config: ConsoleConfig, root: String) -> anyhow::Result<()> {
    let transport = Rc::new(HttpTransport::new(root, config.request_timeout())?);
    let screen = Rc::new(Screen::stdout(format!("brokerdeck @ {}", transport.root())));
    info!(root = transport.root(), "console starting");
    let loading = format!("Loading from {}", transport.root());
    let session = Rc::new(Session::new(&config, transport, Surfaces::shared(Rc::clone(&screen))));

    session.activate(Panel::Connections);
    session.announcer().info(loading);
    session.start().await;

    let mut lines = spawn_line_reader()?;
    drive(&session, &screen, &mut lines, interrupted()).await;
    println!();
    Ok(())
}

/// Blocking stdin reads live on their own thread. A read in progress never
/// holds up shutdown: the thread is simply left behind when the process exits.
fn spawn_line_reader() -> anyhow::Result<mpsc::Receiver<String>> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::Builder::new()
        .name("console-stdin".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.blocking_send(line).is_err() {
                    break;
                }
            }
            debug!("stdin closed");
        })?;
    Ok(rx)
}

/// Resolves on Ctrl+C; never, if the signal cannot be watched
async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Input loop. Returns on `quit`, when `lines` closes, or when `interrupt`
/// resolves, and stops the session's polling either way.
async fn drive<I>(session: &Rc<Session>, screen: &Screen, lines: &mut mpsc::Receiver<String>, interrupt: I)
where
    I: Future<Output = ()>,
{
    tokio::pin!(interrupt);
    loop {
        let line = tokio::select! {
            line = lines.recv() => line,
            _ = &mut interrupt => None,
        };
        let Some(line) = line else { break };

        match input::parse(&line) {
            Ok(None) => screen.redraw(),
            Ok(Some(Action::Quit)) => break,
            Ok(Some(Action::Help)) => screen.toggle_help(),
            Ok(Some(action)) => {
                if let Some((form, draft)) = action.form_draft() {
                    screen.stage(form, draft);
                }
                dispatch(Rc::clone(session), action);
            }
            Err(e) => session.announcer().error(e.to_string()),
        }
    }
    session.shutdown();
}

/// Each action runs as its own task so a slow request never blocks input
fn dispatch(session: Rc<Session>, action: Action) {
    tokio::task::spawn_local(async move {
        match action {
            Action::Show(panel) => session.activate(panel),
            Action::Connect(spec) => session.connect_broker(&spec).await,
            Action::Disconnect(id) => session.disconnect_broker(&id).await,
            Action::RefreshBrokers => session.refresh_brokers().await,
            Action::Subscribe(request) => session.subscribe(&request).await,
            Action::Publish(request) => session.publish(&request).await,
            Action::RefreshData => session.refresh_data().await,
            Action::ClearData => session.clear_data().await,
            Action::Command(text) => session.submit_command(&text).await,
            Action::ClearTerminal => session.clear_terminal().await,
            Action::ExportSql => session.export_sql().await,
            Action::DownloadJson(dir) => {
                session.download_json(dir.as_deref()).await;
            }
            Action::CopySql => session.copy_sql(),
            // handled by the input loop
            Action::Help | Action::Quit => {}
        }
    });
}
