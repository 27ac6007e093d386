use crate::logic::console::input::HELP;
use crate::logic::display;
use crate::logic::sync::announcer::StatusView;
use crate::logic::sync::export::{Clipboard, ExportView};
use crate::logic::sync::roster::{RosterRender, RosterView};
use crate::logic::sync::table::{TableRender, TableView};
use crate::logic::sync::terminal::{LogRender, LogView};
use crate::logic::sync::visibility::PanelView;
use crate::logic::sync::session::{FormKind, FormSurface};
use crate::logic::types::{Notification, Panel};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use colored::*;
use std::cell::RefCell;
use std::io::{self, Write};
use tracing::warn;

const LOG_HEIGHT: usize = 20;

struct ScreenState {
    panel: Option<Panel>,
    status: Notification,
    roster: RosterRender,
    table: TableRender,
    log: LogRender,
    sql: Option<String>,
    show_help: bool,
    /// submitted form lines not yet accepted by the service
    drafts: Vec<(FormKind, String)>,
}

/// Full-screen renderer for the console. Keeps the last render of every
/// region and repaints when something visible changes.
pub struct Screen {
    title: String,
    state: RefCell<ScreenState>,
    out: RefCell<Box<dyn Write>>,
}

impl Screen {
    pub fn new(title: impl Into<String>, out: Box<dyn Write>) -> Self {
        Self {
            title: title.into(),
            state: RefCell::new(ScreenState {
                panel: None,
                status: Notification::ready(),
                roster: RosterRender::Empty,
                table: TableRender::Empty,
                log: LogRender::Empty,
                sql: None,
                show_help: false,
                drafts: Vec::new(),
            }),
            out: RefCell::new(out),
        }
    }

    pub fn stdout(title: impl Into<String>) -> Self {
        Self::new(title, Box::new(io::stdout()))
    }

    /// Show a submitted form until the service accepts it. `draft` comes
    /// from `Action::form_draft`, never the raw input line.
    pub fn stage(&self, form: FormKind, draft: String) {
        let mut state = self.state.borrow_mut();
        state.drafts.retain(|(kind, _)| *kind != form);
        state.drafts.push((form, draft));
    }

    pub fn toggle_help(&self) {
        {
            let mut state = self.state.borrow_mut();
            state.show_help = !state.show_help;
        }
        self.redraw();
    }

    fn shows(&self, panel: Panel) -> bool {
        self.state.borrow().panel == Some(panel)
    }

    pub fn frame(&self) -> String {
        let state = self.state.borrow();
        let mut lines = Vec::new();

        let tabs: Vec<String> = Panel::ALL
            .iter()
            .map(|panel| {
                if state.panel == Some(*panel) {
                    format!("[{}]", panel.name()).bright_cyan().bold().to_string()
                } else {
                    format!(" {} ", panel.name()).dimmed().to_string()
                }
            })
            .collect();
        lines.push(format!("{}  {}", self.title.bright_white().bold(), tabs.join(" ")));
        lines.push(display::status_line(&state.status));
        lines.push(String::new());

        match state.panel {
            None => lines.push("Select a panel: :connections  :data  :terminal  :export".yellow().to_string()),
            Some(panel) => {
                lines.push(panel.title().bright_white().bold().underline().to_string());
                match panel {
                    Panel::Connections => lines.extend(display::roster_lines(&state.roster)),
                    Panel::Data => lines.extend(display::table_lines(&state.table)),
                    Panel::Terminal => lines.extend(display::log_lines(&state.log, LOG_HEIGHT)),
                    Panel::Export => match &state.sql {
                        Some(sql) => lines.extend(sql.lines().map(str::to_string)),
                        None => lines.push("No SQL export yet (export-sql)".dimmed().to_string()),
                    },
                }
            }
        }

        if !state.drafts.is_empty() {
            lines.push(String::new());
            for (form, line) in &state.drafts {
                lines.push(format!("{} {:?}: {}", "pending".yellow(), form, line));
            }
        }
        if state.show_help {
            lines.push(String::new());
            lines.push(HELP.to_string());
        }
        lines.join("\n")
    }

    pub fn redraw(&self) {
        let frame = self.frame();
        let mut out = self.out.borrow_mut();
        let drawn = write!(out, "\x1B[2J\x1B[1;1H{}\n\n> ", frame).and_then(|_| out.flush());
        if let Err(e) = drawn {
            warn!(error = %e, "cannot draw screen");
        }
    }
}

impl StatusView for Screen {
    fn show_status(&self, note: &Notification) {
        self.state.borrow_mut().status = note.clone();
        self.redraw();
    }
}

impl PanelView for Screen {
    fn show_panel(&self, panel: Panel) {
        self.state.borrow_mut().panel = Some(panel);
        self.redraw();
    }
}

impl RosterView for Screen {
    fn set_roster_view(&self, roster: &RosterRender) {
        self.state.borrow_mut().roster = roster.clone();
        if self.shows(Panel::Connections) {
            self.redraw();
        }
    }
}

impl TableView for Screen {
    fn set_table_rows(&self, rows: &TableRender) {
        self.state.borrow_mut().table = rows.clone();
        if self.shows(Panel::Data) {
            self.redraw();
        }
    }
}

impl LogView for Screen {
    fn set_log_lines(&self, log: &LogRender) {
        self.state.borrow_mut().log = log.clone();
    }

    // the terminal panel always shows the tail
    fn scroll_to_newest(&self) {
        if self.shows(Panel::Terminal) {
            self.redraw();
        }
    }
}

impl ExportView for Screen {
    fn show_sql(&self, sql: &str) {
        self.state.borrow_mut().sql = Some(sql.to_string());
        if self.shows(Panel::Export) {
            self.redraw();
        }
    }
}

/// OSC 52: the terminal emulator puts the payload on the system clipboard
impl Clipboard for Screen {
    fn copy_text(&self, text: &str) -> io::Result<()> {
        let mut out = self.out.borrow_mut();
        write!(out, "\x1B]52;c;{}\x07", STANDARD.encode(text))?;
        out.flush()
    }
}

impl FormSurface for Screen {
    fn reset_form(&self, form: FormKind) {
        let removed = {
            let mut state = self.state.borrow_mut();
            let before = state.drafts.len();
            state.drafts.retain(|(kind, _)| *kind != form);
            state.drafts.len() != before
        };
        if removed {
            self.redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::console::input::parse;
    use crate::logic::sync::testing::point;
    use crate::logic::types::Severity;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct SharedBuf(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn take(&self) -> String {
            String::from_utf8(std::mem::take(&mut *self.0.borrow_mut())).unwrap()
        }
    }

    fn screen() -> (Screen, SharedBuf) {
        let buf = SharedBuf::default();
        (Screen::new("brokerdeck", Box::new(buf.clone())), buf)
    }

    #[test]
    fn test_hidden_regions_update_without_redraw() {
        let (screen, buf) = screen();
        screen.show_panel(Panel::Connections);
        buf.take();

        screen.set_table_rows(&TableRender::Rows(vec![point("2024-05-01T10:00:00", "21.5")]));
        assert!(buf.take().is_empty());

        screen.show_panel(Panel::Data);
        let drawn = buf.take();
        assert!(drawn.starts_with("\x1B[2J"));
        assert!(drawn.contains("21.5"));
    }

    #[test]
    fn test_status_always_redraws() {
        let (screen, buf) = screen();
        screen.show_status(&Notification::new("Broker connected successfully", Severity::Success));
        assert!(buf.take().contains("Broker connected successfully"));
        assert!(screen.frame().contains("Select a panel"));
    }

    #[test]
    fn test_each_panel_shows_its_region() {
        let (screen, _buf) = screen();
        screen.set_log_lines(&LogRender::Lines(vec!["[SUCCESS] Connected to plant".to_string()]));
        screen.show_sql("CREATE TABLE mqtt_data (id INTEGER);");

        screen.show_panel(Panel::Terminal);
        assert!(screen.frame().contains("Connected to plant"));
        assert!(!screen.frame().contains("CREATE TABLE"));

        screen.show_panel(Panel::Export);
        assert!(screen.frame().contains("CREATE TABLE mqtt_data"));
        assert!(screen.frame().contains("Export Data"));
    }

    #[test]
    fn test_clipboard_uses_osc52() {
        let (screen, buf) = screen();
        screen.copy_text("SELECT 1;").unwrap();
        assert_eq!(buf.take(), format!("\x1B]52;c;{}\x07", STANDARD.encode("SELECT 1;")));
    }

    fn stage_line(screen: &Screen, line: &str) {
        let action = parse(line).unwrap().unwrap();
        let (form, draft) = action.form_draft().unwrap();
        screen.stage(form, draft);
    }

    #[test]
    fn test_accepted_form_clears_its_draft() {
        let (screen, _buf) = screen();
        stage_line(&screen, "connect plant broker.local");
        stage_line(&screen, "publish plant t 0 on");
        assert!(screen.frame().contains("connect plant broker.local:1883"));

        screen.reset_form(FormKind::Connect);
        let frame = screen.frame();
        assert!(!frame.contains("connect plant broker.local"));
        assert!(frame.contains("publish plant t qos 0: on"));
    }

    #[test]
    fn test_rejected_connect_never_shows_password() {
        let (screen, buf) = screen();
        screen.show_panel(Panel::Connections);
        stage_line(&screen, "connect plant broker.local 1883 ops s3cret");
        screen.show_status(&Notification::new("Failed to connect: bad credentials", Severity::Error));

        let frame = screen.frame();
        assert!(frame.contains("connect plant broker.local:1883 (credentials hidden)"));
        assert!(!frame.contains("s3cret"));
        assert!(!buf.take().contains("s3cret"));
    }
}
