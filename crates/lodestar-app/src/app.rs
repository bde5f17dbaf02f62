//! Root application component.
//!
//! Pure state: it never touches the network or the screen. Key presses go
//! in, [`AppAction`]s come out, and the runtime feeds server responses back
//! through the `apply_*` methods.

use std::time::Duration;

use lodestar_proto::StatusReply;

use crate::{
    action::AppAction,
    commands::{self, Command},
    input::{InputEvent, KeyInput, TextInput},
};

/// Server identity captured during initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    /// Address the session is connected to.
    pub addr: String,
    /// Session identifier assigned by the server.
    pub session_id: u64,
    /// Server build version.
    pub version: String,
}

/// Root application state.
#[derive(Debug, Clone)]
pub struct App {
    input: TextInput,
    server: Option<ServerInfo>,
    status: Option<StatusReply>,
    latency: Option<Duration>,
    entries: Vec<String>,
    notice: Option<String>,
    should_quit: bool,
}

impl App {
    /// Application bound to `server`, or detached when `None`.
    pub fn new(server: Option<ServerInfo>) -> Self {
        Self {
            input: TextInput::new("Input title"),
            server,
            status: None,
            latency: None,
            entries: Vec::new(),
            notice: None,
            should_quit: false,
        }
    }

    /// Text input field.
    pub fn input(&self) -> &TextInput {
        &self.input
    }

    /// Connected server, if any.
    pub fn server(&self) -> Option<&ServerInfo> {
        self.server.as_ref()
    }

    /// Latest status snapshot.
    pub fn status(&self) -> Option<&StatusReply> {
        self.status.as_ref()
    }

    /// Latest measured round-trip time.
    pub fn latency(&self) -> Option<Duration> {
        self.latency
    }

    /// Submitted entries, oldest first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// One-line message for the user (errors, command feedback).
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// True once the user asked to quit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Process a key press.
    pub fn handle_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        if key == KeyInput::Esc {
            return self.quit();
        }

        match self.input.handle(key) {
            None => Vec::new(),
            Some(InputEvent::Changed(_) | InputEvent::CursorMoved) => vec![AppAction::Render],
            Some(InputEvent::Submitted(line)) => self.submit(&line),
        }
    }

    /// Record a status snapshot from the server.
    pub fn apply_status(&mut self, status: StatusReply) {
        self.status = Some(status);
    }

    /// Record a measured round-trip time.
    pub fn apply_latency(&mut self, latency: Duration) {
        self.latency = Some(latency);
        self.notice = Some(format!("pong in {} ms", latency.as_millis()));
    }

    /// Show `message` to the user.
    pub fn set_notice(&mut self, message: impl Into<String>) {
        self.notice = Some(message.into());
    }

    fn submit(&mut self, line: &str) -> Vec<AppAction> {
        match commands::parse(line) {
            Command::Entry { text } if text.is_empty() => Vec::new(),
            Command::Entry { text } => {
                self.entries.push(text);
                self.notice = None;
                vec![AppAction::Render]
            },
            Command::Status => vec![AppAction::RequestStatus, AppAction::Render],
            Command::Ping => vec![AppAction::Ping, AppAction::Render],
            Command::Clear => {
                self.entries.clear();
                self.notice = None;
                vec![AppAction::Render]
            },
            Command::Quit => self.quit(),
            Command::Unknown { input } => {
                self.notice = Some(format!("unknown command: {input}"));
                vec![AppAction::Render]
            },
        }
    }

    fn quit(&mut self) -> Vec<AppAction> {
        self.should_quit = true;
        vec![AppAction::Quit]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_line(app: &mut App, line: &str) -> Vec<AppAction> {
        for c in line.chars() {
            app.handle_key(KeyInput::Char(c));
        }
        app.handle_key(KeyInput::Enter)
    }

    #[test]
    fn typing_requests_render() {
        let mut app = App::new(None);
        assert_eq!(app.handle_key(KeyInput::Char('a')), vec![AppAction::Render]);
        assert_eq!(app.input().value(), "a");
    }

    #[test]
    fn submitted_text_becomes_entry() {
        let mut app = App::new(None);
        type_line(&mut app, "groceries");
        assert_eq!(app.entries(), ["groceries".to_string()]);
        assert_eq!(app.input().value(), "");
    }

    #[test]
    fn blank_submission_is_ignored() {
        let mut app = App::new(None);
        assert!(type_line(&mut app, "   ").is_empty());
        assert!(app.entries().is_empty());
    }

    #[test]
    fn status_command_requests_status() {
        let mut app = App::new(None);
        let actions = type_line(&mut app, "/status");
        assert!(actions.contains(&AppAction::RequestStatus));
    }

    #[test]
    fn quit_via_command_or_escape() {
        let mut app = App::new(None);
        assert_eq!(type_line(&mut app, "/q"), vec![AppAction::Quit]);
        assert!(app.should_quit());

        let mut app = App::new(None);
        assert_eq!(app.handle_key(KeyInput::Esc), vec![AppAction::Quit]);
    }

    #[test]
    fn unknown_command_sets_notice() {
        let mut app = App::new(None);
        type_line(&mut app, "/nope");
        assert_eq!(app.notice(), Some("unknown command: /nope"));
    }

    #[test]
    fn clear_drops_entries() {
        let mut app = App::new(None);
        type_line(&mut app, "one");
        type_line(&mut app, "two");
        type_line(&mut app, "/clear");
        assert!(app.entries().is_empty());
    }

    #[test]
    fn server_responses_are_recorded() {
        let mut app = App::new(None);
        app.apply_status(StatusReply { uptime_ms: 1500, sessions: 2 });
        app.apply_latency(Duration::from_millis(3));
        assert_eq!(app.status().map(|s| s.sessions), Some(2));
        assert_eq!(app.latency(), Some(Duration::from_millis(3)));
        assert_eq!(app.notice(), Some("pong in 3 ms"));
    }
}
