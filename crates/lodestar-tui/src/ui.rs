//! Screen layout.
//!
//! ```text
//! ┌ lodestar ─────────────────────────────┐
//! │ connected 127.0.0.1:5012 · session 7  │  header
//! ├───────────────────────────────────────┤
//! │ entries                               │  body
//! ├ Input ────────────────────────────────┤
//! │ Input title                           │  input
//! └───────────────────────────────────────┘
//!   status / notice line
//! ```

use lodestar_app::App;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

/// Draw the whole application.
pub fn draw(frame: &mut Frame, app: &App) {
    let [header, body, input, status] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_header(frame, app, header);
    draw_entries(frame, app, body);
    draw_input(frame, app, input);
    draw_status(frame, app, status);
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let connection = match app.server() {
        Some(server) => Span::from(format!(
            "connected {} · session {} · server {}",
            server.addr, server.session_id, server.version
        ))
        .green(),
        None => Span::from("offline").yellow(),
    };

    let line = Line::from(vec![Span::from("lodestar ").bold(), connection]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_entries(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::TOP | Borders::BOTTOM);

    if app.entries().is_empty() {
        let hint = Paragraph::new("Type a line and press Enter. /status, /ping, /clear, /quit")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(hint, area);
        return;
    }

    // Newest entries stay visible when the list overflows.
    let visible = usize::from(area.height.saturating_sub(2));
    let skip = app.entries().len().saturating_sub(visible);
    let items: Vec<ListItem> =
        app.entries().iter().skip(skip).map(|e| ListItem::new(e.as_str())).collect();

    frame.render_widget(List::new(items).block(block), area);
}

fn draw_input(frame: &mut Frame, app: &App, area: Rect) {
    let input = app.input();
    let block = Block::bordered().title("Input");

    let text = if input.value().is_empty() {
        Line::from(input.placeholder()).style(Style::default().add_modifier(Modifier::DIM))
    } else {
        Line::from(input.value())
    };
    frame.render_widget(Paragraph::new(text).block(block), area);

    let max_x = area.width.saturating_sub(2);
    let offset = u16::try_from(input.cursor()).unwrap_or(u16::MAX).min(max_x);
    frame.set_cursor_position((area.x + 1 + offset, area.y + 1));
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    let line = if let Some(notice) = app.notice() {
        Line::from(notice.to_string())
    } else {
        let mut parts = Vec::new();
        if let Some(status) = app.status() {
            parts.push(format!("up {}s", status.uptime_ms / 1000));
            parts.push(format!("{} session(s)", status.sessions));
        }
        if let Some(latency) = app.latency() {
            parts.push(format!("rtt {} ms", latency.as_millis()));
        }
        Line::from(parts.join(" · "))
    };

    let dim = Style::default().add_modifier(Modifier::DIM);
    frame.render_widget(Paragraph::new(line).style(dim), area);
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use lodestar_app::{KeyInput, ServerInfo};
    use lodestar_proto::StatusReply;
    use ratatui::{Terminal, backend::TestBackend, buffer::Buffer};

    use super::*;

    fn screen(buffer: &Buffer) -> Vec<String> {
        let width = usize::from(buffer.area.width);
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(ratatui::buffer::Cell::symbol).collect::<String>())
            .collect()
    }

    fn render(app: &App) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(72, 12)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        screen(terminal.backend().buffer())
    }

    #[test]
    fn empty_input_shows_placeholder() {
        let rows = render(&App::new(None));
        assert!(rows.iter().any(|r| r.contains("Input title")));
        assert!(rows[0].contains("offline"));
    }

    #[test]
    fn header_shows_connection() {
        let app = App::new(Some(ServerInfo {
            addr: "127.0.0.1:5012".into(),
            session_id: 7,
            version: "0.1.0".into(),
        }));
        let rows = render(&app);
        assert!(rows[0].contains("connected 127.0.0.1:5012"));
        assert!(rows[0].contains("session 7"));
    }

    #[test]
    fn submitted_entries_are_listed() {
        let mut app = App::new(None);
        for c in "hello".chars() {
            app.handle_key(KeyInput::Char(c));
        }
        app.handle_key(KeyInput::Enter);

        let rows = render(&app);
        assert!(rows.iter().any(|r| r.contains("hello")));
        assert!(rows.iter().any(|r| r.contains("Input title")));
    }

    #[test]
    fn status_line_summarizes_server() {
        let mut app = App::new(None);
        app.apply_status(StatusReply { uptime_ms: 12_000, sessions: 3 });

        let rows = render(&app);
        let status = rows.last().unwrap();
        assert!(status.contains("up 12s"));
        assert!(status.contains("3 session(s)"));
    }

    #[test]
    fn notice_replaces_summary() {
        let mut app = App::new(None);
        app.apply_status(StatusReply { uptime_ms: 12_000, sessions: 3 });
        app.apply_latency(Duration::from_millis(4));

        let rows = render(&app);
        let status = rows.last().unwrap();
        assert!(status.contains("pong in 4 ms"));
        assert!(!status.contains("session(s)"));
    }
}
