//! Layout components (status bar, snackbar)

use crate::app::App;
use crate::state::View;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

/// Split off the bottom line for the status bar
pub fn create_layout(area: Rect) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    chunks[0]
}

/// Draw the active snackbar on the last line of the content area
pub fn draw_snackbar(frame: &mut Frame, area: Rect, app: &App) {
    let Some(snackbar) = &app.state.snackbar else {
        return;
    };
    if area.height == 0 {
        return;
    }

    let snackbar_area = Rect {
        x: area.x,
        y: area.y + area.height - 1,
        width: area.width,
        height: 1,
    };
    let color = if snackbar.message.is_error() {
        Color::Red
    } else {
        Color::Green
    };

    frame.render_widget(Clear, snackbar_area);
    frame.render_widget(
        Paragraph::new(format!(" {} ", snackbar.message.text())).style(
            Style::default()
                .bg(color)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        snackbar_area,
    );
}

/// Draw the status bar
pub fn draw_status_bar(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let status_area = Rect {
        x: 0,
        y: area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };

    let mut spans = vec![];

    let session = if app.state.current_view == View::Account {
        Span::styled(" ● ", Style::default().fg(Color::Green))
    } else {
        Span::styled(" ○ ", Style::default().fg(Color::Yellow))
    };
    spans.push(session);

    spans.push(Span::styled(
        get_view_hints(app.state.current_view),
        Style::default().fg(Color::Gray),
    ));

    if app.is_busy() {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled("working…", Style::default().fg(Color::Cyan)));
    }

    let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));

    frame.render_widget(status, status_area);
}

/// Get keyboard hints for the current view
fn get_view_hints(view: View) -> &'static str {
    match view {
        View::Login => "Tab:next field  Enter:sign in  ^R:forgot password  Esc:quit",
        View::Account => "s:sign out  q:quit",
    }
}
