//! Sign-in view

use super::field::draw_field;
use crate::app::App;
use crate::state::LoginField;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::Paragraph,
    Frame,
};

/// Width of the centered form column
const FORM_WIDTH: u16 = 48;

pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let Some(form) = app.login_form() else {
        return;
    };

    let [column] = Layout::horizontal([Constraint::Length(FORM_WIDTH)])
        .flex(Flex::Center)
        .areas(area);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Top padding
            Constraint::Length(2), // Title
            Constraint::Length(3), // Email
            Constraint::Length(3), // Password
            Constraint::Length(2), // Help
            Constraint::Min(0),    // Bottom padding
        ])
        .split(column);

    let title = Paragraph::new("Sign in to keep your tasks")
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(title, chunks[1]);

    draw_field(
        frame,
        chunks[2],
        "Email",
        &form.email,
        app.state.active_field == LoginField::Email,
        false,
    );
    draw_field(
        frame,
        chunks[3],
        "Password",
        &form.password,
        app.state.active_field == LoginField::Password,
        true,
    );

    let help = Paragraph::new("Your current tasks move to the new account.")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[4]);
}
