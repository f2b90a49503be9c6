//! UI module for rendering the TUI

mod account;
mod field;
mod layout;
mod login;

use crate::app::App;
use crate::state::View;
use ratatui::Frame;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let main_area = layout::create_layout(frame.area());

    match app.state.current_view {
        View::Login => login::draw(frame, main_area, app),
        View::Account => account::draw(frame, main_area, app),
    }

    layout::draw_snackbar(frame, main_area, app);
    layout::draw_status_bar(frame, app);
}
