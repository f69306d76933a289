//! UI module for rendering the TUI

mod components;
mod forms;
mod home;
mod layout;
mod results;

pub use results::RISK_BAR_ANIMATION;

use crate::app::App;
use crate::state::View;
use components::render_error_dialog;
use ratatui::Frame;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let (header_area, main_area) = layout::create_layout(area);
    layout::draw_header(frame, header_area, app);

    // Draw main content based on current view
    match app.state.current_view {
        View::Login => forms::draw_login(frame, main_area, app),
        View::Register => forms::draw_register(frame, main_area, app),
        View::Home => home::draw(frame, main_area, app),
        View::Predict => forms::draw_predict(frame, main_area, app),
        View::Results => results::draw(frame, main_area, app),
    }

    // Draw status bar
    layout::draw_status_bar(frame, app);

    // Error dialog on top of everything
    if let Some(message) = app.state.current_error() {
        render_error_dialog(frame, message);
    }
}
