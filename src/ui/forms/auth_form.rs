//! Login and registration forms

use super::field_renderer::{draw_field, draw_form_message, draw_help_text};
use crate::app::App;
use crate::state::Form;
use crate::ui::components::{render_button, BUTTON_HEIGHT};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders},
    Frame,
};

const FORM_WIDTH: u16 = 60;

/// Center a fixed-width column inside `area`
fn centered_column(area: Rect, height: u16) -> Rect {
    let width = FORM_WIDTH.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Draw a bordered form with its fields, submit button, message line and help
#[allow(clippy::too_many_arguments)]
fn draw_auth_form(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    form: &dyn Form,
    submit_label: &str,
    is_loading: bool,
    error: Option<&str>,
    notice: Option<&str>,
    help: &str,
) {
    let field_count = form.field_count() as u16;
    let outer = centered_column(area, field_count * 3 + BUTTON_HEIGHT + 6);

    let block = Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(outer);
    frame.render_widget(block, outer);

    let mut constraints: Vec<Constraint> = (0..field_count).map(|_| Constraint::Length(3)).collect();
    constraints.extend([
        Constraint::Length(BUTTON_HEIGHT), // Submit
        Constraint::Length(2),             // Message
        Constraint::Length(1),             // Help
        Constraint::Min(0),
    ]);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for index in 0..form.field_count() {
        if let Some(field) = form.get_field(index) {
            draw_field(
                frame,
                chunks[index],
                field,
                !is_loading && form.active_field() == index,
            );
        }
    }

    let rows = form.field_count();
    let label = if is_loading { "Please wait..." } else { submit_label };
    render_button(frame, chunks[rows], label, false, !is_loading);
    draw_form_message(frame, chunks[rows + 1], error, notice);
    draw_help_text(frame, chunks[rows + 2], help);
}

/// Draw the login form
pub fn draw_login(frame: &mut Frame, area: Rect, app: &App) {
    let Some(form) = app.state.form.as_login() else {
        return;
    };
    draw_auth_form(
        frame,
        area,
        "Sign In",
        form,
        "Sign In [Enter]",
        form.is_loading,
        form.error.as_deref(),
        app.state.status_message.as_deref(),
        "Tab:next  Enter:sign in  ^R:create account  Esc:quit",
    );
}

/// Draw the registration form
pub fn draw_register(frame: &mut Frame, area: Rect, app: &App) {
    let Some(form) = app.state.form.as_register() else {
        return;
    };
    draw_auth_form(
        frame,
        area,
        "Create Account",
        form,
        "Register [Enter on last field]",
        form.is_loading,
        form.error.as_deref(),
        None,
        "Tab:next  Enter:next/register  Esc:back to sign in",
    );
}
