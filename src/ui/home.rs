//! Home view

use crate::app::App;
use crate::state::HomeAction;
use crate::ui::components::{render_button, BUTTON_HEIGHT};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let mut constraints = vec![
        Constraint::Min(0),    // Top padding (flex)
        Constraint::Length(3), // Greeting
    ];
    constraints.extend(HomeAction::ALL.iter().map(|_| Constraint::Length(BUTTON_HEIGHT)));
    constraints.push(Constraint::Min(0)); // Bottom padding (flex)

    let column = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(40),
            Constraint::Min(0),
        ])
        .split(area)[1];
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(column);

    let name = app.state.session.display_name().unwrap_or("there");
    let greeting = vec![
        Line::from(Span::styled(
            format!("Welcome, {name}"),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Check your COVID-19 risk from symptoms and a CT scan",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(
        Paragraph::new(greeting).alignment(Alignment::Center),
        chunks[1],
    );

    let selected = app.state.selected_home_action();
    for (index, action) in HomeAction::ALL.iter().enumerate() {
        let enabled = match action {
            HomeAction::LastResult => app.state.last_result.is_some(),
            _ => true,
        };
        render_button(
            frame,
            chunks[index + 2],
            &format!("[{}] {}", action.key(), action.label()),
            *action == selected,
            enabled,
        );
    }
}
