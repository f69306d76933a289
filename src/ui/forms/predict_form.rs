//! Predict form rendering (symptoms step and upload step)

use super::field_renderer::{draw_field, draw_form_message, draw_help_text};
use crate::app::App;
use crate::state::{find_symptom, symptom_catalog, PredictForm, PredictStep, Symptom};
use crate::ui::components::{render_button, BUTTON_HEIGHT};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

/// Draw the predict view for whichever step is showing
pub fn draw_predict(frame: &mut Frame, area: Rect, app: &App) {
    let Some(form) = app.predict_form() else {
        return;
    };
    match form.step {
        PredictStep::Symptoms => draw_symptoms_step(frame, area, form, app),
        PredictStep::Upload => draw_upload_step(frame, area, form),
    }
}

fn draw_symptoms_step(frame: &mut Frame, area: Rect, form: &PredictForm, app: &App) {
    let block = Block::default()
        .title(" New Prediction - Step 1 of 2: Symptoms ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                                // Name + age
            Constraint::Min(symptom_catalog().len() as u16 + 2), // Symptoms
            Constraint::Length(BUTTON_HEIGHT),                    // Continue
            Constraint::Length(1),                                // Message
            Constraint::Length(1),                                // Help
        ])
        .margin(1)
        .split(inner);

    let identity = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(chunks[0]);
    let locked = !form.accepts_edits();
    draw_field(frame, identity[0], &form.name, !locked && form.active_field_index == 0);
    draw_field(frame, identity[1], &form.age, !locked && form.active_field_index == 1);

    draw_symptom_list(frame, chunks[1], form);

    render_button(
        frame,
        chunks[2],
        "Continue to upload",
        form.is_continue_active(),
        form.can_continue(),
    );

    draw_form_message(
        frame,
        chunks[3],
        form.error(),
        app.state.status_message.as_deref(),
    );
    draw_help_text(
        frame,
        chunks[4],
        "Tab:next  Up/Down:move  Space:toggle symptom  Enter:continue  Esc:back",
    );

    if let Some(symptom) = form.pending_follow_up() {
        draw_follow_up(frame, area, symptom, form.follow_up_cursor);
    }
}

fn draw_symptom_list(frame: &mut Frame, area: Rect, form: &PredictForm) {
    let is_active = form.is_symptom_list_active();
    let border_color = if is_active {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    let items: Vec<ListItem> = symptom_catalog()
        .iter()
        .enumerate()
        .map(|(index, symptom)| {
            let selected = form.is_selected(symptom.id);
            let marker = if selected { "[x]" } else { "[ ]" };
            let mut style = if selected {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            };
            if is_active && index == form.symptom_cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }

            let mut spans = vec![Span::styled(format!(" {marker} {}", symptom.name), style)];
            if let Some(answer) = form.follow_up_answer(symptom.id) {
                spans.push(Span::styled(
                    format!("  ({answer})"),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let title = format!(" Symptoms ({} selected) ", form.selected_symptoms().len());
    let list = List::new(items).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color)),
    );
    frame.render_widget(list, area);
}

/// Popup asking the follow-up question of the newly selected symptom
fn draw_follow_up(frame: &mut Frame, area: Rect, symptom: &Symptom, cursor: usize) {
    let question = symptom.follow_up_question.unwrap_or_default();
    let width = 50.min(area.width);
    let height = (symptom.options.len() as u16 + 6).min(area.height);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };
    frame.render_widget(Clear, popup);

    let mut lines = vec![
        Line::from(Span::styled(
            question,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    for (index, option) in symptom.options.iter().enumerate() {
        let style = if index == cursor {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let pointer = if index == cursor { ">" } else { " " };
        lines.push(Line::from(Span::styled(
            format!("{pointer} {}. {option}", index + 1),
            style,
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "1-9/Enter:answer  Esc:cancel",
        Style::default().fg(Color::DarkGray),
    )));

    let panel = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .title(format!(" {} ", symptom.name))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .style(Style::default().bg(Color::Black)),
    );
    frame.render_widget(panel, popup);
}

fn draw_upload_step(frame: &mut Frame, area: Rect, form: &PredictForm) {
    let block = Block::default()
        .title(" New Prediction - Step 2 of 2: CT Scan ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),             // Summary
            Constraint::Length(3),             // Image path
            Constraint::Length(2),             // File details
            Constraint::Length(BUTTON_HEIGHT), // Submit
            Constraint::Length(2),             // Message
            Constraint::Length(1),             // Help
            Constraint::Min(0),
        ])
        .margin(1)
        .split(inner);

    let symptoms: Vec<&str> = form
        .selected_symptoms()
        .iter()
        .filter_map(|id| find_symptom(id).map(|s| s.name))
        .collect();
    let summary = vec![
        Line::from(vec![
            Span::styled("Patient: ", Style::default().fg(Color::DarkGray)),
            Span::raw(format!("{}, age {}", form.name.trimmed(), form.age.trimmed())),
        ]),
        Line::from(vec![
            Span::styled("Symptoms: ", Style::default().fg(Color::DarkGray)),
            Span::raw(symptoms.join(", ")),
        ]),
    ];
    frame.render_widget(Paragraph::new(summary).wrap(Wrap { trim: true }), chunks[0]);

    let submitting = form.is_submitting();
    draw_field(frame, chunks[1], &form.image_path, form.accepts_edits());

    let details = match form.file() {
        Some(file) => format!(
            "{} · {} · {:.1} KB",
            file.file_name,
            file.mime_type,
            file.size_bytes as f64 / 1024.0
        ),
        None => "JPEG or PNG, up to 5MB".to_string(),
    };
    draw_help_text(frame, chunks[2], &details);

    let label = if submitting {
        "Uploading..."
    } else {
        "Get Prediction [Enter]"
    };
    render_button(frame, chunks[3], label, !submitting, form.accepts_edits());

    draw_form_message(frame, chunks[4], form.error(), None);
    draw_help_text(frame, chunks[5], "Enter/^S:submit  Esc:back to symptoms");
}
