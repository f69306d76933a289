//! Results view

use crate::app::App;
use crate::state::{ConfidenceBucket, ResultsScreen};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};
use std::time::Duration;

/// How long the risk bar takes to fill
pub const RISK_BAR_ANIMATION: Duration = Duration::from_secs(1);

fn bucket_color(bucket: ConfidenceBucket) -> Color {
    match bucket {
        ConfidenceBucket::Low => Color::Green,
        ConfidenceBucket::Medium => Color::Yellow,
        ConfidenceBucket::High => Color::Red,
    }
}

/// Fraction of the final bar width to show `elapsed` after opening
pub fn risk_bar_ratio(likelihood: u8, elapsed: Duration) -> f64 {
    let progress =
        (elapsed.as_secs_f32() / RISK_BAR_ANIMATION.as_secs_f32()).clamp(0.0, 1.0);
    let eased = simple_easing::cubic_out(progress) as f64;
    (f64::from(likelihood) / 100.0 * eased).clamp(0.0, 1.0)
}

pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let Some(screen) = app.state.results.as_ref() else {
        return;
    };

    let block = Block::default()
        .title(" Prediction Results ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Patient
            Constraint::Length(2), // Percentage
            Constraint::Length(1), // Risk bar
            Constraint::Length(2), // Buckets
            Constraint::Length(3), // Server recommendation
            Constraint::Min(6),    // Recommendation list
        ])
        .margin(1)
        .split(inner);

    draw_patient(frame, chunks[0], screen);

    let color = bucket_color(screen.presentation.bucket);
    let headline = Paragraph::new(Line::from(vec![
        Span::styled(
            format!("{}%", screen.presentation.likelihood),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" likelihood of COVID-19"),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(headline, chunks[1]);

    let ratio = risk_bar_ratio(
        screen.presentation.likelihood,
        screen.opened_at.elapsed(),
    );
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(color).bg(Color::DarkGray))
        .ratio(ratio)
        .label("");
    frame.render_widget(gauge, chunks[2]);

    draw_buckets(frame, chunks[3], screen.presentation.bucket);

    let recommendation = Paragraph::new(vec![
        Line::from(Span::styled(
            "Recommendation",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(screen.result.recommendation.as_str()),
    ])
    .wrap(Wrap { trim: true });
    frame.render_widget(recommendation, chunks[4]);

    let mut steps = vec![Line::from(Span::styled(
        "Next steps",
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    steps.extend(
        screen
            .presentation
            .recommendations
            .iter()
            .map(|item| Line::from(format!("  • {item}"))),
    );
    if screen.has_result {
        steps.push(Line::from(""));
        steps.push(Line::from(Span::styled(
            "This result is an estimate, not a diagnosis. Consult a healthcare professional.",
            Style::default().fg(Color::DarkGray),
        )));
    }
    frame.render_widget(Paragraph::new(steps).wrap(Wrap { trim: false }), chunks[5]);
}

fn draw_patient(frame: &mut Frame, area: Rect, screen: &ResultsScreen) {
    if !screen.has_result {
        return;
    }
    let line = Line::from(vec![
        Span::styled("Patient: ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{}, age {}", screen.name, screen.age)),
        Span::styled(
            format!(
                "   {}",
                screen
                    .result
                    .received_at
                    .with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M")
            ),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Low / Medium / High chips with the active bucket highlighted
fn draw_buckets(frame: &mut Frame, area: Rect, active: ConfidenceBucket) {
    let mut spans = vec![Span::raw("Confidence: ")];
    for bucket in ConfidenceBucket::ALL {
        let style = if bucket == active {
            Style::default()
                .fg(Color::Black)
                .bg(bucket_color(bucket))
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {} ", bucket.label()), style));
        spans.push(Span::raw(" "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
