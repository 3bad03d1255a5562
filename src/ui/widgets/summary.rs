// src/ui/widgets/summary.rs

use crate::app::{App, SPINNER_CHARS};
use crate::core::models::Grade;
use crate::core::session::{OrderState, UnlockVariant};
use ratatui::{
    prelude::*,
    text::Line,
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
};

/// Renders the summary pane: grade, score band, counts, the offer countdown
/// and the unlock form status. Empty until a result exists.
pub fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let container = Block::default().borders(Borders::ALL).title("Summary");
    frame.render_widget(container, area);

    let (Some(result), Some(split)) = (app.session.result(), app.partition()) else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Grade & band
            Constraint::Length(1), // Gauge
            Constraint::Length(1), // Spacer
            Constraint::Length(5), // Counts
            Constraint::Length(1), // Spacer
            Constraint::Min(0),    // Offer
        ])
        .split(area);

    // --- Grade & Score Band ---
    let grade_style = Style::default().fg(grade_color(result.grade)).bold();
    let header = Text::from(vec![
        Line::from(result.display_host().to_string().bold()),
        Line::from(vec![Span::raw("Grade "), Span::styled(result.grade.to_string(), grade_style)]),
        Line::from(format!("Estimated score {} / 100", split.score_band)),
    ]);
    frame.render_widget(Paragraph::new(header).alignment(Alignment::Center), chunks[0]);

    // The gauge only ever shows the lower bound of the band.
    let gauge = Gauge::default()
        .percent(u16::from(split.score_band.low))
        .label(format!("{}+", split.score_band.low))
        .gauge_style(Style::default().fg(grade_color(result.grade)));
    frame.render_widget(gauge, chunks[1]);

    // --- Counts ---
    let counts = Text::from(vec![
        Line::from(vec![Span::raw("Checks run: "), Span::raw(result.total_checks.to_string())]),
        Line::from(vec![Span::raw("Passed:     "), Span::styled(result.passed.to_string(), Style::default().fg(Color::Green))]),
        Line::from(vec![Span::raw("Warnings:   "), Span::styled(result.warnings.to_string(), Style::default().fg(Color::Yellow))]),
        Line::from(vec![Span::raw("Failed:     "), Span::styled(result.failed.to_string(), Style::default().fg(Color::Red))]),
        Line::from(format!("Scan time:  {:.1}s", result.scan_time_seconds)).style(Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(counts), chunks[3]);

    // --- Offer ---
    let mut offer = Vec::new();
    if let Some(countdown) = app.session.countdown() {
        offer.push(if countdown.is_expired() {
            Line::from("Offer expired".fg(Color::DarkGray))
        } else {
            Line::from(vec![Span::raw("Offer ends in "), Span::styled(countdown.to_string(), Style::default().fg(Color::Red).bold())])
        });
        offer.push(Line::from(""));
    }
    offer.extend(unlock_lines(app));
    let offer_block = Block::default().title("FULL REPORT".bold());
    frame.render_widget(Paragraph::new(offer).block(offer_block).wrap(Wrap { trim: true }), chunks[5]);
}

fn unlock_lines(app: &App) -> Vec<Line<'static>> {
    let spinner = SPINNER_CHARS[app.spinner_frame];
    match (app.session.order(), app.session.variant()) {
        (OrderState::Idle, UnlockVariant::Checkout) => vec![
            Line::from("Exact score, every locked check and how to fix it."),
            Line::from("Type your email above and press Enter to check out."),
        ],
        (OrderState::Idle, UnlockVariant::EmailReport) => vec![
            Line::from("Get the full report with remediation steps by email."),
            Line::from("Type your email above and press Enter."),
        ],
        (OrderState::Ordering { .. }, UnlockVariant::Checkout) => {
            vec![Line::from(format!("{spinner} Creating checkout..."))]
        }
        (OrderState::Ordering { .. }, UnlockVariant::EmailReport) => {
            vec![Line::from(format!("{spinner} Generating your report..."))]
        }
        (OrderState::Redirected { target, .. }, _) => vec![Line::from(format!("Opening checkout: {target}"))],
        (OrderState::Sent(record), _) => vec![
            Line::from("✓ Report sent".fg(Color::Green).bold()),
            Line::from(format!("Check {} for your full report on {}.", record.email, record.url)),
            Line::from(format!("Grade {} · Score {}/100", record.grade, record.score)),
            Line::from(format!("Requested {}", record.requested_at.format("%H:%M UTC"))).style(Style::default().fg(Color::DarkGray)),
        ],
        (OrderState::Error { message, .. }, _) => vec![
            Line::from(message.clone().fg(Color::Red)),
            Line::from("Edit your email and press Enter to retry."),
        ],
    }
}

fn grade_color(grade: Grade) -> Color {
    match grade {
        Grade::A => Color::Green,
        Grade::B => Color::LightGreen,
        Grade::C => Color::Yellow,
        Grade::D => Color::LightRed,
        Grade::F => Color::Red,
    }
}
