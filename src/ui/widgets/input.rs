// src/ui/widgets/input.rs

use crate::app::{App, Focus};
use crate::core::session::{OrderState, UnlockVariant};
use crate::ui::layout::AppLayout;
use ratatui::{prelude::*, widgets::{Block, Borders, Paragraph}};

/// Renders the URL field and, once a result exists, the email field.
pub fn render_input(frame: &mut Frame, app: &App, layout: &AppLayout) {
    let url_editable = !app.session.is_scanning() && app.focus == Focus::Url;
    render_field(frame, "Website URL", &app.url_input, url_editable, layout.url_input);

    if app.session.result().is_none() {
        return;
    }
    let title = match app.session.variant() {
        UnlockVariant::Checkout => "Email for full report (checkout)",
        UnlockVariant::EmailReport => "Email me the full report",
    };
    let email_open = matches!(app.session.order(), OrderState::Idle | OrderState::Error { .. });
    let email_editable = email_open && app.focus == Focus::Email;
    render_field(frame, title, &app.email_input, email_editable, layout.email_input);
}

fn render_field(frame: &mut Frame, title: &str, value: &str, focused: bool, area: Rect) {
    let border_style = if focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .border_style(border_style);
    let paragraph = Paragraph::new(value.to_string())
        .block(block)
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(paragraph, area);

    // Only the focused, editable field shows a cursor.
    if focused {
        frame.set_cursor_position((area.x + value.chars().count() as u16 + 1, area.y + 1));
    }
}
