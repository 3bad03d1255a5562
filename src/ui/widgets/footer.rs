// src/ui/widgets/footer.rs

use crate::app::{App, Focus};
use crate::core::session::{OrderState, ScanState};
use ratatui::{
    prelude::*,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};

/// Renders the footer, which lists the keys that do something right now.
pub fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let footer = Paragraph::new(footer_line(app)).alignment(Alignment::Center);
    frame.render_widget(footer, area);
}

fn key(label: &'static str) -> Span<'static> {
    Span::styled(label, Style::new().bold().fg(Color::Yellow))
}

fn footer_line(app: &App) -> Line<'static> {
    match app.session.scan() {
        ScanState::Idle => Line::from(vec![
            Span::raw("Press "),
            key("Enter"),
            Span::raw(" to scan, "),
            key("Esc"),
            Span::raw(" to quit."),
        ]),
        ScanState::Scanning { .. } => Line::from("Scanning... Press Esc to quit."),
        ScanState::Error(_) => Line::from(vec![
            key("[Enter]"),
            Span::raw(" Dismiss, "),
            key("[Esc]"),
            Span::raw(" Quit"),
        ]),
        ScanState::Result(_) => {
            let enter_action = match (app.focus, app.session.order()) {
                (Focus::Url, _) => " New scan, ",
                (Focus::Email, OrderState::Idle | OrderState::Error { .. }) => " Unlock report, ",
                (Focus::Email, _) => " Waiting, ",
            };
            Line::from(vec![
                key("[Enter]"),
                Span::raw(enter_action),
                key("[Tab]"),
                Span::raw(" Switch field, "),
                key("[↑↓]"),
                Span::raw(" Scroll, "),
                key("[Esc]"),
                Span::raw(" Quit"),
            ])
        }
    }
}
