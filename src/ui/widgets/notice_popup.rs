// src/ui/widgets/notice_popup.rs

use ratatui::{
    prelude::*,
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

/// Renders a modal notice on top of the existing UI.
///
/// `Clear` wipes the popup area first so the report underneath does not
/// bleed through.
pub fn render_notice_popup(frame: &mut Frame, title: &str, message: &str, area: Rect) {
    let text = Text::from(vec![
        Line::from(""),
        Line::from(message.to_string()),
        Line::from(""),
        Line::from("Press ".bold() + "Enter".bold().yellow() + " to try again".bold()),
    ]);

    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let popup_area = centered_rect(60, 30, area);
    let popup = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);

    frame.render_widget(Clear, popup_area);
    frame.render_widget(popup, popup_area);
}

/// A rectangle of the given percentages centered within `r`.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popup_is_centered() {
        let area = centered_rect(60, 30, Rect::new(0, 0, 100, 40));
        assert_eq!((area.x, area.width), (20, 60));
        assert_eq!((area.y, area.height), (14, 12));
    }
}
