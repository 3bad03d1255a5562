// src/ui/layout.rs

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Areas of the screen, computed once per frame.
pub struct AppLayout {
    pub url_input: Rect,
    /// Empty until a result exists.
    pub email_input: Rect,
    pub report: Rect,
    pub summary: Rect,
    pub footer: Rect,
}

/// Splits the frame into the input bar, the report/summary row and the footer.
///
/// The input bar is shared between the URL and email fields once there is a
/// result to unlock.
pub fn create_layout(frame_size: Rect, show_email: bool) -> AppLayout {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame_size);

    let (url_input, email_input) = if show_email {
        let input_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(main_chunks[0]);
        (input_chunks[0], input_chunks[1])
    } else {
        (main_chunks[0], Rect::default())
    };

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(main_chunks[1]);

    AppLayout {
        url_input,
        email_input,
        report: content_chunks[0],
        summary: content_chunks[1],
        footer: main_chunks[2],
    }
}
