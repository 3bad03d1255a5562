// src/ui/mod.rs

use crate::app::App;
use crate::core::session::ScanState;
use ratatui::prelude::*;

mod layout;
mod widgets;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let layout = layout::create_layout(area, app.session.result().is_some());

    widgets::input::render_input(frame, app, &layout);
    widgets::results::render_results(frame, app, layout.report);
    widgets::summary::render_summary(frame, app, layout.summary);
    widgets::footer::render_footer(frame, app, layout.footer);

    if let ScanState::Error(message) = app.session.scan() {
        widgets::notice_popup::render_notice_popup(frame, "Scan failed", message, area);
    }
}
