// src/ui/widgets/results.rs

use crate::app::{App, SPINNER_CHARS};
use crate::core::models::{CheckResult, CheckStatus};
use crate::core::partition::Partition;
use crate::core::session::ScanState;
use crate::core::validator::display_host;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, Wrap},
};

/// Renders the report pane: free checks in full, locked checks as a teaser.
pub fn render_results(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Security Report (scroll with ↑ ↓)");

    let lines = match app.session.scan() {
        ScanState::Idle => vec![
            Line::from(""),
            Line::from("Enter a website URL and press Enter to start a free scan."),
        ],
        ScanState::Scanning { url, .. } => vec![
            Line::from(""),
            Line::from(vec![
                Span::styled(format!("{} ", SPINNER_CHARS[app.spinner_frame]), Style::default().fg(Color::Cyan)),
                Span::raw(format!("Scanning {}... Please wait.", display_host(url))),
            ]),
        ],
        ScanState::Error(_) => vec![Line::from(""), Line::from("The last scan did not complete.")],
        ScanState::Result(_) => match app.partition() {
            Some(split) => build_report_lines(&split),
            None => Vec::new(),
        },
    };

    let centered = !matches!(app.session.scan(), ScanState::Result(_));
    let content_length = lines.len();
    app.report_length = content_length;
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .alignment(if centered { Alignment::Center } else { Alignment::Left })
        .scroll((app.scroll_offset.min(u16::MAX as usize) as u16, 0));
    frame.render_widget(paragraph, area);

    if !centered {
        app.report_scroll_state = app.report_scroll_state.content_length(content_length);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area,
            &mut app.report_scroll_state,
        );
    }
}

/// Lines for a finished scan: free checks grouped by category, then the
/// masked teaser for everything the policy withholds.
pub fn build_report_lines(split: &Partition<'_>) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    lines.push(Line::from(Span::styled("FREE CHECKS", Style::default().bold().underlined())));
    if split.free_checks.is_empty() {
        lines.push(Line::from("  No checks are included in the free report."));
    }
    for category in &split.free_categories {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(category.to_string(), Style::default().bold().fg(Color::Cyan))));
        for check in split.free_checks.iter().filter(|c| c.category == *category) {
            lines.push(format_check(check));
            lines.push(Line::from(Span::styled(
                format!("      {}", check.description),
                Style::default().fg(Color::Gray),
            )));
        }
    }

    if split.hidden_checks.is_empty() {
        return lines;
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("LOCKED CHECKS ({})", split.hidden_checks.len()),
        Style::default().bold().underlined(),
    )));
    lines.push(Line::from(Span::styled(
        format!("Includes: {}", split.hidden_categories.join(", ")),
        Style::default().fg(Color::DarkGray),
    )));
    for check in &split.hidden_checks {
        lines.push(Line::from(vec![
            Span::styled("  ░ ", Style::default().fg(Color::DarkGray)),
            Span::styled(mask(&check.name), Style::default().fg(Color::DarkGray)),
        ]));
    }
    if split.hidden_vulnerability_count > 0 {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(
                "⚠ {} more issue{} found in locked checks. Unlock the full report to see them.",
                split.hidden_vulnerability_count,
                if split.hidden_vulnerability_count == 1 { "" } else { "s" }
            ),
            Style::default().fg(Color::Red).bold(),
        )));
    }
    lines
}

fn format_check(check: &CheckResult) -> Line<'static> {
    let (icon, style) = match check.status {
        CheckStatus::Pass => ("✓", Style::default().fg(Color::Green)),
        CheckStatus::Warn => ("!", Style::default().fg(Color::Yellow)),
        CheckStatus::Fail => ("✗", Style::default().fg(Color::Red).bold()),
    };
    Line::from(vec![
        Span::styled(format!("  {} ", icon), style),
        Span::raw(check.name.clone()),
    ])
}

/// Replaces every visible character so only the rough length survives.
fn mask(text: &str) -> String {
    text.chars().map(|c| if c.is_whitespace() { ' ' } else { '█' }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::fixtures::example_result;
    use crate::core::partition::{DisclosurePolicy, partition};

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn hidden_check_names_never_render() {
        let result = example_result();
        let split = partition(&result, &DisclosurePolicy::new(["ssl_valid"]));
        let text = plain(&build_report_lines(&split)).join("\n");

        assert!(text.contains("ssl valid"));
        assert!(text.contains("ssl_valid check"));
        for hidden in ["hsts", "csp", "spf"] {
            assert!(!text.contains(hidden), "{hidden} leaked into the teaser");
        }
        assert!(text.contains("LOCKED CHECKS (3)"));
        assert!(text.contains("Includes: HTTP Headers, DNS"));
        assert!(text.contains("2 more issues"));
    }

    #[test]
    fn no_teaser_when_everything_is_free() {
        let result = example_result();
        let split = partition(&result, &DisclosurePolicy::new(["ssl_valid", "hsts", "csp", "spf"]));
        let text = plain(&build_report_lines(&split)).join("\n");
        assert!(!text.contains("LOCKED"));
    }

    #[test]
    fn mask_keeps_word_shape() {
        assert_eq!(mask("X Frame"), "█ █████");
    }
}
