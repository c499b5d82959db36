use chrono::{DateTime, Utc};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::{
    app::state::AppState,
    domain::details::{DetailSection, daily_summary, detail_sections, short_summary},
    ui::theme::Palette,
};

const LABEL_WIDTH: usize = 18;
/// Panels narrower than this get the short summary.
const FULL_SUMMARY_WIDTH: u16 = 60;

/// Section headings followed by aligned `label value` rows, in card order.
#[must_use]
pub fn detail_lines(sections: &[DetailSection], palette: &Palette) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (idx, section) in sections.iter().enumerate() {
        if idx > 0 {
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(
            section.title,
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )));
        for row in &section.rows {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {:<width$}", row.label, width = LABEL_WIDTH),
                    Style::default().fg(palette.muted_text),
                ),
                Span::styled(row.value.clone(), Style::default().fg(palette.text)),
            ]));
        }
    }
    lines
}

pub fn render(frame: &mut Frame, area: Rect, state: &AppState, now: DateTime<Utc>, palette: &Palette) {
    if area.height < 3 {
        return;
    }
    let block = Block::default()
        .title(" Sun & moon ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border));
    let mut lines = Vec::new();
    if let Some(solar) = state.solar.as_ref() {
        let (report, units) = (state.report.as_ref(), state.settings.units);
        let summary = if area.width >= FULL_SUMMARY_WIDTH {
            daily_summary(solar, report, now, units)
        } else {
            short_summary(solar, report, now, units)
        };
        lines.push(Line::from(Span::styled(
            summary,
            Style::default()
                .fg(palette.text)
                .add_modifier(Modifier::ITALIC),
        )));
        lines.push(Line::default());
        lines.extend(detail_lines(&detail_sections(solar, now, report, units), palette));
    }
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}
