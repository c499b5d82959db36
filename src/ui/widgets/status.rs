use chrono::{DateTime, Utc};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{
    app::state::AppState,
    domain::format::{format_countdown, format_time_detail},
    ui::theme::Palette,
};

const KEY_HINTS: &str = "q quit · c clouds · s/S scene · t theme · a accent · u units · r refresh";

/// Title, local clock and the next solar event.
#[must_use]
pub fn header_line(state: &AppState, now: DateTime<Utc>, palette: &Palette) -> Line<'static> {
    let muted = Style::default().fg(palette.muted_text);
    let mut spans = vec![Span::styled(
        " weather-pane",
        Style::default()
            .fg(palette.accent)
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(report) = state.report.as_ref() {
        spans.push(Span::styled(
            format!("  {}", format_time_detail(Some(report.local_now(now)))),
            Style::default().fg(palette.text),
        ));
    }
    if let Some(event) = state.solar.as_ref().and_then(|solar| solar.next_event(now)) {
        spans.push(Span::styled(
            format!("  {} {}", event.kind.name(), format_countdown(event.time - now)),
            muted,
        ));
    }
    Line::from(spans)
}

/// Fetch status or error, backdrop state and key hints.
#[must_use]
pub fn status_line(state: &AppState, palette: &Palette) -> Line<'static> {
    let muted = Style::default().fg(palette.muted_text);
    let status = match state.last_error.as_deref() {
        Some(err) => Span::styled(
            format!(" {err} · {}", state.status),
            Style::default().fg(palette.warning),
        ),
        None => Span::styled(format!(" {}", state.status), Style::default().fg(palette.text)),
    };
    let scene = state
        .backdrop
        .scene_id()
        .map_or("none", |scene| scene.as_str());
    Line::from(vec![
        status,
        Span::styled(
            format!(
                "  │ clouds {} · scene {} ({}) · theme {}",
                state.settings.cloud_state.label(),
                scene,
                state.settings.background_scene.label(),
                state.settings.theme_mode.label(),
            ),
            muted,
        ),
        Span::styled(format!("  │ {KEY_HINTS}"), muted),
    ])
}

pub fn render_header(frame: &mut Frame, area: Rect, state: &AppState, now: DateTime<Utc>, palette: &Palette) {
    frame.render_widget(Paragraph::new(header_line(state, now, palette)), area);
}

pub fn render_status(frame: &mut Frame, area: Rect, state: &AppState, palette: &Palette) {
    frame.render_widget(Paragraph::new(status_line(state, palette)), area);
}
