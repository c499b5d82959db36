pub mod canvas;
pub mod layout;
pub mod scenes;
pub mod stage;
pub mod theme;
pub mod widgets;

use chrono::{DateTime, Utc};
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    widgets::{Block, Paragraph, Wrap},
};

use crate::{
    app::state::AppState,
    ui::{
        canvas::CanvasView,
        layout::{MIN_HEIGHT, MIN_WIDTH, pane_layout},
        theme::{Palette, palette_for, quantize},
    },
};

pub fn render(frame: &mut Frame, state: &AppState) {
    render_at(frame, state, Utc::now());
}

/// Draws the backdrop full-screen, then the panels over it.
pub fn render_at(frame: &mut Frame, state: &AppState, now: DateTime<Utc>) {
    let area = frame.area();
    let palette = palette_for(state.theme, state.settings.theme_color, state.capability);
    render_backdrop(frame, area, state, &palette);

    let Some(layout) = pane_layout(area) else {
        let warning = Paragraph::new(format!(
            "Terminal too small. Resize to at least {MIN_WIDTH}x{MIN_HEIGHT}."
        ))
        .style(Style::default().fg(palette.warning))
        .wrap(Wrap { trim: true });
        frame.render_widget(warning, area);
        return;
    };

    widgets::status::render_header(frame, layout.header, state, now, &palette);
    widgets::conditions::render(frame, layout.conditions, state, &palette);
    widgets::sun_path::render(
        frame,
        layout.sun_path,
        state.solar.as_ref(),
        now,
        &state.sun_strip,
        &palette,
        state.capability,
    );
    widgets::details::render(frame, layout.details, state, now, &palette);
    widgets::status::render_status(frame, layout.status, state, &palette);
}

fn render_backdrop(frame: &mut Frame, area: Rect, state: &AppState, palette: &Palette) {
    let base = quantize(palette.base.to_color(), state.capability);
    frame.render_widget(Block::default().style(Style::default().bg(base)), area);
    if let Some(canvas) = state.backdrop.compose() {
        frame.render_widget(
            CanvasView {
                canvas: &canvas,
                base: palette.base,
                capability: state.capability,
            },
            area,
        );
    }
}
