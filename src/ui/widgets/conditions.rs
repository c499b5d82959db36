use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::{
    app::state::{AppMode, AppState},
    domain::{
        format::format_wind,
        weather::{convert_temp, describe_weather_code, round_temp},
    },
    ui::theme::Palette,
};

#[must_use]
pub fn condition_lines(state: &AppState, palette: &Palette) -> Vec<Line<'static>> {
    let muted = Style::default().fg(palette.muted_text);
    let Some(report) = state.report.as_ref() else {
        let (message, style) = match state.mode {
            AppMode::Error => (
                state
                    .last_error
                    .clone()
                    .unwrap_or_else(|| "Weather unavailable".to_string()),
                Style::default().fg(palette.danger),
            ),
            _ => (state.status.clone(), muted),
        };
        return vec![Line::from(Span::styled(message, style))];
    };

    let units = state.settings.units;
    let current = &report.current;
    let mut headline = vec![
        Span::styled(
            format!("{}°{}", report.current_temp(units), units.symbol()),
            Style::default()
                .fg(palette.text)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            describe_weather_code(current.weather_code, current.cloud_cover),
            Style::default().fg(palette.accent),
        ),
    ];
    if let Some((high, low)) = report.high_low(units) {
        headline.push(Span::styled(format!("  H {high}° L {low}°"), muted));
    }

    let mut facts = Vec::new();
    if let Some(feels) = current.apparent_temperature_c {
        facts.push(format!("Feels {}°", round_temp(convert_temp(feels, units))));
    }
    if let Some(humidity) = current.relative_humidity {
        facts.push(format!("Humidity {humidity:.0}%"));
    }

    vec![
        Line::from(headline),
        Line::from(Span::styled(facts.join(" · "), Style::default().fg(palette.text))),
        Line::from(Span::styled(
            format!("Wind {}", format_wind(current.wind_speed_ms, current.wind_gust_ms)),
            Style::default().fg(palette.text),
        )),
        Line::from(Span::styled(report.location.coords_label(), muted)),
    ]
}

pub fn render(frame: &mut Frame, area: Rect, state: &AppState, palette: &Palette) {
    let title = state
        .location
        .as_ref()
        .map_or_else(|| " Weather ".to_string(), |location| format!(" {} ", location.display_name()));
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border));
    let paragraph = Paragraph::new(condition_lines(state, palette))
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}
