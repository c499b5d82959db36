use std::time::Instant;

use chrono::Utc;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;
use tracing::info;

use super::AppState;
use crate::{
    app::events::AppEvent, cli::Cli, domain::scene::ForcedScene,
    ui::theme::resolve_theme_from_env,
};

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    Quit,
    CycleCloudState,
    NextScene,
    PreviousScene,
    CycleThemeMode,
    CycleAccent,
    ToggleUnits,
    Refresh,
}

pub(crate) fn command_for(key: KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c')).then_some(Command::Quit);
    }
    let command = match key.code {
        KeyCode::Esc | KeyCode::Char('q' | 'Q') => Command::Quit,
        KeyCode::Char('c') => Command::CycleCloudState,
        KeyCode::Char('s') => Command::NextScene,
        KeyCode::Char('S') => Command::PreviousScene,
        KeyCode::Char('t') => Command::CycleThemeMode,
        KeyCode::Char('a') => Command::CycleAccent,
        KeyCode::Char('u') => Command::ToggleUnits,
        KeyCode::Char('r') => Command::Refresh,
        _ => return None,
    };
    Some(command)
}

impl AppState {
    pub(crate) async fn handle_input(
        &mut self,
        event: Event,
        tx: &mpsc::Sender<AppEvent>,
        cli: &Cli,
    ) -> anyhow::Result<()> {
        match event {
            Event::Key(key) => {
                if let Some(command) = command_for(key) {
                    self.run_command(command, tx, cli).await?;
                }
            }
            Event::Resize(width, height) => {
                self.viewport = (width, height);
                self.backdrop.request_resize(width, height, Instant::now());
            }
            _ => {}
        }
        Ok(())
    }

    async fn run_command(
        &mut self,
        command: Command,
        tx: &mpsc::Sender<AppEvent>,
        cli: &Cli,
    ) -> anyhow::Result<()> {
        let now = Utc::now();
        match command {
            Command::Quit => {
                tx.send(AppEvent::Quit).await?;
                return Ok(());
            }
            Command::Refresh => {
                info!("manual refresh");
                return self.start_fetch(tx, cli, true).await;
            }
            Command::CycleCloudState => {
                self.settings.cloud_state = self.settings.cloud_state.next();
                info!(state = self.settings.cloud_state.label(), "cloud animation changed");
                self.apply_cloud_state(now);
            }
            Command::NextScene => self.set_background_scene(self.settings.background_scene.next(), now),
            Command::PreviousScene => {
                self.set_background_scene(self.settings.background_scene.previous(), now);
            }
            Command::CycleThemeMode => {
                self.settings.theme_mode = self.settings.theme_mode.next();
                self.theme = resolve_theme_from_env(self.settings.theme_mode);
                self.refresh_backdrop(now);
            }
            Command::CycleAccent => self.settings.theme_color = self.settings.theme_color.next(),
            Command::ToggleUnits => self.settings.units = self.settings.units.toggled(),
        }
        self.persist_settings();
        Ok(())
    }

    fn set_background_scene(&mut self, scene: ForcedScene, now: chrono::DateTime<Utc>) {
        self.settings.background_scene = scene;
        info!(scene = scene.label(), "background scene changed");
        self.refresh_backdrop(now);
    }
}
