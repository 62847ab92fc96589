//! Keyboard input handlers for the application

use anyhow::Result;
use crossterm::event::KeyCode;

use super::state::*;
use super::App;
use crate::tasks::recipes::Recipe;

impl App {
    /// Handle keyboard input
    pub async fn handle_key(&mut self, key: KeyCode) -> Result<()> {
        // Handle exit confirmation dialog
        if self.show_exit_confirm {
            match key {
                KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.should_quit = true;
                }
                KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                    self.show_exit_confirm = false;
                }
                _ => {}
            }
            return Ok(());
        }

        match &mut self.mode {
            AppMode::MainMenu { selected } => match key {
                KeyCode::Up | KeyCode::Char('k') => {
                    if *selected > 0 {
                        *selected -= 1;
                    }
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    if *selected + 1 < Recipe::ALL.len() {
                        *selected += 1;
                    }
                }
                KeyCode::Enter => {
                    let recipe = Recipe::ALL[*selected];
                    self.start_recipe(recipe)?;
                }
                KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => {
                    self.show_exit_confirm = true;
                }
                _ => {}
            },

            AppMode::Task(task) => match &mut task.phase {
                TaskPhase::Running { .. } => {
                    // The only affordance while running is the stop request
                    if matches!(key, KeyCode::Esc | KeyCode::Char('c') | KeyCode::Char('C')) {
                        self.cancel_task();
                    }
                }
                TaskPhase::AwaitingConfirmation(prompt) => match key {
                    KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                        if let Some(reply) = prompt.reply.take() {
                            let _ = reply.send(true);
                        }
                        task.phase = TaskPhase::Running { cancelling: false };
                    }
                    KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                        if let Some(reply) = prompt.reply.take() {
                            let _ = reply.send(false);
                        }
                        task.phase = TaskPhase::Running { cancelling: false };
                    }
                    _ => {}
                },
                TaskPhase::Complete { scroll_offset, .. } => match key {
                    KeyCode::Up | KeyCode::Char('k') => {
                        let current = scroll_offset
                            .unwrap_or_else(|| task.output.len().saturating_sub(1));
                        *scroll_offset = Some(current.saturating_sub(1));
                    }
                    KeyCode::Down | KeyCode::Char('j') => {
                        let max = task.output.len().saturating_sub(1);
                        let current = scroll_offset.unwrap_or(max);
                        *scroll_offset = Some((current + 1).min(max));
                    }
                    KeyCode::Enter | KeyCode::Esc | KeyCode::Backspace => {
                        self.mode = AppMode::MainMenu { selected: 0 };
                    }
                    KeyCode::Char('q') | KeyCode::Char('Q') => {
                        self.show_exit_confirm = true;
                    }
                    _ => {}
                },
            },
        }

        Ok(())
    }
}
