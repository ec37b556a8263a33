//! Keyboard play on the same environment the agent trains on
//!
//! Arrow keys and WASD choose absolute directions; each tick the latest
//! choice is turned into a relative action for the current heading. The
//! game ticks at the environment's speed, which rises as the snake eats.

use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream, KeyEventKind};
use futures::StreamExt;
use rand::{SeedableRng, rngs::StdRng};
use tokio::time::{Interval, interval};
use tracing::debug;

use super::terminal::{
    RENDER_INTERVAL, Tui, reschedule, restore_terminal, setup_terminal, tick_interval,
};
use crate::game::{Action, Direction, Environment, GameConfig};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::{Renderer, StatusLine};

const CONTROLS: &str = "↑↓←→ / WASD steer | Space pause | R restart | Q quit";

pub struct HumanMode {
    env: Environment,
    rng: StdRng,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
    paused: bool,
    pending_direction: Option<Direction>,
}

impl HumanMode {
    pub fn new(config: GameConfig, seed: Option<u64>) -> Result<Self> {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let env = Environment::new(config, &mut rng).context("Failed to create environment")?;

        Ok(Self {
            env,
            rng,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
            paused: false,
            pending_direction: None,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = setup_terminal()?;

        let result = self.run_game_loop(&mut terminal).await;

        restore_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(&mut self, terminal: &mut Tui) -> Result<()> {
        let mut event_stream = EventStream::new();

        let mut tick_speed = self.env.state().speed;
        let mut tick_timer = interval(tick_interval(tick_speed));
        let mut render_timer = interval(RENDER_INTERVAL);

        let status = StatusLine {
            mode: "HUMAN",
            paused: false,
            detail: None,
            controls: CONTROLS,
        };

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event)?;
                    }
                }

                _ = tick_timer.tick() => {
                    if self.env.state().is_alive && !self.paused {
                        self.update_game()?;
                        retime(&mut tick_timer, &mut tick_speed, self.env.state().speed);
                    }
                }

                _ = render_timer.tick() => {
                    if self.env.state().is_alive && !self.paused {
                        self.metrics.update();
                    }
                    let status = StatusLine { paused: self.paused, ..status.clone() };
                    terminal.draw(|frame| {
                        self.renderer.render(frame, self.env.state(), &self.metrics, &status);
                    }).context("Failed to draw frame")?;
                }

                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        let Event::Key(key) = event else {
            return Ok(());
        };
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        match self.input_handler.handle_key_event(key) {
            KeyAction::Steer(direction) => self.pending_direction = Some(direction),
            KeyAction::Pause => self.paused = !self.paused,
            KeyAction::Restart => self.reset_game()?,
            KeyAction::Quit => self.should_quit = true,
            KeyAction::None => {}
        }

        Ok(())
    }

    /// Relative action for the pending key press, straight when none
    fn next_action(&mut self) -> Action {
        let heading = self.env.state().direction;
        self.pending_direction
            .take()
            .map_or(Action::Straight, |target| Action::towards(heading, target))
    }

    fn update_game(&mut self) -> Result<()> {
        let action = self.next_action();
        let outcome = self.env.step(action, &mut self.rng)?;

        if outcome.terminal {
            debug!(score = outcome.score, cause = ?outcome.cause, "human game over");
            self.metrics.on_game_over(outcome.score);
        }

        Ok(())
    }

    fn reset_game(&mut self) -> Result<()> {
        self.env.reset(&mut self.rng)?;
        self.metrics.on_game_start();
        self.pending_direction = None;
        self.paused = false;
        Ok(())
    }
}

/// Restart the tick timer when the game speed changed
fn retime(timer: &mut Interval, current: &mut f32, speed: f32) {
    if speed != *current {
        *current = speed;
        reschedule(timer, tick_interval(speed));
    }
}
