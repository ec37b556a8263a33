//! Watch a trained agent play
//!
//! Loads a checkpoint and lets the agent play greedily (no exploration),
//! restarting automatically after every game.
//!
//! # Controls
//!
//! - Space: Pause/unpause
//! - R: Restart the current game
//! - 1-4: Playback rate (half, normal, double, 5x the game speed)
//! - Q/Esc: Quit

use anyhow::{Context, Result};
use burn::tensor::backend::Backend;
use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind};
use futures::StreamExt;
use rand::{SeedableRng, rngs::StdRng};
use std::path::{Path, PathBuf};
use tokio::time::interval;
use tracing::{debug, info};

use super::terminal::{
    RENDER_INTERVAL, Tui, reschedule, restore_terminal, setup_terminal, tick_interval,
};
use crate::game::{Action, Environment, GameConfig};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::{Renderer, StatusLine};
use crate::rl::{ModelMetadata, QNetwork, argmax, create_observation, load_network};

const CONTROLS: &str = "Space pause | R restart | 1-4 playback rate | Q quit";

/// Multiplier applied to the environment's own speed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackRate {
    Half,
    Normal,
    Double,
    Fast,
}

impl PlaybackRate {
    pub fn factor(self) -> f32 {
        match self {
            Self::Half => 0.5,
            Self::Normal => 1.0,
            Self::Double => 2.0,
            Self::Fast => 5.0,
        }
    }

    fn from_key(c: char) -> Option<Self> {
        match c {
            '1' => Some(Self::Half),
            '2' => Some(Self::Normal),
            '3' => Some(Self::Double),
            '4' => Some(Self::Fast),
            _ => None,
        }
    }
}

/// Greedy playback of a checkpoint
///
/// Only needs a forward pass, so it runs on a backend without autodiff.
pub struct WatchMode<B: Backend> {
    /// Network restored from the checkpoint
    network: QNetwork<B>,

    device: B::Device,

    env: Environment,
    rng: StdRng,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    metadata: ModelMetadata,
    model_path: PathBuf,
    should_quit: bool,
    paused: bool,
    rate: PlaybackRate,
}

impl<B: Backend> WatchMode<B> {
    pub fn new(
        model_path: &Path,
        config: GameConfig,
        seed: Option<u64>,
        device: B::Device,
    ) -> Result<Self> {
        let (network, metadata) = load_network::<B>(model_path, &device)
            .with_context(|| format!("Failed to load model from {:?}", model_path))?;

        info!(
            path = %model_path.display(),
            n_games = metadata.n_games,
            record = metadata.record,
            version = %metadata.version,
            "loaded checkpoint"
        );

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let env = Environment::new(config, &mut rng).context("Failed to create environment")?;

        Ok(Self {
            network,
            device,
            env,
            rng,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            metadata,
            model_path: model_path.to_path_buf(),
            should_quit: false,
            paused: false,
            rate: PlaybackRate::Normal,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = setup_terminal()?;

        let result = self.run_watch_loop(&mut terminal).await;

        restore_terminal(&mut terminal)?;

        result
    }

    async fn run_watch_loop(&mut self, terminal: &mut Tui) -> Result<()> {
        let mut event_stream = EventStream::new();

        let mut tick_period = self.tick_period();
        let mut tick_timer = interval(tick_period);
        let mut render_timer = interval(RENDER_INTERVAL);

        let detail = format!(
            "{} | trained games: {} | record: {}",
            self.model_path.display(),
            self.metadata.n_games,
            self.metadata.record
        );

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event)?;
                    }
                }

                _ = tick_timer.tick() => {
                    if !self.paused {
                        self.advance()?;
                    }
                }

                _ = render_timer.tick() => {
                    self.metrics.update();
                    let status = StatusLine {
                        mode: "WATCH",
                        paused: self.paused,
                        detail: Some(detail.clone()),
                        controls: CONTROLS,
                    };
                    terminal.draw(|frame| {
                        self.renderer.render(frame, self.env.state(), &self.metrics, &status);
                    }).context("Failed to draw frame")?;
                }

                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            // Speed grows as the snake eats and changes with the playback rate
            let period = self.tick_period();
            if period != tick_period {
                tick_period = period;
                reschedule(&mut tick_timer, period);
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Play one greedy step, or start a new game after a terminal one
    fn advance(&mut self) -> Result<()> {
        if !self.env.state().is_alive {
            self.restart()?;
            return Ok(());
        }

        let observation = create_observation(self.env.state());
        let q_values = self.network.predict(&observation, &self.device)?;
        let action = Action::ALL[argmax(&q_values)];
        let outcome = self.env.step(action, &mut self.rng)?;

        if outcome.terminal {
            debug!(score = outcome.score, cause = ?outcome.cause, "agent game over");
            self.metrics.on_game_over(outcome.score);
        }

        Ok(())
    }

    fn restart(&mut self) -> Result<()> {
        self.env.reset(&mut self.rng)?;
        self.metrics.on_game_start();
        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        let Event::Key(key) = event else {
            return Ok(());
        };
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        if let KeyCode::Char(c) = key.code {
            if let Some(rate) = PlaybackRate::from_key(c) {
                self.rate = rate;
                return Ok(());
            }
        }

        match self.input_handler.handle_key_event(key) {
            KeyAction::Pause => self.paused = !self.paused,
            KeyAction::Restart => self.restart()?,
            KeyAction::Quit => self.should_quit = true,
            KeyAction::Steer(_) | KeyAction::None => {}
        }

        Ok(())
    }

    fn tick_period(&self) -> std::time::Duration {
        tick_interval(self.env.state().speed * self.rate.factor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::{
        Agent, AgentConfig, InferenceBackend, TrainingBackend, default_device, save_model,
    };
    use crossterm::event::{KeyEvent, KeyModifiers};
    use tempfile::TempDir;

    fn save_checkpoint(dir: &TempDir) -> (Agent<TrainingBackend>, PathBuf) {
        let model_path = dir.path().join("model.mpk");
        let config = AgentConfig {
            hidden_size: 16,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let agent = Agent::<TrainingBackend>::new(config, default_device(), &mut rng).unwrap();
        save_model(&agent, 4, &model_path).unwrap();
        (agent, model_path)
    }

    fn create_mode(dir: &TempDir) -> WatchMode<InferenceBackend> {
        let (_, model_path) = save_checkpoint(dir);
        WatchMode::new(&model_path, GameConfig::small(), Some(9), default_device()).unwrap()
    }

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[test]
    fn test_playback_rate_factor() {
        assert_eq!(PlaybackRate::Half.factor(), 0.5);
        assert_eq!(PlaybackRate::Normal.factor(), 1.0);
        assert_eq!(PlaybackRate::from_key('3'), Some(PlaybackRate::Double));
        assert_eq!(PlaybackRate::from_key('9'), None);
    }

    #[test]
    fn test_watch_mode_creation() {
        let dir = TempDir::new().unwrap();
        let mode = create_mode(&dir);

        assert_eq!(mode.metadata.record, 4);
        assert!(!mode.paused);
        assert_eq!(mode.rate, PlaybackRate::Normal);
        assert!(mode.env.state().is_alive);
    }

    #[test]
    fn test_missing_model_fails() {
        let dir = TempDir::new().unwrap();
        let result = WatchMode::<InferenceBackend>::new(
            &dir.path().join("missing.mpk"),
            GameConfig::small(),
            None,
            default_device(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_plays_the_trained_greedy_action() {
        let dir = TempDir::new().unwrap();
        let (agent, model_path) = save_checkpoint(&dir);
        let mut mode = WatchMode::<InferenceBackend>::new(
            &model_path,
            GameConfig::small(),
            Some(9),
            default_device(),
        )
        .unwrap();

        let mut rng = StdRng::seed_from_u64(9);
        let mut env = Environment::new(GameConfig::small(), &mut rng).unwrap();
        for _ in 0..10 {
            if !env.state().is_alive {
                break;
            }
            let action = agent.greedy_action(&agent.get_state(env.state())).unwrap();
            env.step(action, &mut rng).unwrap();
            mode.advance().unwrap();

            assert_eq!(mode.env.state(), env.state());
        }
    }

    #[test]
    fn test_agent_plays_and_restarts() {
        let dir = TempDir::new().unwrap();
        let mut mode = create_mode(&dir);

        // Greedy play on a small board ends quickly: it either hits something
        // or stalls out
        let mut ticks = 0;
        while mode.metrics.games_played == 0 {
            mode.advance().unwrap();
            ticks += 1;
            assert!(ticks < 20_000);
        }
        assert!(!mode.env.state().is_alive);

        mode.advance().unwrap();
        assert!(mode.env.state().is_alive);
    }

    #[test]
    fn test_keys_change_rate_and_pause() {
        let dir = TempDir::new().unwrap();
        let mut mode = create_mode(&dir);
        let normal = mode.tick_period();

        mode.handle_event(key('4')).unwrap();
        assert_eq!(mode.rate, PlaybackRate::Fast);
        assert!(mode.tick_period() < normal);

        mode.handle_event(key(' ')).unwrap();
        assert!(mode.paused);

        mode.handle_event(key('q')).unwrap();
        assert!(mode.should_quit);
    }
}
