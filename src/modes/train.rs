//! Training mode for the Q-learning agent
//!
//! Drives the agent against the environment one step at a time:
//!
//! ```text
//! encode → select action → step → encode → train short → remember
//! ```
//!
//! When a game ends the environment is reset, the game counter advances, a
//! long-memory update runs, and a checkpoint is written if the score is a new
//! record.
//!
//! # Example
//!
//! ```rust,no_run
//! use snake_qlearning::modes::{TrainConfig, TrainMode};
//! use snake_qlearning::rl::{TrainingBackend, default_device};
//! use std::path::PathBuf;
//!
//! let config = TrainConfig::new(500, PathBuf::from("model"));
//! let mut train_mode = TrainMode::<TrainingBackend>::new(config, default_device())?;
//! train_mode.run()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context, Result, anyhow};
use burn::tensor::backend::AutodiffBackend;
use rand::{SeedableRng, rngs::StdRng};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

use crate::game::{Environment, GameConfig};
use crate::metrics::TrainingStats;
use crate::rl::{Agent, AgentConfig, Transition, load_agent, save_model};

/// File name of the best-so-far checkpoint inside the model directory
pub const MODEL_FILE_NAME: &str = "model.mpk";

/// Configuration for training mode
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Number of games to play, 0 to run until interrupted
    pub num_episodes: usize,

    /// Directory receiving checkpoints
    pub model_dir: PathBuf,

    /// Log a statistics summary every N games
    pub log_frequency: usize,

    /// Seed for every random draw of the run, network initialisation included
    pub seed: u64,

    /// Continue from the checkpoint in `model_dir` when one exists
    pub resume: bool,

    /// Window of the rolling statistics
    pub stats_window: usize,

    /// Board, pacing and rewards
    pub game_config: GameConfig,

    /// Agent hyperparameters
    pub agent_config: AgentConfig,
}

impl TrainConfig {
    /// Create a training configuration with default game and agent settings
    ///
    /// ```rust
    /// use snake_qlearning::modes::TrainConfig;
    /// use std::path::PathBuf;
    ///
    /// let config = TrainConfig::new(1000, PathBuf::from("model"));
    /// assert_eq!(config.num_episodes, 1000);
    /// ```
    pub fn new(num_episodes: usize, model_dir: PathBuf) -> Self {
        Self {
            num_episodes,
            model_dir,
            log_frequency: 100,
            seed: 0,
            resume: false,
            stats_window: 100,
            game_config: GameConfig::default(),
            agent_config: AgentConfig::default(),
        }
    }

    /// Path of the best-so-far checkpoint
    pub fn model_path(&self) -> PathBuf {
        self.model_dir.join(MODEL_FILE_NAME)
    }
}

/// Training orchestrator
pub struct TrainMode<B: AutodiffBackend> {
    /// Agent being trained
    agent: Agent<B>,

    /// Snake environment
    env: Environment,

    /// Single generator behind every random draw
    rng: StdRng,

    /// Training statistics tracker
    stats: TrainingStats,

    /// Training configuration
    config: TrainConfig,

    /// Set to stop after the current step
    stop: Arc<AtomicBool>,

    /// Steps taken in the current game
    game_steps: usize,
}

impl<B: AutodiffBackend> TrainMode<B> {
    pub fn new(config: TrainConfig, device: B::Device) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(config.seed);

        let env = Environment::new(config.game_config.clone(), &mut rng)
            .context("Failed to create environment")?;
        let mut stats = TrainingStats::new(config.stats_window);

        let model_path = config.model_path();
        let agent = if config.resume && model_path.exists() {
            let (agent, metadata) = load_agent::<B>(&model_path, &device)
                .with_context(|| format!("Failed to resume from {:?}", model_path))?;
            info!(
                path = %model_path.display(),
                n_games = metadata.n_games,
                record = metadata.record,
                "resuming from checkpoint"
            );
            // Only a better score may overwrite the checkpoint
            stats.set_record(metadata.record);
            agent
        } else {
            Agent::new(config.agent_config.clone(), device, &mut rng)
                .context("Failed to create agent")?
        };

        Ok(Self {
            agent,
            env,
            rng,
            stats,
            config,
            stop: Arc::new(AtomicBool::new(false)),
            game_steps: 0,
        })
    }

    /// Flag that ends the run when set, e.g. from a Ctrl+C handler
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Train until the episode limit is reached or the stop flag is set
    pub fn run(&mut self) -> Result<&TrainingStats> {
        self.log_header();

        while !self.should_stop() {
            self.train_step()?;
        }

        info!(summary = %self.stats.format_summary(), "training finished");
        Ok(&self.stats)
    }

    /// Train on a blocking thread until done or interrupted by Ctrl+C
    ///
    /// The loop is CPU bound, so it runs outside the async workers and the
    /// interrupt handler keeps running alongside it.
    pub async fn run_blocking(mut self) -> Result<TrainingStats>
    where
        Self: Send + 'static,
    {
        let stop = self.stop_handle();
        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, stopping after the current step");
                stop.store(true, Ordering::SeqCst);
            }
        });

        let result = tokio::task::spawn_blocking(move || self.run().cloned())
            .await
            .context("Training task failed");
        interrupt.abort();

        result?
    }

    /// Play one environment step and learn from it
    ///
    /// Returns the final score when the step ended a game.
    pub fn train_step(&mut self) -> Result<Option<u32>> {
        let state_old = self.agent.get_state(self.env.state());
        let action = self.agent.select_action(&state_old, &mut self.rng)?;

        let outcome = self.env.step(action, &mut self.rng)?;
        let state_new = self.agent.get_state(self.env.state());
        self.game_steps += 1;

        let transition = Transition::new(
            state_old,
            action,
            outcome.reward,
            state_new,
            outcome.terminal,
        );
        self.agent.train_short(&transition)?;
        self.agent.remember(transition);

        if !outcome.terminal {
            return Ok(None);
        }

        self.finish_game(outcome.score)?;
        Ok(Some(outcome.score))
    }

    fn finish_game(&mut self, score: u32) -> Result<()> {
        self.env.reset(&mut self.rng)?;
        self.agent.finish_game();

        if let Some(loss) = self.agent.train_long(&mut self.rng)? {
            debug!(loss, memory = self.agent.memory().len(), "long memory update");
            self.stats.record_loss(loss);
        }

        let new_record = self.stats.record_game(score, self.game_steps);
        self.game_steps = 0;

        if new_record {
            info!(record = score, "new record");
            self.save_checkpoint()?;
        }

        info!(
            game = self.agent.n_games(),
            score,
            record = self.stats.record(),
            mean_score = self.stats.mean_score(),
            "game finished"
        );

        let games = self.stats.total_games();
        if self.config.log_frequency > 0 && games % self.config.log_frequency == 0 {
            info!("{}", self.stats.format_summary());
        }

        Ok(())
    }

    fn save_checkpoint(&self) -> Result<()> {
        let path = self.config.model_path();
        save_model(&self.agent, self.stats.record(), &path)
            .with_context(|| format!("Failed to save checkpoint to {:?}", path))
    }

    fn should_stop(&self) -> bool {
        if self.stop.load(Ordering::SeqCst) {
            return true;
        }
        self.config.num_episodes > 0 && self.stats.total_games() >= self.config.num_episodes
    }

    fn log_header(&self) {
        let game = &self.config.game_config;
        let agent = self.agent.config();
        let episodes = match self.config.num_episodes {
            0 => "until interrupted".to_string(),
            n => n.to_string(),
        };

        info!(
            episodes = %episodes,
            board = %format!("{}x{} cells", game.columns(), game.rows()),
            seed = self.config.seed,
            "starting Q-learning training"
        );
        info!(
            learning_rate = agent.learning_rate,
            gamma = agent.gamma,
            hidden_size = agent.hidden_size,
            batch_size = agent.batch_size,
            memory_capacity = agent.memory_capacity,
            model = %self.config.model_path().display(),
            "agent configuration"
        );
    }

    pub fn agent(&self) -> &Agent<B> {
        &self.agent
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }
}

/// Validate a training configuration before any work starts
pub fn validate_config(config: &TrainConfig) -> Result<()> {
    config
        .game_config
        .validate()
        .map_err(|err| anyhow!("invalid game configuration: {err}"))?;
    config
        .agent_config
        .validate()
        .map_err(|err| anyhow!("invalid agent configuration: {err}"))?;
    if config.stats_window == 0 {
        return Err(anyhow!("stats window must be at least 1"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameState;
    use crate::rl::{TrainingBackend, default_device};
    use tempfile::TempDir;

    fn test_config(num_episodes: usize, dir: &TempDir) -> TrainConfig {
        let mut config = TrainConfig::new(num_episodes, dir.path().to_path_buf());
        config.game_config = GameConfig {
            stall_factor: 5,
            ..GameConfig::small()
        };
        config.agent_config = AgentConfig {
            hidden_size: 16,
            batch_size: 32,
            ..Default::default()
        };
        config.seed = 3;
        config
    }

    /// Board after every step, plus the final score of steps that ended a game
    fn trajectory(config: TrainConfig, steps: usize) -> Vec<(GameState, Option<u32>)> {
        let mut mode = TrainMode::<TrainingBackend>::new(config, default_device()).unwrap();
        (0..steps)
            .map(|_| {
                let ended = mode.train_step().unwrap();
                (mode.environment().state().clone(), ended)
            })
            .collect()
    }

    #[test]
    fn test_train_config_creation() {
        let config = TrainConfig::new(1000, PathBuf::from("model"));
        assert_eq!(config.num_episodes, 1000);
        assert_eq!(config.model_path(), PathBuf::from("model").join("model.mpk"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_agent_config() {
        let mut config = TrainConfig::new(1, PathBuf::from("model"));
        config.agent_config.gamma = 3.0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_train_step_fills_memory() {
        let dir = TempDir::new().unwrap();
        let mut mode =
            TrainMode::<TrainingBackend>::new(test_config(1, &dir), default_device()).unwrap();

        mode.train_step().unwrap();

        assert_eq!(mode.agent().memory().len(), 1);
        assert_eq!(mode.agent().updates(), 1);
    }

    #[test]
    fn test_run_fixed_number_of_games() {
        let dir = TempDir::new().unwrap();
        let config = test_config(3, &dir);
        let model_path = config.model_path();
        let mut mode = TrainMode::<TrainingBackend>::new(config, default_device()).unwrap();

        let stats = mode.run().unwrap();
        assert_eq!(stats.total_games(), 3);
        let record = stats.record();

        assert_eq!(mode.agent().n_games(), 3);
        // Every game ends with a long-memory update on top of the per-step ones
        assert_eq!(mode.agent().updates(), mode.stats().total_steps() + 3);
        assert!(mode.environment().state().is_alive);

        if record > 0 {
            let (agent, metadata) =
                load_agent::<TrainingBackend>(&model_path, &default_device()).unwrap();
            assert_eq!(metadata.record, record);
            assert!(agent.n_games() <= 3);
        } else {
            assert!(!model_path.exists());
        }
    }

    #[test]
    fn test_stop_flag_ends_run() {
        let dir = TempDir::new().unwrap();
        let mut mode =
            TrainMode::<TrainingBackend>::new(test_config(0, &dir), default_device()).unwrap();

        mode.stop_handle().store(true, Ordering::SeqCst);
        let stats = mode.run().unwrap();

        assert_eq!(stats.total_games(), 0);
    }

    #[tokio::test]
    async fn test_stop_reaches_blocking_run() {
        let dir = TempDir::new().unwrap();
        let mode =
            TrainMode::<TrainingBackend>::new(test_config(0, &dir), default_device()).unwrap();
        let stop = mode.stop_handle();
        let stopped = mode.stop_handle();

        // Single-threaded test runtime: this only fires if training is off it
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            stop.store(true, Ordering::SeqCst);
        });

        // Unbounded run, so only the flag can end it
        mode.run_blocking().await.unwrap();
        assert!(stopped.load(Ordering::SeqCst));
    }

    #[test]
    fn test_same_seed_same_run() {
        let first_dir = TempDir::new().unwrap();
        let second_dir = TempDir::new().unwrap();
        let greedy = |dir: &TempDir| {
            let mut config = test_config(0, dir);
            config.agent_config.exploration_base = 0;
            config
        };

        let first = trajectory(greedy(&first_dir), 200);
        let second = trajectory(greedy(&second_dir), 200);

        assert!(first.iter().any(|(_, ended)| ended.is_some()));
        assert_eq!(first, second);
    }

    #[test]
    fn test_resume_restores_agent_and_record() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config(0, &dir);
        let model_path = config.model_path();

        let mut mode = TrainMode::<TrainingBackend>::new(config.clone(), default_device()).unwrap();
        for _ in 0..5 {
            mode.agent.finish_game();
        }
        save_model(&mode.agent, 6, &model_path).unwrap();

        config.resume = true;
        config.seed = 99;
        let resumed = TrainMode::<TrainingBackend>::new(config, default_device()).unwrap();

        assert_eq!(resumed.agent().n_games(), 5);
        assert_eq!(resumed.stats().record(), 6);
        let obs = [0, 1, 0, 0, 1, 0, 0, 1, 0, 0, 1];
        assert_eq!(
            resumed.agent().greedy_action(&obs).unwrap(),
            mode.agent().greedy_action(&obs).unwrap()
        );
    }

    #[test]
    fn test_resume_without_checkpoint_starts_fresh() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config(0, &dir);
        config.resume = true;

        let mode = TrainMode::<TrainingBackend>::new(config, default_device()).unwrap();

        assert_eq!(mode.agent().n_games(), 0);
        assert_eq!(mode.stats().record(), 0);
    }
}
