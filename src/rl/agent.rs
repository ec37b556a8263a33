//! Deep Q-learning agent
//!
//! Combines the Q-network learner with replay memory and a decaying
//! epsilon-greedy exploration schedule.

use burn::tensor::backend::AutodiffBackend;
use rand::Rng;

use super::config::AgentConfig;
use super::error::AgentError;
use super::learner::QLearner;
use super::memory::{ReplayMemory, Transition};
use super::network::{QNetwork, QNetworkConfig, QNetworkRecord};
use super::observation::{Observation, create_observation};
use crate::game::{Action, GameState};

/// Deep Q-learning agent
///
/// # Type Parameters
///
/// * `B` - Autodiff backend for gradient computation
///
/// # Example
///
/// ```rust
/// use snake_qlearning::rl::{Agent, AgentConfig, TrainingBackend, default_device};
///
/// use rand::{SeedableRng, rngs::StdRng};
///
/// let config = AgentConfig { hidden_size: 16, ..Default::default() };
/// let mut rng = StdRng::seed_from_u64(0);
/// let agent = Agent::<TrainingBackend>::new(config, default_device(), &mut rng).unwrap();
///
/// assert_eq!(agent.n_games(), 0);
/// assert_eq!(agent.epsilon(), 80);
/// ```
pub struct Agent<B: AutodiffBackend> {
    /// Hyperparameters
    config: AgentConfig,

    /// Games finished so far
    n_games: usize,

    /// Exploration threshold used by the last action selection
    epsilon: u32,

    /// Experience replay memory
    memory: ReplayMemory,

    /// Network and optimizer
    learner: QLearner<B>,
}

impl<B: AutodiffBackend> Agent<B> {
    /// Create an agent with a freshly initialised network
    ///
    /// The initial weights are drawn from `rng`.
    pub fn new<R: Rng>(
        config: AgentConfig,
        device: B::Device,
        rng: &mut R,
    ) -> Result<Self, AgentError> {
        config.validate().map_err(AgentError::InvalidConfig)?;
        let network = QNetworkConfig::new(config.hidden_size).init_with_rng(&device, rng);
        Ok(Self::assemble(config, network, device))
    }

    /// Create an agent around an existing network
    pub fn from_network(
        config: AgentConfig,
        network: QNetwork<B>,
        device: B::Device,
    ) -> Result<Self, AgentError> {
        config.validate().map_err(AgentError::InvalidConfig)?;
        Ok(Self::assemble(config, network, device))
    }

    fn assemble(config: AgentConfig, network: QNetwork<B>, device: B::Device) -> Self {
        let learner = QLearner::new(network, config.learning_rate, config.gamma, device);
        Self {
            epsilon: config.exploration_base,
            memory: ReplayMemory::new(config.memory_capacity),
            n_games: 0,
            learner,
            config,
        }
    }

    /// Encode a game snapshot
    pub fn get_state(&self, state: &GameState) -> Observation {
        create_observation(state)
    }

    /// Current exploration threshold, `max(0, base - n_games)`
    pub fn exploration_threshold(&self) -> u32 {
        let n_games = u32::try_from(self.n_games).unwrap_or(u32::MAX);
        self.config.exploration_base.saturating_sub(n_games)
    }

    /// Choose an action with the epsilon-greedy policy
    ///
    /// With probability `epsilon / exploration_range` a uniformly random
    /// action is taken, otherwise the action with the highest Q-value.
    pub fn select_action<R: Rng>(
        &mut self,
        observation: &Observation,
        rng: &mut R,
    ) -> Result<Action, AgentError> {
        self.epsilon = self.exploration_threshold();

        if rng.gen_range(0..self.config.exploration_range) < self.epsilon {
            let index = rng.gen_range(0..Action::COUNT);
            return Ok(Action::ALL[index]);
        }

        self.greedy_action(observation)
    }

    /// Action with the highest predicted Q-value; ties go to the lowest index
    pub fn greedy_action(&self, observation: &Observation) -> Result<Action, AgentError> {
        let q_values = self.learner.predict(observation)?;
        Ok(Action::ALL[argmax(&q_values)])
    }

    /// Store a transition in replay memory
    pub fn remember(&mut self, transition: Transition) {
        self.memory.push(transition);
    }

    /// Single-transition update applied after every step
    pub fn train_short(&mut self, transition: &Transition) -> Result<f32, AgentError> {
        self.learner.train_step(&[transition])
    }

    /// Replay update on a batch drawn from memory
    ///
    /// Uses every stored transition when fewer than `batch_size` are stored.
    /// Returns `None` without touching the network when memory is empty.
    pub fn train_long<R: Rng>(&mut self, rng: &mut R) -> Result<Option<f32>, AgentError> {
        if self.memory.is_empty() {
            return Ok(None);
        }

        let batch = self.memory.sample(self.config.batch_size, rng);
        let loss = self.learner.train_step(&batch)?;
        Ok(Some(loss))
    }

    /// Record the end of a game
    pub fn finish_game(&mut self) {
        self.n_games += 1;
    }

    /// Snapshot of the network parameters
    pub fn export_parameters(&self) -> QNetworkRecord<B> {
        self.learner.export_parameters()
    }

    /// Replace the network parameters
    pub fn import_parameters(&mut self, record: QNetworkRecord<B>) {
        self.learner.import_parameters(record);
    }

    /// Restore the game counter, e.g. after loading a checkpoint
    pub fn set_n_games(&mut self, n_games: usize) {
        self.n_games = n_games;
        self.epsilon = self.exploration_threshold();
    }

    pub fn n_games(&self) -> usize {
        self.n_games
    }

    pub fn epsilon(&self) -> u32 {
        self.epsilon
    }

    pub fn memory(&self) -> &ReplayMemory {
        &self.memory
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Number of gradient steps taken
    pub fn updates(&self) -> usize {
        self.learner.updates()
    }
}

/// Index of the largest value, preferring the lowest index on ties
pub fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &value) in values.iter().enumerate().skip(1) {
        if value > values[best] {
            best = i;
        }
    }
    best
}
