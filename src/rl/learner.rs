//! One-step Q-learning update rule
//!
//! Each update regresses the network's prediction for the action actually
//! taken towards the temporal-difference target
//!
//! ```text
//! target = reward                               if the transition was terminal
//! target = reward + γ · max_a Q(next_state, a)  otherwise
//! ```
//!
//! while leaving the other actions' targets equal to the current predictions.
//! The same network evaluates both the current and the next state, and the
//! targets are treated as constants (semi-gradient).

use burn::{
    module::{AutodiffModule, Module},
    optim::{Adam, AdamConfig, GradientsParams, Optimizer, adaptor::OptimizerAdaptor},
    tensor::{ElementConversion, Tensor, TensorData, backend::AutodiffBackend},
};

use super::error::AgentError;
use super::memory::Transition;
use super::network::{QNetwork, QNetworkRecord, tensor_values};
use super::observation::{Observation, observation_batch};
use crate::game::Action;

/// Owns the Q-network and its optimizer
pub struct QLearner<B: AutodiffBackend> {
    /// Q-value network
    network: QNetwork<B>,

    /// Adam optimizer for network parameters
    optim: OptimizerAdaptor<Adam, QNetwork<B>, B>,

    /// Step size passed to the optimizer
    learning_rate: f64,

    /// Discount factor
    gamma: f32,

    /// Number of optimizer steps taken
    updates: usize,

    /// Device for tensor operations
    device: B::Device,
}

impl<B: AutodiffBackend> QLearner<B> {
    pub fn new(network: QNetwork<B>, learning_rate: f64, gamma: f32, device: B::Device) -> Self {
        Self {
            network,
            optim: AdamConfig::new().init(),
            learning_rate,
            gamma,
            updates: 0,
            device,
        }
    }

    /// Q-values for a single observation, indexed by [`Action::index`]
    pub fn predict(&self, observation: &Observation) -> Result<[f32; Action::COUNT], AgentError> {
        self.network.valid().predict(observation, &self.device)
    }

    /// Perform one gradient step on a batch of transitions
    ///
    /// A batch of one is the short-memory update; larger batches are the
    /// replay updates. Returns the mean-squared error before the step.
    pub fn train_step(&mut self, batch: &[&Transition]) -> Result<f32, AgentError> {
        if batch.is_empty() {
            return Err(AgentError::EmptyBatch);
        }

        let states: Tensor<B, 2> =
            observation_batch(batch.iter().map(|t| &t.state), &self.device);

        // Forward pass
        let predicted = self.network.forward(states);

        let predicted_values = tensor_values(predicted.clone().inner())?;
        let next_values = self
            .network
            .valid()
            .q_values(batch.iter().map(|t| &t.next_state), &self.device)?;
        let targets = td_targets(&predicted_values, &next_values, batch, self.gamma);

        let targets: Tensor<B, 2> = Tensor::from_data(
            TensorData::new(targets, [batch.len(), Action::COUNT]),
            &self.device,
        );

        // MSE over every entry of the batch
        let diff = predicted - targets;
        let loss = (diff.clone() * diff).mean();

        // Backward pass
        let grads = loss.backward();

        // Update network parameters
        let grads = GradientsParams::from_grads(grads, &self.network);
        self.network = self
            .optim
            .step(self.learning_rate, self.network.clone(), grads);
        self.updates += 1;

        Ok(loss.into_scalar().elem::<f32>())
    }

    /// Snapshot of the network parameters
    pub fn export_parameters(&self) -> QNetworkRecord<B> {
        self.network.clone().into_record()
    }

    /// Replace the network parameters
    ///
    /// Optimizer moments belong to the old parameters and are discarded.
    pub fn import_parameters(&mut self, record: QNetworkRecord<B>) {
        self.network = self.network.clone().load_record(record);
        self.optim = AdamConfig::new().init();
    }

    /// Number of optimizer steps taken so far
    pub fn updates(&self) -> usize {
        self.updates
    }

}

/// Build the regression targets for a batch
///
/// `predicted` and `next_values` are row-major `[batch, Action::COUNT]`.
/// Each row starts as a copy of the prediction; only the entry of that
/// sample's own action is replaced by its TD target.
pub fn td_targets(
    predicted: &[f32],
    next_values: &[f32],
    batch: &[&Transition],
    gamma: f32,
) -> Vec<f32> {
    let mut targets = predicted.to_vec();

    for (i, transition) in batch.iter().enumerate() {
        let q_new = if transition.terminal {
            transition.reward
        } else {
            let row = &next_values[i * Action::COUNT..(i + 1) * Action::COUNT];
            let best_next = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            transition.reward + gamma * best_next
        };

        targets[i * Action::COUNT + transition.action.index()] = q_new;
    }

    targets
}
