//! Q-value network for the Snake agent
//!
//! A two-layer perceptron mapping an observation to one value estimate per
//! relative action.
//!
//! # Architecture
//!
//! ```text
//! Input: [batch, 11]
//!   ↓ Linear(11 → hidden) + ReLU
//!   ↓ Linear(hidden → 3)
//! Output: [batch, 3] Q-values (straight, right, left)
//! ```
//!
//! # Example
//!
//! ```rust
//! use snake_qlearning::rl::QNetworkConfig;
//! use burn::backend::ndarray::NdArrayDevice;
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//!
//! type Backend = NdArray<f32>;
//!
//! let device = NdArrayDevice::default();
//! let network = QNetworkConfig::new(256).init::<Backend>(&device);
//!
//! let observation = Tensor::zeros([4, 11], &device);
//! let q_values = network.forward(observation);
//!
//! assert_eq!(q_values.dims(), [4, 3]);
//! ```

use burn::{
    module::{Module, Param},
    nn::{Linear, LinearConfig},
    tensor::{Tensor, TensorData, activation::relu, backend::Backend},
};
use rand::Rng;

use super::error::AgentError;
use super::observation::{OBSERVATION_SIZE, Observation, observation_batch};
use crate::game::Action;

/// Configuration for the Q-value network
#[derive(Debug, Clone)]
pub struct QNetworkConfig {
    /// Number of input features (default: 11)
    pub input_size: usize,

    /// Hidden layer width (default: 256)
    pub hidden_size: usize,

    /// Number of actions (default: 3)
    pub num_actions: usize,
}

impl QNetworkConfig {
    /// Create a configuration for the standard observation and action sizes
    pub fn new(hidden_size: usize) -> Self {
        Self {
            input_size: OBSERVATION_SIZE,
            hidden_size,
            num_actions: Action::COUNT,
        }
    }

    /// Initialize the network from this configuration
    pub fn init<B: Backend>(&self, device: &B::Device) -> QNetwork<B> {
        QNetwork {
            hidden: LinearConfig::new(self.input_size, self.hidden_size).init(device),
            output: LinearConfig::new(self.hidden_size, self.num_actions).init(device),
        }
    }

    /// Initialize the network with weights drawn from `rng`
    ///
    /// Uses the same distribution as [`init`](Self::init), uniform in
    /// `±1/sqrt(fan_in)` for weights and biases, but takes its randomness from
    /// the caller so a seeded run starts from the same network every time.
    pub fn init_with_rng<B: Backend, R: Rng>(
        &self,
        device: &B::Device,
        rng: &mut R,
    ) -> QNetwork<B> {
        QNetwork {
            hidden: linear_from_rng(self.input_size, self.hidden_size, device, rng),
            output: linear_from_rng(self.hidden_size, self.num_actions, device, rng),
        }
    }
}

fn linear_from_rng<B: Backend, R: Rng>(
    d_input: usize,
    d_output: usize,
    device: &B::Device,
    rng: &mut R,
) -> Linear<B> {
    let bound = 1.0 / (d_input as f32).sqrt();
    let mut uniform = |n: usize| -> Vec<f32> {
        (0..n).map(|_| rng.gen_range(-bound..bound)).collect()
    };

    let weight = TensorData::new(uniform(d_input * d_output), [d_input, d_output]);
    let bias = TensorData::new(uniform(d_output), [d_output]);

    Linear {
        weight: Param::from_tensor(Tensor::from_data(weight, device)),
        bias: Some(Param::from_tensor(Tensor::from_data(bias, device))),
    }
}

impl Default for QNetworkConfig {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Linear Q-network
///
/// Generic over the Backend so the same definition serves training
/// (`Autodiff<NdArray>`) and greedy play (`NdArray`).
#[derive(Module, Debug)]
pub struct QNetwork<B: Backend> {
    /// Input → hidden layer
    hidden: Linear<B>,
    /// Hidden → action values, no activation
    output: Linear<B>,
}

impl<B: Backend> QNetwork<B> {
    /// Forward pass
    ///
    /// * `observation` - Tensor with shape `[batch, 11]`
    ///
    /// Returns Q-values with shape `[batch, 3]`.
    pub fn forward(&self, observation: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.hidden.forward(observation);
        let x = relu(x);
        self.output.forward(x)
    }

    /// Q-values for a single observation, indexed by [`Action::index`]
    pub fn predict(
        &self,
        observation: &Observation,
        device: &B::Device,
    ) -> Result<[f32; Action::COUNT], AgentError> {
        let values = self.q_values([observation], device)?;
        let mut q = [0.0; Action::COUNT];
        q.copy_from_slice(&values[..Action::COUNT]);
        Ok(q)
    }

    /// Flat row-major Q-values for a sequence of observations
    pub fn q_values<'a>(
        &self,
        observations: impl IntoIterator<Item = &'a Observation>,
        device: &B::Device,
    ) -> Result<Vec<f32>, AgentError> {
        let batch: Tensor<B, 2> = observation_batch(observations, device);
        tensor_values(self.forward(batch))
    }
}

pub(crate) fn tensor_values<B: Backend>(tensor: Tensor<B, 2>) -> Result<Vec<f32>, AgentError> {
    tensor
        .into_data()
        .to_vec::<f32>()
        .map_err(|err| AgentError::Tensor(format!("{err:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::Autodiff;
    use burn::backend::ndarray::{NdArray, NdArrayDevice};
    use burn::tensor::{Distribution, TensorData};

    type TestBackend = NdArray<f32>;
    type TestAutodiffBackend = Autodiff<NdArray<f32>>;

    #[test]
    fn test_forward_pass_shapes() {
        let device = NdArrayDevice::default();
        let network = QNetworkConfig::default().init::<TestBackend>(&device);

        for batch_size in [1, 4, 32] {
            let observation = Tensor::zeros([batch_size, OBSERVATION_SIZE], &device);
            assert_eq!(network.forward(observation).dims(), [batch_size, 3]);
        }
    }

    #[test]
    fn test_custom_hidden_size() {
        let device = NdArrayDevice::default();
        let network = QNetworkConfig::new(8).init::<TestBackend>(&device);

        let observation = Tensor::ones([2, OBSERVATION_SIZE], &device);
        assert_eq!(network.forward(observation).dims(), [2, 3]);
    }

    #[test]
    fn test_seeded_init_is_reproducible() {
        use rand::{SeedableRng, rngs::StdRng};

        let device = NdArrayDevice::default();
        let config = QNetworkConfig::new(16);
        let init = |seed| {
            config.init_with_rng::<TestBackend, _>(&device, &mut StdRng::seed_from_u64(seed))
        };
        let first = init(5);
        let second = init(5);
        let other = init(6);

        let observation = Tensor::<TestBackend, 2>::ones([1, OBSERVATION_SIZE], &device);
        let values = |network: &QNetwork<TestBackend>| {
            network
                .forward(observation.clone())
                .into_data()
                .to_vec::<f32>()
                .unwrap()
        };

        assert_eq!(values(&first), values(&second));
        assert_ne!(values(&first), values(&other));

        let weights = first.hidden.weight.val().into_data().to_vec::<f32>().unwrap();
        let bound = 1.0 / (OBSERVATION_SIZE as f32).sqrt();
        assert!(weights.iter().all(|w| w.abs() <= bound));
    }

    #[test]
    fn test_gradient_flow() {
        let device = NdArrayDevice::default();
        let network = QNetworkConfig::default().init::<TestAutodiffBackend>(&device);

        let observation = Tensor::ones([1, OBSERVATION_SIZE], &device).require_grad();
        let loss = network.forward(observation.clone()).sum();
        let gradients = loss.backward();

        assert!(
            observation.grad(&gradients).is_some(),
            "Gradients should flow back to input observation"
        );
    }

    #[test]
    fn test_predict_matches_batched_values() {
        let device = NdArrayDevice::default();
        let network = QNetworkConfig::new(8).init::<TestBackend>(&device);
        let first = [1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0];
        let second = [0, 0, 1, 1, 0, 0, 0, 1, 0, 0, 1];

        let values = network.q_values([&first, &second], &device).unwrap();
        let single = network.predict(&second, &device).unwrap();

        assert_eq!(values.len(), 2 * Action::COUNT);
        for (a, b) in single.iter().zip(&values[Action::COUNT..]) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn test_batch_consistency() {
        let device = NdArrayDevice::default();
        let network = QNetworkConfig::default().init::<TestBackend>(&device);

        let single = Tensor::ones([1, OBSERVATION_SIZE], &device);
        let batch = Tensor::cat(vec![single.clone(), single.clone(), single.clone()], 0);

        let single_data: TensorData = network.forward(single).into_data();
        let batch_data: TensorData = network.forward(batch).into_data();

        let single_vals = single_data.as_slice::<f32>().unwrap();
        let batch_vals = batch_data.as_slice::<f32>().unwrap();

        for row in 0..3 {
            for j in 0..3 {
                let diff = (single_vals[j] - batch_vals[row * 3 + j]).abs();
                assert!(diff < 1e-5, "row {row} column {j} differs by {diff}");
            }
        }
    }

    #[test]
    fn test_output_finite() {
        let device = NdArrayDevice::default();
        let network = QNetworkConfig::default().init::<TestBackend>(&device);

        let observation =
            Tensor::random([8, OBSERVATION_SIZE], Distribution::Uniform(0.0, 1.0), &device);
        let data: TensorData = network.forward(observation).into_data();

        for &val in data.as_slice::<f32>().unwrap() {
            assert!(val.is_finite(), "Q-values should be finite, got: {}", val);
        }
    }
}
