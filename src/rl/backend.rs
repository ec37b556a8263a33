//! Backend type aliases and device management
//!
//! - **TrainingBackend**: Autodiff-enabled NdArray backend for learning (CPU)
//! - **InferenceBackend**: Plain NdArray backend for gradient-free evaluation
//!
//! The value network is tiny, so the CPU backend is all the agent needs.
//!
//! # Example
//!
//! ```rust
//! use snake_qlearning::rl::{QNetworkConfig, TrainingBackend, default_device};
//!
//! let device = default_device();
//! let network = QNetworkConfig::default().init::<TrainingBackend>(&device);
//! ```

use burn::backend::{
    Autodiff,
    ndarray::{NdArray, NdArrayDevice},
};

/// Backend used by the agent while learning
pub type TrainingBackend = Autodiff<NdArray<f32>>;

/// Backend without gradient tracking
pub type InferenceBackend = NdArray<f32>;

/// Get the default device for computation
pub fn default_device() -> NdArrayDevice {
    NdArrayDevice::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::QNetworkConfig;
    use burn::tensor::Tensor;

    #[test]
    fn test_default_device() {
        assert_eq!(default_device(), NdArrayDevice::default());
    }

    #[test]
    fn test_inference_backend_runs_network() {
        let device = default_device();
        let network = QNetworkConfig::new(8).init::<InferenceBackend>(&device);

        let q_values = network.forward(Tensor::zeros([1, 11], &device));

        assert_eq!(q_values.dims(), [1, 3]);
    }
}
