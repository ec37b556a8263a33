//! Checkpoint persistence for trained agents
//!
//! A checkpoint is two files:
//! - `<path>` - network weights (Burn named MessagePack record)
//! - `<path>.meta.json` - agent configuration and training progress

use anyhow::{Context, Result};
use burn::{
    module::Module,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
    tensor::backend::{AutodiffBackend, Backend},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use super::{Agent, AgentConfig, QNetwork, QNetworkConfig};

/// Metadata saved next to the weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Hyperparameters the network was trained with
    pub agent_config: AgentConfig,

    /// Games played when the checkpoint was written
    pub n_games: usize,

    /// Best score reached so far
    pub record: u32,

    /// Version identifier for compatibility checking
    pub version: String,
}

impl ModelMetadata {
    pub fn new(agent_config: AgentConfig, n_games: usize, record: u32) -> Self {
        Self {
            agent_config,
            n_games,
            record,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Path of the metadata file belonging to a weights file
pub fn metadata_path(path: &Path) -> PathBuf {
    let mut meta = path.as_os_str().to_owned();
    meta.push(".meta.json");
    PathBuf::from(meta)
}

/// Save an agent's network and metadata
///
/// Creates parent directories if they don't exist.
pub fn save_model<B: AutodiffBackend>(agent: &Agent<B>, record: u32, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    recorder
        .record(agent.export_parameters(), path.to_path_buf())
        .context("Failed to save network weights")?;

    let metadata = ModelMetadata::new(agent.config().clone(), agent.n_games(), record);
    let meta_path = metadata_path(path);
    let meta_json =
        serde_json::to_string_pretty(&metadata).context("Failed to serialize metadata")?;
    std::fs::write(&meta_path, meta_json)
        .with_context(|| format!("Failed to write metadata to {:?}", meta_path))?;

    info!(path = %path.display(), n_games = agent.n_games(), record, "checkpoint saved");
    Ok(())
}

/// Read the metadata of a checkpoint
pub fn load_metadata(path: &Path) -> Result<ModelMetadata> {
    let meta_path = metadata_path(path);
    let meta_json = std::fs::read_to_string(&meta_path)
        .with_context(|| format!("Failed to read metadata from {:?}", meta_path))?;
    serde_json::from_str(&meta_json).context("Failed to deserialize metadata")
}

/// Load only the network of a checkpoint
///
/// Works on any backend, so greedy play can skip gradient tracking.
pub fn load_network<B: Backend>(
    path: &Path,
    device: &B::Device,
) -> Result<(QNetwork<B>, ModelMetadata)> {
    let metadata = load_metadata(path)?;

    let network = QNetworkConfig::new(metadata.agent_config.hidden_size).init::<B>(device);
    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    let record = recorder
        .load(path.to_path_buf(), device)
        .with_context(|| format!("Failed to load network weights from {:?}", path))?;

    Ok((network.load_record(record), metadata))
}

/// Rebuild an agent from a checkpoint
///
/// The agent's game counter is restored from the metadata; replay memory
/// starts empty.
pub fn load_agent<B: AutodiffBackend>(
    path: &Path,
    device: &B::Device,
) -> Result<(Agent<B>, ModelMetadata)> {
    let (network, metadata) = load_network::<B>(path, device)?;

    let mut agent = Agent::from_network(metadata.agent_config.clone(), network, device.clone())
        .context("Checkpoint holds an invalid agent configuration")?;
    agent.set_n_games(metadata.n_games);

    Ok((agent, metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Action;
    use crate::rl::{InferenceBackend, TrainingBackend, argmax, default_device};
    use rand::{SeedableRng, rngs::StdRng};
    use tempfile::TempDir;

    fn small_agent() -> Agent<TrainingBackend> {
        let config = AgentConfig {
            hidden_size: 16,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        Agent::new(config, default_device(), &mut rng).unwrap()
    }

    #[test]
    fn test_metadata_path() {
        assert_eq!(
            metadata_path(Path::new("model/model.mpk")),
            PathBuf::from("model/model.mpk.meta.json")
        );
    }

    #[test]
    fn test_metadata_serialization() {
        let metadata = ModelMetadata::new(AgentConfig::default(), 120, 42);

        let json = serde_json::to_string(&metadata).unwrap();
        let deserialized: ModelMetadata = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized, metadata);
        assert_eq!(deserialized.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("model.mpk");

        let mut agent = small_agent();
        for _ in 0..5 {
            agent.finish_game();
        }
        save_model(&agent, 17, &path).unwrap();

        assert!(metadata_path(&path).exists());

        let (loaded, metadata) = load_agent::<TrainingBackend>(&path, &default_device()).unwrap();
        assert_eq!(metadata.n_games, 5);
        assert_eq!(metadata.record, 17);
        assert_eq!(loaded.n_games(), 5);
        assert_eq!(loaded.config().hidden_size, 16);

        let obs = [0, 1, 0, 1, 0, 0, 0, 0, 1, 1, 0];
        assert_eq!(
            loaded.greedy_action(&obs).unwrap(),
            agent.greedy_action(&obs).unwrap()
        );
    }

    #[test]
    fn test_load_network_without_autodiff() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.mpk");
        let agent = small_agent();
        save_model(&agent, 3, &path).unwrap();

        let device = default_device();
        let (network, metadata) = load_network::<InferenceBackend>(&path, &device).unwrap();

        assert_eq!(metadata.record, 3);
        let obs = [1, 0, 0, 0, 1, 0, 0, 1, 0, 1, 0];
        let q_values = network.predict(&obs, &device).unwrap();
        assert_eq!(
            Action::ALL[argmax(&q_values)],
            agent.greedy_action(&obs).unwrap()
        );
    }

    #[test]
    fn test_load_missing_checkpoint_fails() {
        let dir = TempDir::new().unwrap();
        let result = load_agent::<TrainingBackend>(&dir.path().join("absent.mpk"), &default_device());
        assert!(result.is_err());
    }
}
