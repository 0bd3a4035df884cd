//! Model persistence for saving and loading trained agents
//!
//! Saves and loads trained PPO agents: network weights through Burn's Record
//! system, plus a JSON metadata sidecar describing the configuration the
//! model was trained with.

use super::{ActorCriticConfig, ActorCriticNetwork, PPOAgent, PPOConfig};
use crate::game::Action;
use crate::rl::observation::OBSERVATION_SIZE;
use anyhow::{bail, Context, Result};
use burn::{
    module::Module,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Metadata saved with the model
///
/// Contains the configuration and training counters needed to reconstruct a
/// saved model and to reject incompatible files early.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// PPO configuration used during training
    pub ppo_config: PPOConfig,

    /// Observation vector length the network was built for
    pub obs_dim: usize,

    /// Number of discrete actions the network was built for
    pub num_actions: usize,

    /// Total training steps completed
    pub training_steps: usize,

    /// Number of episodes trained
    pub episodes_trained: usize,

    /// Version identifier for compatibility checking
    pub version: String,
}

impl ModelMetadata {
    /// Create new metadata with the crate's fixed observation/action spaces
    pub fn new(ppo_config: PPOConfig, training_steps: usize, episodes_trained: usize) -> Self {
        Self {
            ppo_config,
            obs_dim: OBSERVATION_SIZE,
            num_actions: Action::COUNT,
            training_steps,
            episodes_trained,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Save a trained PPO agent to a file
///
/// The model is saved in two files:
/// - `<path>` - Network weights (Burn record format)
/// - `<path>.meta.json` - Metadata as JSON
///
/// Creates parent directories if they don't exist.
pub fn save_model<B: AutodiffBackend>(agent: &PPOAgent<B>, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    let network = agent.network();
    let record = network.clone().into_record();

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    recorder
        .record(record, path.to_path_buf())
        .context("Failed to save network weights")?;

    let metadata = ModelMetadata::new(
        agent.config().clone(),
        agent.training_step(),
        agent.episodes_trained(),
    );

    let meta_path = path.with_extension("meta.json");
    let meta_json =
        serde_json::to_string_pretty(&metadata).context("Failed to serialize metadata")?;
    std::fs::write(&meta_path, meta_json)
        .with_context(|| format!("Failed to write metadata to {:?}", meta_path))?;

    Ok(())
}

/// Load a trained network from a file
///
/// Reads the metadata sidecar first and fails fast when the saved model was
/// built for a different observation or action space.
///
/// # Arguments
///
/// * `path` - Path to the saved model file (without .meta.json extension)
/// * `device` - Device to load the model onto
///
/// # Returns
///
/// The loaded network together with its metadata.
pub fn load_network<B: AutodiffBackend>(
    path: &Path,
    device: &B::Device,
) -> Result<(ActorCriticNetwork<B>, ModelMetadata)> {
    let meta_path = path.with_extension("meta.json");
    let meta_json = std::fs::read_to_string(&meta_path)
        .with_context(|| format!("Failed to read metadata from {:?}", meta_path))?;
    let metadata: ModelMetadata =
        serde_json::from_str(&meta_json).context("Failed to deserialize metadata")?;

    if metadata.obs_dim != OBSERVATION_SIZE || metadata.num_actions != Action::COUNT {
        bail!(
            "model at {:?} was trained for obs_dim={}, num_actions={} (expected {}, {})",
            path,
            metadata.obs_dim,
            metadata.num_actions,
            OBSERVATION_SIZE,
            Action::COUNT
        );
    }

    let mut network = ActorCriticConfig::new().init::<B>(device);

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    let record = recorder
        .load(path.to_path_buf(), device)
        .with_context(|| format!("Failed to load network weights from {:?}", path))?;

    network = network.load_record(record);

    Ok((network, metadata))
}
