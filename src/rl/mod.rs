//! Reinforcement learning stack for the driving game
//!
//! Provides:
//! - Vector observations (player lane + per-lane nearest-obstacle distances)
//! - A Burn-compatible RL environment interface
//! - Backend-agnostic tensor operations
//! - Actor-Critic MLP for PPO training
//! - PPO algorithm configuration, training, and model persistence

pub mod backend;
pub mod buffer;
pub mod config;
pub mod environment;
pub mod network;
pub mod observation;
pub mod persistence;
pub mod ppo;

pub use backend::{default_device, InferenceBackend, TrainingBackend};
pub use buffer::RolloutBuffer;
pub use config::PPOConfig;
pub use environment::DriveEnvironment;
pub use network::{ActorCriticConfig, ActorCriticNetwork};
pub use observation::{create_observation, OBSERVATION_SIZE};
pub use persistence::{load_network, save_model, ModelMetadata};
pub use ppo::PPOAgent;
