//! Actor-Critic neural network for the driving RL agent
//!
//! A small multilayer perceptron with two heads:
//! - **Actor head**: Outputs action logits for the policy (3 lane actions)
//! - **Critic head**: Outputs a value estimate for state evaluation
//!
//! # Architecture
//!
//! ```text
//! Input: [batch, 4]  (player lane + per-lane nearest distances)
//!   ↓ Linear(4 → 64) + ReLU
//!   ↓ Linear(64 → 64) + ReLU
//!   ↓ Split
//!   ├─→ Actor: Linear(64 → 3) → Action logits
//!   └─→ Critic: Linear(64 → 1) → Value estimate
//! ```
//!
//! The observation is already a compact summary (no spatial structure), so an
//! MLP trunk replaces anything convolutional.
//!
//! # Example
//!
//! ```rust
//! use ml_drive::rl::ActorCriticConfig;
//! use burn::backend::ndarray::NdArrayDevice;
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//!
//! type Backend = NdArray<f32>;
//!
//! let device = NdArrayDevice::default();
//! let config = ActorCriticConfig::new();
//! let network = config.init::<Backend>(&device);
//!
//! let observation = Tensor::zeros([8, 4], &device);
//! let (action_logits, value) = network.forward(observation);
//!
//! assert_eq!(action_logits.dims(), [8, 3]); // [batch, num_actions]
//! assert_eq!(value.dims(), [8, 1]);         // [batch, 1]
//! ```

use burn::{
    module::Module,
    nn::{Linear, LinearConfig},
    tensor::{activation::relu, backend::Backend, Tensor},
};

use super::observation::OBSERVATION_SIZE;
use crate::game::Action;

/// Configuration for the Actor-Critic network
#[derive(Debug, Clone)]
pub struct ActorCriticConfig {
    /// Observation vector length (default: 4)
    pub obs_dim: usize,

    /// Number of actions the policy can output (default: 3)
    pub num_actions: usize,

    /// Width of the two hidden layers (default: 64)
    pub hidden_dim: usize,
}

impl ActorCriticConfig {
    /// Create a configuration matching the environment's fixed observation
    /// and action spaces
    pub fn new() -> Self {
        Self {
            obs_dim: OBSERVATION_SIZE,
            num_actions: Action::COUNT,
            hidden_dim: 64,
        }
    }

    /// Initialize the Actor-Critic network from this configuration
    ///
    /// # Arguments
    ///
    /// * `device` - The device to place the network on
    pub fn init<B: Backend>(&self, device: &B::Device) -> ActorCriticNetwork<B> {
        ActorCriticNetwork {
            fc1: LinearConfig::new(self.obs_dim, self.hidden_dim).init(device),
            fc2: LinearConfig::new(self.hidden_dim, self.hidden_dim).init(device),
            actor_head: LinearConfig::new(self.hidden_dim, self.num_actions).init(device),
            critic_head: LinearConfig::new(self.hidden_dim, 1).init(device),
        }
    }
}

impl Default for ActorCriticConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Actor-Critic network
///
/// Processes observation vectors through a shared MLP trunk and outputs both
/// action logits (policy) and value estimates (critic).
///
/// Generic over the Burn backend so the same definition serves CPU inference
/// and autodiff training.
#[derive(Module, Debug)]
pub struct ActorCriticNetwork<B: Backend> {
    /// First hidden layer: 4 → 64
    fc1: Linear<B>,
    /// Second hidden layer: 64 → 64
    fc2: Linear<B>,
    /// Actor head: outputs action logits
    actor_head: Linear<B>,
    /// Critic head: outputs value estimate
    critic_head: Linear<B>,
}

impl<B: Backend> ActorCriticNetwork<B> {
    /// Forward pass through the network
    ///
    /// # Arguments
    ///
    /// * `observation` - Tensor with shape `[batch, 4]`
    ///
    /// # Returns
    ///
    /// A tuple of:
    /// - `action_logits`: shape `[batch, num_actions]`
    /// - `value`: shape `[batch, 1]`
    pub fn forward(&self, observation: Tensor<B, 2>) -> (Tensor<B, 2>, Tensor<B, 2>) {
        let x = relu(self.fc1.forward(observation));
        let x = relu(self.fc2.forward(x));

        let action_logits = self.actor_head.forward(x.clone());
        let value = self.critic_head.forward(x);

        (action_logits, value)
    }
}
