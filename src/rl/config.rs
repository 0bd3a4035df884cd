//! PPO algorithm hyperparameter configuration

use serde::{Deserialize, Serialize};

/// Configuration for the PPO (Proximal Policy Optimization) algorithm
///
/// Default values follow common PPO implementations and work well for the
/// driving environment's small observation space.
///
/// # Example
///
/// ```rust
/// use ml_drive::rl::PPOConfig;
///
/// // Use default hyperparameters
/// let config = PPOConfig::default();
///
/// // Or customize specific parameters
/// let config = PPOConfig {
///     learning_rate: 1e-3,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PPOConfig {
    /// Learning rate for the Adam optimizer
    ///
    /// Default: 3e-4
    pub learning_rate: f64,

    /// Discount factor for future rewards (gamma)
    ///
    /// Values closer to 1.0 make the agent more far-sighted; with the dense
    /// survival reward here, 0.99 keeps crashes visible many steps ahead.
    ///
    /// Default: 0.99
    pub gamma: f32,

    /// GAE (Generalized Advantage Estimation) lambda parameter
    ///
    /// Controls the bias-variance tradeoff in advantage estimation.
    ///
    /// Default: 0.95
    pub gae_lambda: f32,

    /// PPO clipping parameter (epsilon)
    ///
    /// Limits how much the policy can change in a single update.
    ///
    /// Default: 0.2
    pub clip_epsilon: f32,

    /// Coefficient for the entropy bonus in the loss function
    ///
    /// Default: 0.01
    pub entropy_coef: f32,

    /// Coefficient for the value function loss
    ///
    /// Default: 0.5
    pub value_coef: f32,

    /// Number of optimization epochs per PPO update
    ///
    /// Default: 4
    pub n_epochs: usize,

    /// Minibatch size for training
    ///
    /// Default: 64
    pub batch_size: usize,

    /// Number of environment steps to collect before performing a PPO update;
    /// also the rollout buffer capacity
    ///
    /// Default: 2048
    pub update_frequency: usize,
}

impl PPOConfig {
    /// Create a new configuration with default hyperparameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration parameters
    ///
    /// # Returns
    ///
    /// `Ok(())` if all parameters are in valid ranges, `Err(String)` with an
    /// error message otherwise.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ml_drive::rl::PPOConfig;
    ///
    /// let mut config = PPOConfig::default();
    /// assert!(config.validate().is_ok());
    ///
    /// config.learning_rate = -0.1;
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), String> {
        if self.learning_rate <= 0.0 {
            return Err(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            ));
        }

        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(format!("gamma must be in [0, 1], got {}", self.gamma));
        }

        if !(0.0..=1.0).contains(&self.gae_lambda) {
            return Err(format!(
                "gae_lambda must be in [0, 1], got {}",
                self.gae_lambda
            ));
        }

        if self.clip_epsilon <= 0.0 || self.clip_epsilon > 1.0 {
            return Err(format!(
                "clip_epsilon must be in (0, 1], got {}",
                self.clip_epsilon
            ));
        }

        if self.entropy_coef < 0.0 {
            return Err(format!(
                "entropy_coef must be non-negative, got {}",
                self.entropy_coef
            ));
        }

        if self.value_coef < 0.0 {
            return Err(format!(
                "value_coef must be non-negative, got {}",
                self.value_coef
            ));
        }

        if self.n_epochs == 0 {
            return Err("n_epochs must be at least 1".to_string());
        }

        if self.batch_size == 0 {
            return Err("batch_size must be at least 1".to_string());
        }

        if self.update_frequency == 0 {
            return Err("update_frequency must be at least 1".to_string());
        }

        if self.batch_size > self.update_frequency {
            return Err(format!(
                "batch_size ({}) cannot exceed update_frequency ({})",
                self.batch_size, self.update_frequency
            ));
        }

        Ok(())
    }
}

impl Default for PPOConfig {
    fn default() -> Self {
        Self {
            learning_rate: 3e-4,
            gamma: 0.99,
            gae_lambda: 0.95,
            clip_epsilon: 0.2,
            entropy_coef: 0.01,
            value_coef: 0.5,
            n_epochs: 4,
            batch_size: 64,
            update_frequency: 2048,
        }
    }
}
