//! Experience buffer for PPO trajectory collection
//!
//! Stores transitions collected during environment interaction and computes
//! advantages with Generalized Advantage Estimation (GAE) once a rollout is
//! complete.

use burn::tensor::{backend::Backend, Int, Tensor, TensorData};
use rand::seq::SliceRandom;

/// Experience buffer for storing rollout data during PPO training
///
/// Once full, advantages are computed with GAE and the buffer serves batched
/// data for PPO updates.
///
/// # Example
///
/// ```rust
/// use ml_drive::rl::RolloutBuffer;
/// use burn::backend::ndarray::{NdArray, NdArrayDevice};
/// use burn::tensor::Tensor;
///
/// type Backend = NdArray<f32>;
///
/// let device = NdArrayDevice::default();
/// let mut buffer = RolloutBuffer::<Backend>::new(128, device.clone());
///
/// let obs = Tensor::zeros([4], &device);
/// buffer.push(obs, 0, -1.0, 0.1, 0.5, false);
///
/// assert_eq!(buffer.len(), 1);
/// assert!(!buffer.is_full());
/// ```
pub struct RolloutBuffer<B: Backend> {
    /// Stored observations, each a [4] tensor
    observations: Vec<Tensor<B, 1>>,

    /// Action indices taken
    actions: Vec<usize>,

    /// Log probabilities of actions
    log_probs: Vec<f32>,

    /// Rewards received
    rewards: Vec<f32>,

    /// Value estimates
    values: Vec<f32>,

    /// Episode termination flags
    dones: Vec<bool>,

    /// Current position in buffer
    pos: usize,

    /// Maximum buffer capacity
    capacity: usize,

    /// Device for tensor operations
    device: B::Device,

    /// Computed advantages (populated after GAE)
    advantages: Option<Vec<f32>>,

    /// Computed returns (populated after GAE)
    returns: Option<Vec<f32>>,
}

impl<B: Backend> RolloutBuffer<B> {
    /// Create a new rollout buffer with the given capacity
    pub fn new(capacity: usize, device: B::Device) -> Self {
        Self {
            observations: Vec::with_capacity(capacity),
            actions: Vec::with_capacity(capacity),
            log_probs: Vec::with_capacity(capacity),
            rewards: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
            dones: Vec::with_capacity(capacity),
            pos: 0,
            capacity,
            device,
            advantages: None,
            returns: None,
        }
    }

    /// Add a transition to the buffer; silently ignored once at capacity
    pub fn push(
        &mut self,
        observation: Tensor<B, 1>,
        action: usize,
        log_prob: f32,
        reward: f32,
        value: f32,
        done: bool,
    ) {
        if self.pos < self.capacity {
            self.observations.push(observation);
            self.actions.push(action);
            self.log_probs.push(log_prob);
            self.rewards.push(reward);
            self.values.push(value);
            self.dones.push(done);
            self.pos += 1;
        }
    }

    /// Check if the buffer has reached capacity
    pub fn is_full(&self) -> bool {
        self.pos >= self.capacity
    }

    /// Get the number of stored transitions
    pub fn len(&self) -> usize {
        self.pos
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.pos == 0
    }

    /// Compute advantages and returns using Generalized Advantage Estimation
    ///
    /// ```text
    /// δ_t = r_t + γ * V(s_{t+1}) * (1 - done_{t+1}) - V(s_t)
    /// A_t = Σ_{l=0}^{T-t} (γλ)^l * δ_{t+l}
    /// R_t = A_t + V(s_t)
    /// ```
    ///
    /// Advantages are normalized to zero mean and unit variance for training
    /// stability.
    ///
    /// # Arguments
    ///
    /// * `gamma` - Discount factor for future rewards
    /// * `gae_lambda` - GAE lambda parameter for bias-variance tradeoff
    /// * `last_value` - Value estimate V(s_T) for bootstrapping the last state
    /// * `last_done` - Whether the last state was terminal
    pub fn compute_advantages(
        &mut self,
        gamma: f32,
        gae_lambda: f32,
        last_value: f32,
        last_done: bool,
    ) {
        let n = self.len();
        if n == 0 {
            return;
        }

        let mut advantages = vec![0.0; n];
        let mut returns = vec![0.0; n];

        let mut next_value = last_value;
        let mut next_advantage = 0.0;
        let mut next_done = last_done;

        for t in (0..n).rev() {
            // Terminal next states do not bootstrap
            let mask = if next_done { 0.0 } else { 1.0 };

            let delta = self.rewards[t] + gamma * next_value * mask - self.values[t];
            advantages[t] = delta + gamma * gae_lambda * next_advantage * mask;
            returns[t] = advantages[t] + self.values[t];

            next_value = self.values[t];
            next_advantage = advantages[t];
            next_done = self.dones[t];
        }

        // Normalize advantages: (A - mean(A)) / (std(A) + 1e-8)
        let mean = advantages.iter().sum::<f32>() / n as f32;
        let variance = advantages.iter().map(|a| (a - mean).powi(2)).sum::<f32>() / n as f32;
        let std = variance.sqrt();

        for a in &mut advantages {
            *a = (*a - mean) / (std + 1e-8);
        }

        self.advantages = Some(advantages);
        self.returns = Some(returns);
    }

    /// Get a batch of data for training
    ///
    /// # Arguments
    ///
    /// * `indices` - Indices of transitions to include in the batch
    ///
    /// # Returns
    ///
    /// A tuple of `TensorData`:
    /// - observations `[batch, 4]`
    /// - actions `[batch]` (Int)
    /// - old_log_probs `[batch]`
    /// - advantages `[batch]`
    /// - returns `[batch]`
    ///
    /// # Panics
    ///
    /// Panics if advantages have not been computed yet or `indices` is empty.
    pub fn get_batch(
        &self,
        indices: &[usize],
    ) -> (TensorData, TensorData, TensorData, TensorData, TensorData) {
        let advantages = self
            .advantages
            .as_ref()
            .expect("Advantages must be computed before getting batches");
        let returns = self
            .returns
            .as_ref()
            .expect("Returns must be computed before getting batches");
        assert!(!indices.is_empty(), "Cannot create an empty batch");

        // Concatenate [1, 4] rows into the [batch, 4] observation matrix
        let mut obs_tensor: Tensor<B, 2> = self.observations[indices[0]].clone().unsqueeze_dim(0);
        for &i in &indices[1..] {
            let row: Tensor<B, 2> = self.observations[i].clone().unsqueeze_dim(0);
            obs_tensor = Tensor::cat(vec![obs_tensor, row], 0);
        }

        let actions_data: Vec<i32> = indices.iter().map(|&i| self.actions[i] as i32).collect();
        let actions_tensor = Tensor::<B, 1, Int>::from_ints(actions_data.as_slice(), &self.device);

        let log_probs_data: Vec<f32> = indices.iter().map(|&i| self.log_probs[i]).collect();
        let log_probs_tensor: Tensor<B, 1> =
            Tensor::from_floats(log_probs_data.as_slice(), &self.device);

        let advantages_data: Vec<f32> = indices.iter().map(|&i| advantages[i]).collect();
        let advantages_tensor: Tensor<B, 1> =
            Tensor::from_floats(advantages_data.as_slice(), &self.device);

        let returns_data: Vec<f32> = indices.iter().map(|&i| returns[i]).collect();
        let returns_tensor: Tensor<B, 1> =
            Tensor::from_floats(returns_data.as_slice(), &self.device);

        (
            obs_tensor.into_data(),
            actions_tensor.into_data(),
            log_probs_tensor.into_data(),
            advantages_tensor.into_data(),
            returns_tensor.into_data(),
        )
    }

    /// Sample shuffled minibatch indices covering the whole buffer
    ///
    /// The last batch may be smaller when the buffer size is not evenly
    /// divisible by `batch_size`.
    pub fn sample_indices(&self, batch_size: usize) -> Vec<Vec<usize>> {
        let n = self.len();
        let mut indices: Vec<usize> = (0..n).collect();

        let mut rng = rand::thread_rng();
        indices.shuffle(&mut rng);

        indices.chunks(batch_size).map(|c| c.to_vec()).collect()
    }

    /// Clear the buffer for the next rollout
    pub fn clear(&mut self) {
        self.observations.clear();
        self.actions.clear();
        self.log_probs.clear();
        self.rewards.clear();
        self.values.clear();
        self.dones.clear();
        self.pos = 0;
        self.advantages = None;
        self.returns = None;
    }
}
