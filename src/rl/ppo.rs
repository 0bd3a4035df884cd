//! PPO (Proximal Policy Optimization) agent implementation
//!
//! Implements the PPO algorithm for training the driving agent: action
//! selection, clipped-objective loss computation, and parameter updates.

use super::buffer::RolloutBuffer;
use super::config::PPOConfig;
use super::network::ActorCriticNetwork;
use burn::{
    module::AutodiffModule,
    optim::{adaptor::OptimizerAdaptor, Adam, AdamConfig, GradientsParams, Optimizer},
    tensor::{
        activation::{log_softmax, softmax},
        backend::AutodiffBackend,
        ElementConversion, Int, Tensor,
    },
};
use rand::Rng;

/// PPO agent for reinforcement learning
///
/// Combines the actor-critic network with the PPO training algorithm:
/// experience collection, advantage estimation, and policy optimization.
///
/// # Example
///
/// ```rust,ignore
/// use ml_drive::rl::{ActorCriticConfig, PPOAgent, PPOConfig, TrainingBackend, default_device};
///
/// let device = default_device();
/// let network = ActorCriticConfig::new().init::<TrainingBackend>(&device);
/// let agent = PPOAgent::new(network, PPOConfig::default(), device);
/// ```
pub struct PPOAgent<B: AutodiffBackend> {
    /// Actor-Critic neural network
    network: ActorCriticNetwork<B>,

    /// Adam optimizer for network parameters
    optim: OptimizerAdaptor<Adam, ActorCriticNetwork<B>, B>,

    /// PPO hyperparameters
    config: PPOConfig,

    /// Experience buffer for rollout data
    buffer: RolloutBuffer<B::InnerBackend>,

    /// Training step counter
    training_step: usize,

    /// Episode counter
    episodes_trained: usize,

    /// Device for tensor operations
    device: B::Device,
}

impl<B: AutodiffBackend> PPOAgent<B> {
    /// Create a new PPO agent
    ///
    /// # Panics
    ///
    /// Panics if `config` fails validation.
    pub fn new(network: ActorCriticNetwork<B>, config: PPOConfig, device: B::Device) -> Self {
        config.validate().expect("Invalid PPO configuration");

        let optim = AdamConfig::new().init();
        let buffer = RolloutBuffer::new(config.update_frequency, device.clone());

        Self {
            network,
            optim,
            config,
            buffer,
            training_step: 0,
            episodes_trained: 0,
            device,
        }
    }

    /// Select an action from an observation during rollout
    ///
    /// Samples from the policy distribution and returns the action index, its
    /// log probability, and the value estimate V(s).
    ///
    /// # Arguments
    ///
    /// * `observation` - Observation tensor [4]
    pub fn select_action(&self, observation: Tensor<B::InnerBackend, 1>) -> (usize, f32, f32) {
        let device = observation.device();

        let obs_batch = observation.unsqueeze_dim(0); // [1, 4]

        // Forward pass in valid (no-grad) mode
        let network = self.network.clone().valid();
        let (action_logits, value) = network.forward(obs_batch);

        // Sample action from the categorical distribution
        let action_probs = softmax(action_logits.clone(), 1); // [1, num_actions]
        let action_idx = sample_categorical(&action_probs);

        // Log probability of the selected action
        let log_probs = log_softmax(action_logits, 1);
        let action_tensor =
            Tensor::<B::InnerBackend, 1, Int>::from_ints([action_idx as i32], &device);
        let log_prob = log_probs
            .gather(1, action_tensor.unsqueeze_dim(1))
            .squeeze::<1>(1)
            .into_scalar()
            .elem::<f32>();

        let value_scalar = value.squeeze::<1>(1).into_scalar().elem::<f32>();

        (action_idx, log_prob, value_scalar)
    }

    /// Store a transition in the buffer
    pub fn store_transition(
        &mut self,
        observation: Tensor<B::InnerBackend, 1>,
        action: usize,
        log_prob: f32,
        reward: f32,
        value: f32,
        done: bool,
    ) {
        self.buffer
            .push(observation, action, log_prob, reward, value, done);
    }

    /// Check if the buffer is full and ready for update
    pub fn should_update(&self) -> bool {
        self.buffer.is_full()
    }

    /// Perform a PPO update
    ///
    /// Computes advantages using GAE, then performs multiple epochs of
    /// minibatch updates with the clipped PPO objective.
    ///
    /// # Arguments
    ///
    /// * `last_value` - Value estimate for the last state (for bootstrapping)
    /// * `last_done` - Whether the last state was terminal
    ///
    /// # Returns
    ///
    /// Averages of (policy_loss, value_loss, entropy, total_loss).
    pub fn update(&mut self, last_value: f32, last_done: bool) -> (f32, f32, f32, f32) {
        self.buffer.compute_advantages(
            self.config.gamma,
            self.config.gae_lambda,
            last_value,
            last_done,
        );

        let mut total_policy_loss = 0.0;
        let mut total_value_loss = 0.0;
        let mut total_entropy = 0.0;
        let mut n_updates = 0;

        for _epoch in 0..self.config.n_epochs {
            let batch_indices = self.buffer.sample_indices(self.config.batch_size);

            for indices in batch_indices {
                let (obs_data, actions_data, old_log_probs_data, advantages_data, returns_data) =
                    self.buffer.get_batch(&indices);

                // Construct tensors directly on the autodiff backend
                let obs: Tensor<B, 2> = Tensor::from_data(obs_data, &self.device);
                let actions: Tensor<B, 1, Int> = Tensor::from_data(actions_data, &self.device);
                let old_log_probs: Tensor<B, 1> =
                    Tensor::from_data(old_log_probs_data, &self.device);
                let advantages: Tensor<B, 1> = Tensor::from_data(advantages_data, &self.device);
                let returns: Tensor<B, 1> = Tensor::from_data(returns_data, &self.device);

                let (action_logits, values) = self.network.forward(obs);

                let (policy_loss, entropy) =
                    self.compute_policy_loss(&action_logits, &actions, &old_log_probs, &advantages);
                let value_loss = self.compute_value_loss(&values, &returns);

                // Total loss: L_policy - c_entropy * H + c_value * L_value
                let total_loss = policy_loss.clone() - entropy.clone() * self.config.entropy_coef
                    + value_loss.clone() * self.config.value_coef;

                let grads = total_loss.backward();
                let grads = GradientsParams::from_grads(grads, &self.network);
                self.network =
                    self.optim
                        .step(self.config.learning_rate, self.network.clone(), grads);

                total_policy_loss += policy_loss.into_scalar().elem::<f32>();
                total_value_loss += value_loss.into_scalar().elem::<f32>();
                total_entropy += entropy.into_scalar().elem::<f32>();
                n_updates += 1;
            }
        }

        self.buffer.clear();
        self.training_step += 1;

        let n = n_updates as f32;
        (
            total_policy_loss / n,
            total_value_loss / n,
            total_entropy / n,
            (total_policy_loss + total_value_loss) / n,
        )
    }

    /// Compute the clipped PPO policy loss
    ///
    /// Implements the clipped surrogate objective
    /// `L = -E[min(r * A, clip(r, 1-ε, 1+ε) * A)]` with `r = π_new / π_old`,
    /// plus the policy entropy used for the exploration bonus.
    fn compute_policy_loss(
        &self,
        action_logits: &Tensor<B, 2>,
        actions: &Tensor<B, 1, Int>,
        old_log_probs: &Tensor<B, 1>,
        advantages: &Tensor<B, 1>,
    ) -> (Tensor<B, 1>, Tensor<B, 1>) {
        let log_probs = log_softmax(action_logits.clone(), 1);
        let new_log_probs = log_probs
            .gather(1, actions.clone().unsqueeze_dim(1))
            .squeeze(1);

        // Probability ratio: r = exp(log π_new - log π_old)
        let ratio = (new_log_probs.clone() - old_log_probs.clone()).exp();

        let surr1 = ratio.clone() * advantages.clone();
        let surr2 = ratio.clamp(
            1.0 - self.config.clip_epsilon,
            1.0 + self.config.clip_epsilon,
        ) * advantages.clone();

        let policy_loss = surr1.min_pair(surr2).neg().mean();

        // Entropy: -E[Σ π(a|s) * log π(a|s)]
        let probs = softmax(action_logits.clone(), 1);
        let log_probs_all = log_softmax(action_logits.clone(), 1);
        let entropy = (probs * log_probs_all).sum_dim(1).neg().mean();

        (policy_loss, entropy)
    }

    /// Compute the value function loss (MSE against returns)
    fn compute_value_loss(&self, values: &Tensor<B, 2>, returns: &Tensor<B, 1>) -> Tensor<B, 1> {
        let values = values.clone().squeeze(1); // [batch]
        let diff = values - returns.clone();
        (diff.clone() * diff).mean()
    }

    /// Get the current training step
    pub fn training_step(&self) -> usize {
        self.training_step
    }

    /// Get a reference to the neural network
    pub fn network(&self) -> &ActorCriticNetwork<B> {
        &self.network
    }

    /// Get a reference to the PPO configuration
    pub fn config(&self) -> &PPOConfig {
        &self.config
    }

    /// Get the number of episodes trained
    pub fn episodes_trained(&self) -> usize {
        self.episodes_trained
    }

    /// Increment the episode counter
    pub fn increment_episode(&mut self) {
        self.episodes_trained += 1;
    }
}

/// Sample an action index from a categorical distribution `[1, num_actions]`
fn sample_categorical<B: burn::tensor::backend::Backend>(probs: &Tensor<B, 2>) -> usize {
    let probs_data = probs.to_data();
    let probs_slice: Vec<f32> = probs_data.to_vec().expect("Failed to convert probs to vec");

    let mut rng = rand::thread_rng();
    let random_val: f32 = rng.sample(rand::distributions::Standard);
    let mut cumsum = 0.0;

    for (idx, &prob) in probs_slice.iter().enumerate() {
        cumsum += prob;
        if random_val < cumsum {
            return idx;
        }
    }

    // Fallback to last action
    probs_slice.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Action, GameConfig};
    use crate::rl::{ActorCriticConfig, DriveEnvironment};
    use burn::backend::{
        ndarray::{NdArray, NdArrayDevice},
        Autodiff,
    };

    type TestBackend = Autodiff<NdArray<f32>>;
    type TestInferenceBackend = NdArray<f32>;

    fn create_test_agent() -> PPOAgent<TestBackend> {
        let device = NdArrayDevice::default();
        let network = ActorCriticConfig::new().init::<TestBackend>(&device);
        let mut ppo_config = PPOConfig::default();
        ppo_config.update_frequency = 128; // Smaller for tests
        ppo_config.batch_size = 32;

        PPOAgent::new(network, ppo_config, device)
    }

    fn create_test_observation() -> Tensor<TestInferenceBackend, 1> {
        let device = NdArrayDevice::default();
        Tensor::from_floats([1.0, 500.0, 500.0, 500.0], &device)
    }

    #[test]
    fn test_agent_creation() {
        let agent = create_test_agent();
        assert_eq!(agent.training_step(), 0);
        assert!(!agent.should_update());
    }

    #[test]
    fn test_select_action() {
        let agent = create_test_agent();
        let obs = create_test_observation();

        let (action, log_prob, value) = agent.select_action(obs);

        assert!(action < Action::COUNT);
        assert!(log_prob < 0.0);
        assert!(value.is_finite());
    }

    #[test]
    fn test_buffer_fills() {
        let mut agent = create_test_agent();
        let obs = create_test_observation();

        for _ in 0..128 {
            agent.store_transition(obs.clone(), 0, -1.0, 1.0, 0.5, false);
        }

        assert!(agent.should_update());
    }

    #[test]
    fn test_update_with_small_buffer() {
        let device = NdArrayDevice::default();
        let network = ActorCriticConfig::new().init::<TestBackend>(&device);
        let mut ppo_config = PPOConfig::default();
        ppo_config.update_frequency = 32;
        ppo_config.batch_size = 16;
        ppo_config.n_epochs = 2;

        let mut agent = PPOAgent::new(network, ppo_config, device);

        for _ in 0..32 {
            agent.store_transition(create_test_observation(), 0, -1.0, 1.0, 0.5, false);
        }
        assert!(agent.should_update());

        let (policy_loss, value_loss, entropy, total_loss) = agent.update(0.5, false);

        assert!(policy_loss.is_finite());
        assert!(value_loss.is_finite());
        assert!(entropy.is_finite());
        assert!(total_loss.is_finite());

        // Buffer cleared, step counted
        assert!(!agent.should_update());
        assert_eq!(agent.training_step(), 1);
    }

    #[test]
    fn test_policy_loss_computation() {
        let agent = create_test_agent();
        let device = NdArrayDevice::default();

        let action_logits = Tensor::from_floats([[1.0, 2.0, 3.0]], &device);
        let actions = Tensor::from_ints([2], &device);
        let old_log_probs = Tensor::from_floats([-1.5], &device);
        let advantages = Tensor::from_floats([0.5], &device);

        let (policy_loss, entropy) =
            agent.compute_policy_loss(&action_logits, &actions, &old_log_probs, &advantages);

        assert_eq!(policy_loss.dims(), [1]);

        let entropy_val: f32 = entropy.into_scalar().elem();
        assert!(entropy_val > 0.0);
    }

    #[test]
    fn test_value_loss_computation() {
        let agent = create_test_agent();
        let device = NdArrayDevice::default();

        let values = Tensor::from_floats([[0.5], [0.8], [0.3]], &device);
        let returns = Tensor::from_floats([0.6, 0.7, 0.4], &device);

        let value_loss = agent.compute_value_loss(&values, &returns);

        assert_eq!(value_loss.dims(), [1]);
        let loss_val: f32 = value_loss.into_scalar().elem();
        assert!(loss_val >= 0.0);
    }

    #[test]
    fn test_integration_with_environment() {
        let device = NdArrayDevice::default();

        let mut env =
            DriveEnvironment::<TestInferenceBackend>::with_seed(GameConfig::default(), 5, device);

        let network = ActorCriticConfig::new().init::<TestBackend>(&device);
        let mut ppo_config = PPOConfig::default();
        ppo_config.update_frequency = 32;
        ppo_config.batch_size = 16;
        ppo_config.n_epochs = 2;

        let mut agent = PPOAgent::new(network, ppo_config, device);

        let mut obs = env.reset();
        for _ in 0..32 {
            let (action, log_prob, value) = agent.select_action(obs.clone());
            let (next_obs, reward, done) = env.step(action);

            agent.store_transition(obs, action, log_prob, reward, value, done);

            if done {
                obs = env.reset();
            } else {
                obs = next_obs;
            }
        }

        assert!(agent.should_update());

        let (_, _, last_value) = agent.select_action(obs);
        let (p_loss, v_loss, entropy, _) = agent.update(last_value, false);

        assert!(p_loss.is_finite());
        assert!(v_loss.is_finite());
        assert!(entropy.is_finite());
    }
}
