//! Training mode for the PPO agent
//!
//! Implements the training loop: collect experience by driving episodes in
//! the environment, update the agent with PPO when the rollout buffer fills,
//! and periodically save checkpoints.

use anyhow::{Context, Result};
use burn::tensor::backend::AutodiffBackend;
use std::path::{Path, PathBuf};

use crate::game::GameConfig;
use crate::metrics::TrainingStats;
use crate::rl::{save_model, ActorCriticConfig, DriveEnvironment, PPOAgent, PPOConfig};

/// Configuration for training mode
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Number of episodes to train
    pub num_episodes: usize,

    /// Path to save the final trained model
    pub save_path: PathBuf,

    /// Save a checkpoint every N episodes
    pub checkpoint_frequency: usize,

    /// Log training progress every N episodes
    pub log_frequency: usize,

    /// Cut episodes off after this many steps. The engine itself never
    /// truncates; the time limit is this driver's.
    pub max_episode_steps: usize,

    /// Optional engine seed for reproducible episode streams
    pub seed: Option<u64>,

    /// Game configuration (corridor geometry, rewards)
    pub game_config: GameConfig,

    /// PPO hyperparameters
    pub ppo_config: PPOConfig,
}

impl TrainConfig {
    /// Create a new training configuration with defaults
    pub fn new(num_episodes: usize, save_path: PathBuf) -> Self {
        Self {
            num_episodes,
            save_path,
            checkpoint_frequency: 1000,
            log_frequency: 100,
            max_episode_steps: 10_000,
            seed: None,
            game_config: GameConfig::default(),
            ppo_config: PPOConfig::default(),
        }
    }
}

/// Training mode for the PPO agent
///
/// Runs the training loop, collecting experiences and updating the agent,
/// with periodic progress logs and checkpoints.
pub struct TrainMode<B: AutodiffBackend> {
    /// PPO agent being trained
    agent: PPOAgent<B>,

    /// Driving environment for experience collection
    env: DriveEnvironment<B::InnerBackend>,

    /// Training statistics tracker
    stats: TrainingStats,

    /// Training configuration
    config: TrainConfig,

    /// Current episode number
    current_episode: usize,

    /// Total steps across all episodes
    total_steps: usize,
}

impl<B: AutodiffBackend> TrainMode<B> {
    /// Create a new training mode
    ///
    /// # Arguments
    ///
    /// * `config` - Training configuration
    /// * `device` - Device for computation
    pub fn new(config: TrainConfig, device: B::Device) -> Self {
        let network = ActorCriticConfig::new().init::<B>(&device);

        let agent = PPOAgent::new(network, config.ppo_config.clone(), device.clone());

        let env = match config.seed {
            Some(seed) => DriveEnvironment::with_seed(config.game_config.clone(), seed, device),
            None => DriveEnvironment::new(config.game_config.clone(), device),
        };

        // 100-episode rolling window for progress logs
        let stats = TrainingStats::new(100);

        Self {
            agent,
            env,
            stats,
            config,
            current_episode: 0,
            total_steps: 0,
        }
    }

    /// Run the training loop
    ///
    /// Trains the agent for the configured number of episodes, logging
    /// progress and saving checkpoints periodically, then saves the final
    /// model.
    pub fn run(&mut self) -> Result<()> {
        self.print_header();

        for episode in 0..self.config.num_episodes {
            self.current_episode = episode;

            let (episode_reward, episode_steps, episode_score) = self.run_episode()?;

            self.stats
                .record_episode(episode_reward, episode_steps, episode_score);
            self.agent.increment_episode();

            if (episode + 1) % self.config.log_frequency == 0 {
                self.print_progress(episode + 1);
            }

            if (episode + 1) % self.config.checkpoint_frequency == 0 {
                self.save_checkpoint()?;
            }
        }

        self.save_model()?;

        println!("\nTraining complete!");
        println!("Final model saved to: {:?}", self.config.save_path);
        println!("\nFinal Statistics:");
        println!("{}", self.stats.format_summary());

        Ok(())
    }

    /// Run a single training episode
    ///
    /// Collects transitions until the car crashes or the driver-side step
    /// limit is hit, running PPO updates whenever the buffer fills.
    ///
    /// # Returns
    ///
    /// (total episode reward, steps survived, obstacles passed)
    fn run_episode(&mut self) -> Result<(f32, usize, u32)> {
        let mut obs = self.env.reset();
        let mut episode_reward = 0.0;
        let mut episode_steps = 0;
        let mut done = false;

        while !done && episode_steps < self.config.max_episode_steps {
            // Select action
            let (action, log_prob, value) = self.agent.select_action(obs.clone());

            // Step environment
            let (next_obs, reward, terminated) = self.env.step(action);

            // Store transition
            self.agent
                .store_transition(obs, action, log_prob, reward, value, terminated);

            episode_reward += reward;
            episode_steps += 1;
            self.total_steps += 1;
            done = terminated;
            obs = next_obs;

            // PPO update if buffer is full
            if self.agent.should_update() {
                // Last value for bootstrapping
                let (_, _, last_value) = self.agent.select_action(obs.clone());

                let (policy_loss, value_loss, entropy, _total_loss) =
                    self.agent.update(last_value, done);

                self.stats.record_update(policy_loss, value_loss, entropy);
            }
        }

        let episode_score = self.env.state().score;

        Ok((episode_reward, episode_steps, episode_score))
    }

    /// Save a checkpoint of the current model
    fn save_checkpoint(&self) -> Result<()> {
        let checkpoint_path = self
            .config
            .save_path
            .parent()
            .unwrap_or(Path::new("."))
            .join(format!("checkpoint_ep{}.bin", self.current_episode + 1));

        save_model(&self.agent, &checkpoint_path)
            .with_context(|| format!("Failed to save checkpoint to {:?}", checkpoint_path))?;

        println!("  Checkpoint saved: {:?}", checkpoint_path);

        Ok(())
    }

    /// Save the final trained model
    fn save_model(&self) -> Result<()> {
        save_model(&self.agent, &self.config.save_path).with_context(|| {
            format!("Failed to save final model to {:?}", self.config.save_path)
        })?;

        Ok(())
    }

    /// Print training header information
    fn print_header(&self) {
        println!("{}", "=".repeat(70));
        println!("PPO Training - ML Drive");
        println!("{}", "=".repeat(70));
        println!("Episodes: {}", self.config.num_episodes);
        println!(
            "Corridor: {} units, car at {}",
            self.config.game_config.corridor_height, self.config.game_config.player_y
        );
        if let Some(seed) = self.config.seed {
            println!("Seed: {}", seed);
        }
        println!("PPO Config:");
        println!("  Learning rate: {}", self.config.ppo_config.learning_rate);
        println!("  Gamma: {}", self.config.ppo_config.gamma);
        println!("  GAE lambda: {}", self.config.ppo_config.gae_lambda);
        println!("  Clip epsilon: {}", self.config.ppo_config.clip_epsilon);
        println!(
            "  Update frequency: {} steps",
            self.config.ppo_config.update_frequency
        );
        println!("  Batch size: {}", self.config.ppo_config.batch_size);
        println!("  Epochs per update: {}", self.config.ppo_config.n_epochs);
        println!(
            "Checkpoints: Every {} episodes",
            self.config.checkpoint_frequency
        );
        println!("Logging: Every {} episodes", self.config.log_frequency);
        println!("Save path: {:?}", self.config.save_path);
        println!("{}", "=".repeat(70));
        println!();
    }

    /// Print training progress
    fn print_progress(&self, episode: usize) {
        println!(
            "[Episode {}/{}] {}",
            episode,
            self.config.num_episodes,
            self.stats.format_summary()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::{default_device, TrainingBackend};
    use tempfile::TempDir;

    #[test]
    fn test_train_config_creation() {
        let config = TrainConfig::new(1000, PathBuf::from("test.bin"));
        assert_eq!(config.num_episodes, 1000);
        assert_eq!(config.save_path, PathBuf::from("test.bin"));
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_train_mode_creation() {
        let temp_dir = TempDir::new().unwrap();
        let save_path = temp_dir.path().join("model.bin");

        let config = TrainConfig::new(10, save_path);

        let device = default_device();
        let _train_mode = TrainMode::<TrainingBackend>::new(config, device);
        // If this doesn't panic, creation succeeded
    }

    #[test]
    fn test_run_single_episode() {
        let temp_dir = TempDir::new().unwrap();
        let save_path = temp_dir.path().join("model.bin");

        let mut config = TrainConfig::new(1, save_path);
        config.seed = Some(42);
        config.max_episode_steps = 200; // Keep the test bounded
        config.ppo_config.update_frequency = 1000; // Don't update during test

        let device = default_device();
        let mut train_mode = TrainMode::<TrainingBackend>::new(config, device);

        let (reward, steps, _score) = train_mode.run_episode().unwrap();

        assert!(steps > 0);
        assert!(steps <= 200);
        assert!(reward.is_finite());
    }
}
