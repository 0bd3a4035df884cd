use super::observation::create_observation;
use crate::game::{Action, GameConfig, GameEngine, GameState};
use burn::tensor::{backend::Backend, Tensor};

/// Driving environment for reinforcement learning
///
/// Wraps the game engine and provides a Burn-compatible RL interface with:
/// - Vector observations (player lane + per-lane nearest-obstacle distances)
/// - Discrete action space (3 actions: MoveLeft, Stay, MoveRight)
/// - Standard RL interface (reset, step)
pub struct DriveEnvironment<B: Backend> {
    engine: GameEngine,
    state: GameState,
    device: B::Device,
}

impl<B: Backend> DriveEnvironment<B> {
    /// Create a new driving environment with an entropy-seeded engine
    pub fn new(config: GameConfig, device: B::Device) -> Self {
        let mut engine = GameEngine::new(config);
        let state = engine.reset();
        Self {
            engine,
            state,
            device,
        }
    }

    /// Create a new driving environment with a fixed engine seed, so a fixed
    /// action sequence replays an identical episode
    pub fn with_seed(config: GameConfig, seed: u64, device: B::Device) -> Self {
        let mut engine = GameEngine::with_seed(config, seed);
        let state = engine.reset();
        Self {
            engine,
            state,
            device,
        }
    }

    /// Reset the environment and return the initial observation
    ///
    /// Returns: Tensor<B, 1> with shape [4]
    pub fn reset(&mut self) -> Tensor<B, 1> {
        self.state = self.engine.reset();
        create_observation(&self.state, &self.device)
    }

    /// Reseed the engine RNG and reset, for reproducible episodes
    pub fn reset_with_seed(&mut self, seed: u64) -> Tensor<B, 1> {
        self.state = self.engine.reset_with_seed(seed);
        create_observation(&self.state, &self.device)
    }

    /// Step the environment with a discrete action
    ///
    /// Actions:
    /// - 0: Move one lane left
    /// - 1: Stay in lane
    /// - 2: Move one lane right
    ///
    /// Returns: (observation, reward, terminated)
    ///
    /// # Panics
    ///
    /// Panics if `action_idx >= 3`. An out-of-range index is a programmer
    /// error at the agent boundary, not a recoverable condition.
    pub fn step(&mut self, action_idx: usize) -> (Tensor<B, 1>, f32, bool) {
        let action = Action::try_from(action_idx).expect("invalid action index");
        let step_result = self.engine.step(&mut self.state, action);

        let observation = create_observation(&self.state, &self.device);

        (observation, step_result.reward, step_result.terminated)
    }

    /// Get the current observation without stepping
    pub fn get_observation(&self) -> Tensor<B, 1> {
        create_observation(&self.state, &self.device)
    }

    /// Get the device used by this environment
    pub fn device(&self) -> &B::Device {
        &self.device
    }

    /// Read-only snapshot of the current game state, for rendering and tests
    pub fn state(&self) -> &GameState {
        &self.state
    }
}
