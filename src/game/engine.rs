use super::{
    action::Action,
    config::GameConfig,
    state::{GameState, Obstacle, LANE_COUNT},
};
use rand::{rngs::SmallRng, Rng, SeedableRng};

/// Information about a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepInfo {
    /// Obstacles that passed the bottom of the corridor this step
    pub passed: u32,
    /// Whether the car collided with an obstacle
    pub collided: bool,
}

/// Result of a game step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepResult {
    /// Reward for this step (for RL training)
    pub reward: f32,
    /// Whether the episode has terminated (collision)
    pub terminated: bool,
    /// Time-limit truncation; always false from the engine. A driver that
    /// imposes an episode step limit reports truncation itself.
    pub truncated: bool,
    /// Additional information about the step
    pub info: StepInfo,
}

/// The game engine that handles all game logic.
///
/// Owns the spawn RNG so that a seeded engine replays an identical episode
/// for an identical action sequence.
pub struct GameEngine {
    config: GameConfig,
    rng: SmallRng,
}

impl GameEngine {
    /// Create a new game engine with an entropy-seeded RNG
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            rng: SmallRng::from_entropy(),
        }
    }

    /// Create a new game engine with a fixed RNG seed
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Reset the game to its initial state: car in the center lane, initial
    /// speed, zero score, empty corridor. The RNG stream is left untouched.
    pub fn reset(&mut self) -> GameState {
        GameState::new(
            self.config.player_y,
            self.config.corridor_height,
            self.config.initial_speed,
        )
    }

    /// Reseed the RNG and reset, for reproducible episodes
    pub fn reset_with_seed(&mut self, seed: u64) -> GameState {
        self.rng = SmallRng::seed_from_u64(seed);
        self.reset()
    }

    /// Execute one step of the game.
    ///
    /// The transition phases run in a fixed order: lateral move, obstacle
    /// advance with pass credit, spawn decision, proximity penalty, collision
    /// check. Proximity and collision both see post-advance positions, so a
    /// crashing step can carry a proximity penalty as well.
    pub fn step(&mut self, state: &mut GameState, action: Action) -> StepResult {
        if !state.is_alive {
            return StepResult {
                reward: 0.0,
                terminated: true,
                truncated: false,
                info: StepInfo {
                    passed: 0,
                    collided: false,
                },
            };
        }

        // Lateral move; edge-of-corridor moves are no-ops
        let target_lane = state.player_lane as i32 + action.lane_delta();
        if (0..LANE_COUNT as i32).contains(&target_lane) {
            state.player_lane = target_lane as usize;
        }

        let mut reward = self.config.survival_reward;

        // Advance obstacles; credit each one that clears the corridor
        let bottom = self.config.corridor_height;
        let speed = state.speed;
        let mut passed = 0u32;
        state.obstacles.retain_mut(|obstacle| {
            obstacle.y += speed;
            if obstacle.y >= bottom {
                passed += 1;
                false
            } else {
                true
            }
        });
        for _ in 0..passed {
            reward += self.config.pass_reward;
            state.score += 1;
            if state.score % self.config.speedup_interval == 0 {
                state.speed += 1.0;
            }
        }

        // Spawn decision; suppressed while the corridor is at capacity
        if state.obstacles.len() < self.config.max_obstacles
            && self.rng.gen_bool(self.config.spawn_probability)
        {
            let lane = self.rng.gen_range(0..LANE_COUNT);
            state
                .obstacles
                .push(Obstacle::new(lane, self.config.spawn_y));
        }

        // Proximity penalty: same-lane obstacles cost 1/distance when close.
        // Distance 0 is excluded; that case is a collision, not proximity.
        for obstacle in state.obstacles_in_player_lane() {
            let distance = (state.player_y - obstacle.y).abs();
            if distance > 0.0 && distance < self.config.proximity_range {
                reward -= 1.0 / distance;
            }
        }

        // Collision check; the first qualifying obstacle ends the episode
        let collided = state
            .obstacles_in_player_lane()
            .any(|o| (state.player_y - o.y).abs() < self.config.collision_distance);
        if collided {
            reward += self.config.crash_penalty;
            state.is_alive = false;
        }

        state.steps += 1;

        StepResult {
            reward,
            terminated: collided,
            truncated: false,
            info: StepInfo { passed, collided },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> GameEngine {
        GameEngine::with_seed(GameConfig::default(), 42)
    }

    #[test]
    fn test_reset() {
        let mut engine = engine();
        let state = engine.reset();

        assert!(state.is_alive);
        assert_eq!(state.player_lane, 1);
        assert_eq!(state.speed, 1.0);
        assert_eq!(state.score, 0);
        assert!(state.obstacles.is_empty());
    }

    #[test]
    fn test_lateral_moves() {
        let mut engine = engine();
        let mut state = engine.reset();

        engine.step(&mut state, Action::MoveLeft);
        assert_eq!(state.player_lane, 0);

        engine.step(&mut state, Action::MoveRight);
        engine.step(&mut state, Action::MoveRight);
        assert_eq!(state.player_lane, 2);

        engine.step(&mut state, Action::Stay);
        assert_eq!(state.player_lane, 2);
    }

    #[test]
    fn test_lane_bounds_hold_under_repeated_moves() {
        let mut engine = engine();
        let mut state = engine.reset();

        for _ in 0..10 {
            engine.step(&mut state, Action::MoveLeft);
            assert_eq!(state.player_lane, 0);
        }
        for _ in 0..10 {
            engine.step(&mut state, Action::MoveRight);
            assert!(state.player_lane < LANE_COUNT);
        }
        assert_eq!(state.player_lane, 2);
    }

    #[test]
    fn test_pass_reward_and_score() {
        let mut engine = engine();
        let mut state = engine.reset();

        // One step away from the bottom in a lane the car does not occupy
        state.obstacles.push(Obstacle::new(0, 499.0));

        let result = engine.step(&mut state, Action::Stay);

        assert_eq!(state.score, 1);
        assert_eq!(result.info.passed, 1);
        assert!(state.obstacles.iter().all(|o| o.y < 500.0));
        // Survival reward plus pass reward
        assert!((result.reward - 2.1).abs() < 1e-5);
    }

    #[test]
    fn test_speed_increases_every_fifth_pass() {
        let mut engine = engine();
        let mut state = engine.reset();

        for pass in 1..=12u32 {
            state.obstacles.push(Obstacle::new(0, 499.9));
            let speed_before = state.speed;
            engine.step(&mut state, Action::Stay);

            assert_eq!(state.score, pass);
            if pass % 5 == 0 {
                assert_eq!(state.speed, speed_before + 1.0);
            } else {
                assert_eq!(state.speed, speed_before);
            }
            // Speed never decreases within an episode
            assert!(state.speed >= speed_before);
            state.obstacles.clear();
        }
    }

    #[test]
    fn test_multiple_passes_in_one_step() {
        let mut engine = engine();
        let mut state = engine.reset();

        state.obstacles.push(Obstacle::new(0, 499.5));
        state.obstacles.push(Obstacle::new(2, 499.8));

        let result = engine.step(&mut state, Action::Stay);

        assert_eq!(result.info.passed, 2);
        assert_eq!(state.score, 2);
        assert!((result.reward - 4.1).abs() < 1e-5);
    }

    #[test]
    fn test_obstacle_cap_respected() {
        // Immortal car: collisions disabled so the episode runs indefinitely
        let config = GameConfig {
            collision_distance: 0.0,
            ..Default::default()
        };
        let mut engine = GameEngine::with_seed(config, 7);
        let mut state = engine.reset();

        for _ in 0..2000 {
            engine.step(&mut state, Action::Stay);
            assert!(state.obstacles.len() <= 2);
        }
    }

    #[test]
    fn test_spawned_obstacle_starts_above_corridor() {
        let mut engine = engine();
        let mut state = engine.reset();

        for _ in 0..1000 {
            if let Some(obstacle) = state.obstacles.first() {
                // Spawning runs after the advance phase, so a fresh obstacle
                // has not moved yet
                assert_eq!(obstacle.y, -50.0);
                assert!(obstacle.lane < LANE_COUNT);
                return;
            }
            engine.step(&mut state, Action::Stay);
        }
        panic!("no obstacle spawned in 1000 steps");
    }

    #[test]
    fn test_proximity_penalty() {
        let mut engine = engine();
        let mut state = engine.reset();

        // Post-advance distance of 50: inside the penalty band, outside the
        // collision threshold
        state.obstacles.push(Obstacle::new(1, 349.0));

        let result = engine.step(&mut state, Action::Stay);

        assert!(!result.terminated);
        assert!((result.reward - (0.1 - 1.0 / 50.0)).abs() < 1e-5);
    }

    #[test]
    fn test_collision_terminates_with_proximity_penalty() {
        let mut engine = engine();
        let mut state = engine.reset();
        state.player_lane = 0;

        // Advances to 371; |400 - 371| = 29 < 40
        state.obstacles.push(Obstacle::new(0, 370.0));

        let result = engine.step(&mut state, Action::Stay);

        assert!(result.terminated);
        assert!(result.info.collided);
        assert!(!state.is_alive);
        // Survival reward, proximity penalty, and crash penalty all apply
        let expected = 0.1 - 1.0 / 29.0 - 20.0;
        assert!((result.reward - expected).abs() < 1e-5);
    }

    #[test]
    fn test_collision_threshold_is_strict() {
        let mut engine = engine();
        let mut state = engine.reset();

        // Advances to exactly distance 40: proximity penalty but no crash
        state.obstacles.push(Obstacle::new(1, 359.0));

        let result = engine.step(&mut state, Action::Stay);

        assert!(!result.terminated);
        assert!(state.is_alive);
        assert!((result.reward - (0.1 - 1.0 / 40.0)).abs() < 1e-5);
    }

    #[test]
    fn test_dead_state_step_is_inert() {
        let mut engine = engine();
        let mut state = engine.reset();
        state.is_alive = false;
        let snapshot = state.clone();

        let result = engine.step(&mut state, Action::MoveLeft);

        assert!(result.terminated);
        assert_eq!(result.reward, 0.0);
        assert_eq!(state, snapshot);
    }

    #[test]
    fn test_truncated_always_false() {
        let mut engine = engine();
        let mut state = engine.reset();

        for _ in 0..50 {
            let result = engine.step(&mut state, Action::Stay);
            assert!(!result.truncated);
            if result.terminated {
                break;
            }
        }
    }

    #[test]
    fn test_identical_seeds_replay_identical_episodes() {
        let actions = [
            Action::Stay,
            Action::MoveLeft,
            Action::Stay,
            Action::MoveRight,
            Action::MoveRight,
            Action::Stay,
        ];

        let mut a = GameEngine::with_seed(GameConfig::default(), 1234);
        let mut b = GameEngine::with_seed(GameConfig::default(), 1234);
        let mut state_a = a.reset();
        let mut state_b = b.reset();

        for step in 0..500 {
            let action = actions[step % actions.len()];
            let result_a = a.step(&mut state_a, action);
            let result_b = b.step(&mut state_b, action);

            assert_eq!(result_a, result_b);
            assert_eq!(state_a, state_b);
            if result_a.terminated {
                break;
            }
        }
    }

    #[test]
    fn test_reset_with_seed_restarts_the_stream() {
        let mut engine = GameEngine::with_seed(GameConfig::default(), 99);

        let mut run = |engine: &mut GameEngine| {
            let mut state = engine.reset_with_seed(555);
            let mut rewards = Vec::new();
            for _ in 0..200 {
                let result = engine.step(&mut state, Action::Stay);
                rewards.push(result.reward);
                if result.terminated {
                    break;
                }
            }
            rewards
        };

        let first = run(&mut engine);
        let second = run(&mut engine);
        assert_eq!(first, second);
    }
}
