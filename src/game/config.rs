use serde::{Deserialize, Serialize};

/// Configuration for the driving game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Vertical extent of the corridor; obstacles are removed once they reach it.
    /// Also serves as the observation sentinel for empty lanes.
    pub corridor_height: f32,
    /// Fixed vertical position of the player's car
    pub player_y: f32,
    /// Initial downward speed of obstacles (distance per step)
    pub initial_speed: f32,
    /// Vertical position newly spawned obstacles start at (above the visible top)
    pub spawn_y: f32,
    /// Per-step probability of spawning a new obstacle while below the cap
    pub spawn_probability: f64,
    /// Maximum number of concurrent obstacles before spawning is suppressed
    pub max_obstacles: usize,
    /// Passed obstacles per +1 speed increase
    pub speedup_interval: u32,

    // Rewards (for RL)
    /// Reward granted every step for surviving
    pub survival_reward: f32,
    /// Reward for an obstacle passing the bottom of the corridor
    pub pass_reward: f32,
    /// Penalty added on collision (stored negative)
    pub crash_penalty: f32,
    /// Same-lane obstacles closer than this incur a 1/distance penalty
    pub proximity_range: f32,
    /// Same-lane obstacles closer than this end the episode
    pub collision_distance: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            corridor_height: 500.0,
            player_y: 400.0,
            initial_speed: 1.0,
            spawn_y: -50.0,
            spawn_probability: 0.1,
            max_obstacles: 2,
            speedup_interval: 5,
            survival_reward: 0.1,
            pass_reward: 2.0,
            crash_penalty: -20.0,
            proximity_range: 100.0,
            collision_distance: 40.0,
        }
    }
}

impl GameConfig {
    /// Create a configuration with a custom corridor height, keeping the
    /// player car at 80% of the corridor depth
    pub fn new(corridor_height: f32) -> Self {
        Self {
            corridor_height,
            player_y: corridor_height * 0.8,
            ..Default::default()
        }
    }

    /// Short corridor for fast tests
    pub fn short() -> Self {
        Self::new(100.0)
    }
}
