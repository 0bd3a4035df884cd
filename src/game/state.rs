/// Number of lanes in the corridor, indexed 0..2 left-to-right
pub const LANE_COUNT: usize = 3;

/// An oncoming vehicle with a lane and a vertical position.
///
/// Vertical positions grow downward; an obstacle spawns above the visible top
/// (negative `y`) and is removed once `y` reaches the corridor bottom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub lane: usize,
    pub y: f32,
}

impl Obstacle {
    pub fn new(lane: usize, y: f32) -> Self {
        Self { lane, y }
    }

    /// Whether the obstacle has entered the visible corridor
    pub fn is_visible(&self) -> bool {
        self.y >= 0.0
    }
}

/// Complete game state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    /// Current lane of the player's car
    pub player_lane: usize,
    /// Fixed vertical position of the player's car
    pub player_y: f32,
    /// Bottom boundary of the corridor
    pub corridor_height: f32,
    /// Current downward speed of all obstacles
    pub speed: f32,
    /// Obstacles successfully passed this episode
    pub score: u32,
    /// Steps taken this episode
    pub steps: u32,
    /// Oncoming vehicles currently in play
    pub obstacles: Vec<Obstacle>,
    pub is_alive: bool,
}

impl GameState {
    /// Create a fresh state: car in the center lane, no obstacles
    pub fn new(player_y: f32, corridor_height: f32, initial_speed: f32) -> Self {
        Self {
            player_lane: LANE_COUNT / 2,
            player_y,
            corridor_height,
            speed: initial_speed,
            score: 0,
            steps: 0,
            obstacles: Vec::new(),
            is_alive: true,
        }
    }

    /// Distance from the car to the nearest visible obstacle in `lane`.
    ///
    /// Obstacles still above the corridor top (negative `y`) are ignored.
    /// Returns `None` when the lane holds no visible obstacle.
    pub fn nearest_lane_distance(&self, lane: usize) -> Option<f32> {
        self.obstacles
            .iter()
            .filter(|o| o.lane == lane && o.is_visible())
            .map(|o| (self.player_y - o.y).abs())
            .fold(None, |nearest, d| {
                Some(nearest.map_or(d, |n: f32| n.min(d)))
            })
    }

    /// Iterate over obstacles sharing the player's lane
    pub fn obstacles_in_player_lane(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles
            .iter()
            .filter(|o| o.lane == self.player_lane)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_state() {
        let state = GameState::new(400.0, 500.0, 1.0);
        assert_eq!(state.player_lane, 1);
        assert_eq!(state.speed, 1.0);
        assert_eq!(state.score, 0);
        assert!(state.obstacles.is_empty());
        assert!(state.is_alive);
    }

    #[test]
    fn test_obstacle_visibility() {
        assert!(!Obstacle::new(0, -50.0).is_visible());
        assert!(Obstacle::new(0, 0.0).is_visible());
        assert!(Obstacle::new(0, 120.0).is_visible());
    }

    #[test]
    fn test_nearest_lane_distance_picks_minimum() {
        let mut state = GameState::new(400.0, 500.0, 1.0);
        state.obstacles.push(Obstacle::new(0, 100.0));
        state.obstacles.push(Obstacle::new(0, 350.0));
        state.obstacles.push(Obstacle::new(2, 420.0));

        assert_eq!(state.nearest_lane_distance(0), Some(50.0));
        assert_eq!(state.nearest_lane_distance(1), None);
        assert_eq!(state.nearest_lane_distance(2), Some(20.0));
    }

    #[test]
    fn test_nearest_lane_distance_ignores_hidden_obstacles() {
        let mut state = GameState::new(400.0, 500.0, 1.0);
        state.obstacles.push(Obstacle::new(1, -50.0));

        assert_eq!(state.nearest_lane_distance(1), None);
    }

    #[test]
    fn test_obstacles_in_player_lane() {
        let mut state = GameState::new(400.0, 500.0, 1.0);
        state.obstacles.push(Obstacle::new(1, 10.0));
        state.obstacles.push(Obstacle::new(0, 20.0));
        state.obstacles.push(Obstacle::new(1, 30.0));

        let lanes: Vec<f32> = state.obstacles_in_player_lane().map(|o| o.y).collect();
        assert_eq!(lanes, vec![10.0, 30.0]);
    }
}
