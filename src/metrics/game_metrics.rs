use std::time::{Duration, Instant};

/// Session-level play metrics: current run time, best score, longest run
pub struct GameMetrics {
    run_started: Instant,
    high_score: u32,
    longest_run_steps: u32,
    games_played: u32,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            run_started: Instant::now(),
            high_score: 0,
            longest_run_steps: 0,
            games_played: 0,
        }
    }

    /// Start timing a new run
    pub fn on_game_start(&mut self) {
        self.run_started = Instant::now();
    }

    /// Record a crash with the run's obstacles passed and steps survived
    pub fn on_game_over(&mut self, score: u32, steps: u32) {
        self.games_played += 1;
        self.high_score = self.high_score.max(score);
        self.longest_run_steps = self.longest_run_steps.max(steps);
    }

    /// Wall-clock duration of the current run
    pub fn run_time(&self) -> Duration {
        self.run_started.elapsed()
    }

    /// Current run time as `mm:ss`
    pub fn format_run_time(&self) -> String {
        let total_secs = self.run_time().as_secs();
        format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn longest_run_steps(&self) -> u32 {
        self.longest_run_steps
    }

    pub fn games_played(&self) -> u32 {
        self.games_played
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}
