pub mod game_metrics;
pub mod score_log;
pub mod training_stats;

pub use game_metrics::GameMetrics;
pub use score_log::ScoreLog;
pub use training_stats::TrainingStats;
