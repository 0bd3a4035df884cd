//! ML Drive - A three-lane driving game with reinforcement learning capabilities
//!
//! This library provides:
//! - Core game logic (game module): lanes, obstacle traffic, rewards
//! - RL training infrastructure (rl module): observations, PPO, persistence
//! - TUI rendering (render module)
//! - Multiple execution modes (human, train, visualize)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod rl;
