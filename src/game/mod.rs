//! Core game logic for the three-lane driving game
//!
//! This module contains all the game logic without any I/O or rendering
//! dependencies. It can be used programmatically for both human play and RL
//! training.

pub mod action;
pub mod config;
pub mod engine;
pub mod state;

// Re-export commonly used types
pub use action::{Action, InvalidActionIndex};
pub use config::GameConfig;
pub use engine::{GameEngine, StepInfo, StepResult};
pub use state::{GameState, Obstacle, LANE_COUNT};
