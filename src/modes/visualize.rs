//! Visualization mode for watching trained agents drive
//!
//! Loads a trained model and displays the agent driving in the TUI. Playback
//! speed is adjustable, crashed episodes restart automatically, and finished
//! episode scores can optionally be appended to a CSV log.
//!
//! # Controls
//!
//! - Space: Pause/unpause
//! - R: Reset episode
//! - 1-4: Speed control (1=slow, 2=normal, 3=fast, 4=very fast)
//! - Q/Esc: Quit

use anyhow::{Context, Result};
use burn::module::AutodiffModule;
use burn::tensor::{activation::softmax, backend::Backend, Tensor};
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    io::{stderr, Stderr},
    path::Path,
    time::Duration,
};
use tokio::time::{interval, Interval};

use crate::game::GameConfig;
use crate::metrics::{GameMetrics, ScoreLog};
use crate::render::Renderer;
use crate::rl::{load_network, ActorCriticNetwork, DriveEnvironment, ModelMetadata};

/// Visualization speed settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualizationSpeed {
    /// Slow: 20 steps/s
    Slow,
    /// Normal: 60 steps/s, matching human-mode pacing
    Normal,
    /// Fast: 125 steps/s
    Fast,
    /// Very Fast: 500 steps/s
    VeryFast,
}

impl VisualizationSpeed {
    /// Get the tick interval for this speed
    fn tick_interval(&self) -> Duration {
        match self {
            Self::Slow => Duration::from_millis(50),
            Self::Normal => Duration::from_millis(16),
            Self::Fast => Duration::from_millis(8),
            Self::VeryFast => Duration::from_millis(2),
        }
    }
}

/// Visualization mode for watching trained agents
pub struct VisualizeMode<B: Backend> {
    /// Trained neural network (in inference mode)
    network: ActorCriticNetwork<B>,

    /// Driving environment
    env: DriveEnvironment<B>,

    /// Renderer for TUI display
    renderer: Renderer,

    /// Session metrics (episodes driven, best score)
    metrics: GameMetrics,

    /// Optional CSV log of finished episode scores
    score_log: Option<ScoreLog>,

    /// Model metadata
    metadata: ModelMetadata,

    /// Whether to quit the visualization
    should_quit: bool,

    /// Whether playback is paused
    paused: bool,

    /// Manual reset requested from the keyboard
    pending_reset: bool,

    /// Current playback speed
    speed: VisualizationSpeed,

    /// Number of episodes completed
    episode_count: usize,
}

impl<B: Backend> VisualizeMode<B> {
    /// Create a new visualization mode
    ///
    /// Loads a trained model from `model_path` and prints its metadata. With
    /// `score_log_path` set, every finished episode's score is appended to
    /// that CSV file.
    pub fn new(
        model_path: &Path,
        config: GameConfig,
        device: B::Device,
        score_log_path: Option<&Path>,
    ) -> Result<Self> {
        // The recorder is generic over autodiff backends; strip the autodiff
        // wrapper for inference
        use burn::backend::Autodiff;
        let (network, metadata) = load_network::<Autodiff<B>>(model_path, &device)
            .with_context(|| format!("Failed to load model from {:?}", model_path))?;
        let network = network.valid();

        println!("{}", "=".repeat(60));
        println!("Loaded Model Information");
        println!("{}", "=".repeat(60));
        println!("Model path: {:?}", model_path);
        println!("Episodes trained: {}", metadata.episodes_trained);
        println!("Training steps: {}", metadata.training_steps);
        println!("Version: {}", metadata.version);
        println!("{}", "=".repeat(60));
        println!();
        println!("Starting visualization...");
        println!();

        let score_log = match score_log_path {
            Some(path) => Some(ScoreLog::open(path).context("Failed to open score log")?),
            None => None,
        };

        let env = DriveEnvironment::new(config, device);

        Ok(Self {
            network,
            env,
            renderer: Renderer::new(),
            metrics: GameMetrics::new(),
            score_log,
            metadata,
            should_quit: false,
            paused: false,
            pending_reset: false,
            speed: VisualizationSpeed::Normal,
            episode_count: 0,
        })
    }

    /// Loaded model metadata
    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// Run the visualization loop
    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        let result = self.run_visualization_loop(&mut terminal).await;

        self.cleanup_terminal(&mut terminal)?;

        result
    }

    /// Main visualization loop
    async fn run_visualization_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        // Agent steps at the selected speed
        let mut tick_timer = interval(self.speed.tick_interval());

        // Render at 30 FPS
        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        let mut obs = self.env.reset();
        let mut done = false;

        loop {
            tokio::select! {
                // Handle keyboard input
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event, &mut tick_timer)?;
                    }
                }

                // Agent step
                _ = tick_timer.tick() => {
                    if self.pending_reset {
                        self.pending_reset = false;
                        obs = self.env.reset();
                        done = false;
                        self.episode_count += 1;
                        self.metrics.on_game_start();
                    } else if !self.paused {
                        if done {
                            // Crashed: log the episode and restart
                            self.finish_episode()?;
                            obs = self.env.reset();
                            done = false;
                            self.metrics.on_game_start();
                        } else {
                            obs = self.step_agent(obs);
                            done = !self.env.state().is_alive;
                        }
                    }
                }

                // Render frame
                _ = render_timer.tick() => {
                    terminal.draw(|frame| {
                        self.renderer.render(frame, self.env.state(), &self.metrics);
                    }).context("Failed to draw frame")?;
                }

                // Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Step the agent forward one action using the greedy policy
    fn step_agent(&mut self, obs: Tensor<B, 1>) -> Tensor<B, 1> {
        let obs_batch = obs.unsqueeze_dim(0); // [1, 4]

        let (action_logits, _value) = self.network.forward(obs_batch);

        let action_probs = softmax(action_logits, 1);
        let action_idx = argmax_action(&action_probs);

        let (next_obs, _reward, _done) = self.env.step(action_idx);

        next_obs
    }

    /// Record a finished episode in the metrics and the optional score log
    fn finish_episode(&mut self) -> Result<()> {
        let score = self.env.state().score;
        let steps = self.env.state().steps;
        self.episode_count += 1;
        self.metrics.on_game_over(score, steps);

        if let Some(log) = self.score_log.as_mut() {
            log.record(score).context("Failed to log episode score")?;
        }

        Ok(())
    }

    /// Handle keyboard events
    fn handle_event(&mut self, event: Event, tick_timer: &mut Interval) -> Result<()> {
        if let Event::Key(key) = event {
            // Only process key press events
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }

            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.should_quit = true;
                }
                KeyCode::Char(' ') => {
                    self.paused = !self.paused;
                }
                KeyCode::Char('r') => {
                    self.pending_reset = true;
                }
                KeyCode::Char('1') => {
                    self.change_speed(VisualizationSpeed::Slow, tick_timer);
                }
                KeyCode::Char('2') => {
                    self.change_speed(VisualizationSpeed::Normal, tick_timer);
                }
                KeyCode::Char('3') => {
                    self.change_speed(VisualizationSpeed::Fast, tick_timer);
                }
                KeyCode::Char('4') => {
                    self.change_speed(VisualizationSpeed::VeryFast, tick_timer);
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Change the visualization speed
    fn change_speed(&mut self, new_speed: VisualizationSpeed, tick_timer: &mut Interval) {
        self.speed = new_speed;
        tick_timer.reset_after(self.speed.tick_interval());
    }

    /// Cleanup terminal state
    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

/// Select the action with highest probability (argmax)
fn argmax_action<B: Backend>(probs: &Tensor<B, 2>) -> usize {
    let probs_data = probs.to_data();
    let probs_vec: Vec<f32> = probs_data.to_vec().expect("Failed to convert probs to vec");

    probs_vec
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::{default_device, InferenceBackend, TrainingBackend};
    use crate::rl::{save_model, ActorCriticConfig, PPOAgent, PPOConfig};
    use tempfile::TempDir;

    #[test]
    fn test_visualization_speed() {
        assert_eq!(
            VisualizationSpeed::Slow.tick_interval(),
            Duration::from_millis(50)
        );
        assert_eq!(
            VisualizationSpeed::Normal.tick_interval(),
            Duration::from_millis(16)
        );
        assert_eq!(
            VisualizationSpeed::Fast.tick_interval(),
            Duration::from_millis(8)
        );
        assert_eq!(
            VisualizationSpeed::VeryFast.tick_interval(),
            Duration::from_millis(2)
        );
    }

    #[test]
    fn test_argmax_action() {
        let device = default_device();
        let probs =
            Tensor::<InferenceBackend, 2>::from_floats([[0.2, 0.7, 0.1]], &device);

        assert_eq!(argmax_action(&probs), 1);
    }

    #[test]
    fn test_visualize_mode_creation() {
        let temp_dir = TempDir::new().unwrap();
        let model_path = temp_dir.path().join("test_model.bin");

        // Create and save a test model
        let device = default_device();
        let network = ActorCriticConfig::new().init::<TrainingBackend>(&device);
        let agent = PPOAgent::new(network, PPOConfig::default(), device.clone());
        save_model(&agent, &model_path).unwrap();

        // Load in visualize mode
        let visualize_mode = VisualizeMode::<InferenceBackend>::new(
            &model_path,
            GameConfig::default(),
            device,
            None,
        );

        assert!(visualize_mode.is_ok());
        let mode = visualize_mode.unwrap();
        assert_eq!(mode.episode_count, 0);
        assert!(!mode.paused);
        assert_eq!(mode.speed, VisualizationSpeed::Normal);
        assert_eq!(mode.metadata().obs_dim, 4);
    }

    #[test]
    fn test_agent_drives_and_logs_scores() {
        let temp_dir = TempDir::new().unwrap();
        let model_path = temp_dir.path().join("test_model.bin");
        let log_path = temp_dir.path().join("scores.csv");

        let device = default_device();
        let network = ActorCriticConfig::new().init::<TrainingBackend>(&device);
        let agent = PPOAgent::new(network, PPOConfig::default(), device.clone());
        save_model(&agent, &model_path).unwrap();

        let mut mode = VisualizeMode::<InferenceBackend>::new(
            &model_path,
            GameConfig::default(),
            device,
            Some(&log_path),
        )
        .unwrap();

        // Drive a bounded number of steps with the greedy policy
        let mut obs = mode.env.reset();
        for _ in 0..300 {
            if !mode.env.state().is_alive {
                break;
            }
            obs = mode.step_agent(obs);
        }

        if !mode.env.state().is_alive {
            mode.finish_episode().unwrap();
            assert_eq!(mode.episode_count, 1);
            let contents = std::fs::read_to_string(&log_path).unwrap();
            assert!(contents.starts_with("Episode,Score\n1,"));
        }
    }
}
