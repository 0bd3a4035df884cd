use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use ml_drive::game::GameConfig;
use ml_drive::modes::{HumanMode, TrainConfig, TrainMode, VisualizeMode};
use ml_drive::rl::{default_device, InferenceBackend, TrainingBackend};

#[derive(Parser)]
#[command(name = "ml_drive")]
#[command(version, about = "Three-lane driving game with ML capabilities")]
struct Cli {
    /// Game mode
    #[arg(long, default_value = "human")]
    mode: Mode,

    /// Number of training episodes (train mode)
    #[arg(long, default_value = "10000")]
    episodes: usize,

    /// Model path: written by train mode, read by visualize mode
    #[arg(long, default_value = "models/drive.bin")]
    model: PathBuf,

    /// Engine RNG seed for reproducible training episodes (train mode)
    #[arg(long)]
    seed: Option<u64>,

    /// CSV file to append finished episode scores to (visualize mode)
    #[arg(long)]
    score_log: Option<PathBuf>,
}

#[derive(Clone, ValueEnum)]
enum Mode {
    /// Drive with keyboard controls
    Human,
    /// Train a PPO agent
    Train,
    /// Watch a trained agent drive
    Visualize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = GameConfig::default();

    // Dispatch to appropriate mode
    match cli.mode {
        Mode::Human => {
            let mut human_mode = HumanMode::new(config);
            human_mode.run().await?;
        }
        Mode::Train => {
            let mut train_config = TrainConfig::new(cli.episodes, cli.model);
            train_config.seed = cli.seed;
            train_config.game_config = config;

            let device = default_device();
            let mut train_mode = TrainMode::<TrainingBackend>::new(train_config, device);
            train_mode.run()?;
        }
        Mode::Visualize => {
            let device = default_device();
            let mut visualize_mode = VisualizeMode::<InferenceBackend>::new(
                &cli.model,
                config,
                device,
                cli.score_log.as_deref(),
            )?;
            visualize_mode.run().await?;
        }
    }

    Ok(())
}
