use anyhow::{Context, Result};
use clap::Parser;
use cobra::game::GameConfig;
use cobra::modes::HumanMode;
use cobra::persistence::{HighScoreStore, JsonFileStore, MemoryStore};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cobra")]
#[command(version, about = "Snake in the terminal")]
struct Cli {
    /// JSON game configuration; flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Cells per side of the board
    #[arg(long)]
    board_size: Option<usize>,

    /// Initial snake length
    #[arg(long)]
    initial_length: Option<usize>,

    /// Score per level
    #[arg(long)]
    level_threshold: Option<u32>,

    /// Where the best score is kept
    #[arg(long, default_value = "cobra-high-score.json")]
    high_score_file: PathBuf,

    /// Keep the best score in memory only
    #[arg(long)]
    no_save: bool,

    /// Write logs to this file (the terminal belongs to the game). Filter with RUST_LOG.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::from_json_file(path)?,
            None => GameConfig::default(),
        };

        if let Some(board_size) = self.board_size {
            config.board_size = board_size;
        }
        if let Some(length) = self.initial_length {
            config.initial_snake_length = length;
        }
        if let Some(threshold) = self.level_threshold {
            config.level_threshold = threshold;
        }

        Ok(config)
    }

    fn store(&self) -> Box<dyn HighScoreStore> {
        if self.no_save {
            Box::new(MemoryStore::default())
        } else {
            Box::new(JsonFileStore::new(&self.high_score_file))
        }
    }
}

fn init_logging(path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create log file {:?}", path))?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cobra=info")),
        )
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let config = cli.game_config()?;
    let mut human_mode = HumanMode::new(config, cli.store())?;
    human_mode.run().await?;

    Ok(())
}
