use anyhow::{ensure, Result};
use clap::Parser;
use snake_tui::app::App;
use snake_tui::game::GameConfig;
use snake_tui::storage::{HighScoreStore, DEFAULT_HIGH_SCORE_FILE};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "snake_tui")]
#[command(version, about = "Grid-based snake arcade game for the terminal")]
struct Cli {
    /// Grid width
    #[arg(long, default_value = "20")]
    width: usize,

    /// Grid height
    #[arg(long, default_value = "20")]
    height: usize,

    /// Base speed; higher starts faster (tick interval is 350 minus this,
    /// in milliseconds, clamped to 50..=300)
    #[arg(long, default_value = "50")]
    speed: u64,

    /// Where to keep the persistent high score
    #[arg(long, default_value = DEFAULT_HIGH_SCORE_FILE)]
    high_score_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    ensure!(
        cli.width >= 5 && cli.height >= 5,
        "grid must be at least 5x5"
    );

    let config = GameConfig {
        base_speed: cli.speed,
        ..GameConfig::new(cli.width, cli.height)
    };

    let store = HighScoreStore::open(cli.high_score_file);

    let mut app = App::new(config, store);
    app.run().await?;

    Ok(())
}
