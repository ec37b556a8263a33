use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use snake_qlearning::game::GameConfig;
use snake_qlearning::modes::{HumanMode, TrainConfig, TrainMode, WatchMode, validate_config};
use snake_qlearning::rl::{AgentConfig, InferenceBackend, TrainingBackend, default_device};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "snake_qlearning")]
#[command(version, about = "Snake game with a deep Q-learning agent")]
struct Cli {
    /// What to run
    #[arg(long, value_enum, default_value = "train")]
    mode: Mode,

    /// Board width in pixels
    #[arg(long, default_value = "640")]
    width: i32,

    /// Board height in pixels
    #[arg(long, default_value = "480")]
    height: i32,

    /// Size of one cell in pixels
    #[arg(long, default_value = "20")]
    block_size: i32,

    /// Games to train for, 0 to train until Ctrl+C
    #[arg(long, default_value = "0")]
    episodes: usize,

    /// Seed for the random generator (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Continue training from the checkpoint in --model-dir
    #[arg(long)]
    resume: bool,

    /// Directory holding model.mpk and its metadata
    #[arg(long, default_value = "model")]
    model_dir: PathBuf,

    /// Hidden layer width of a new network
    #[arg(long, default_value = "256")]
    hidden_size: usize,

    /// Adam learning rate
    #[arg(long, default_value = "0.001")]
    learning_rate: f64,

    /// Log a statistics summary every N games
    #[arg(long, default_value = "100")]
    log_every: usize,

    /// Log file used while a terminal UI owns the screen
    #[arg(long, default_value = "snake.log")]
    log_file: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Train a new agent
    Train,
    /// Play snake with keyboard controls
    Human,
    /// Watch a trained agent play
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli)?;

    let game_config = GameConfig {
        block_size: cli.block_size,
        ..GameConfig::new(cli.width, cli.height)
    };

    match cli.mode {
        Mode::Train => run_training(&cli, game_config).await,
        Mode::Human => {
            let mut human_mode = HumanMode::new(game_config, cli.seed)?;
            human_mode.run().await
        }
        Mode::Watch => {
            let model_path = cli.model_dir.join(snake_qlearning::modes::MODEL_FILE_NAME);
            let mut watch_mode = WatchMode::<InferenceBackend>::new(
                &model_path,
                game_config,
                cli.seed,
                default_device(),
            )?;
            watch_mode.run().await
        }
    }
}

async fn run_training(cli: &Cli, game_config: GameConfig) -> Result<()> {
    let seed = cli.seed.unwrap_or_else(rand::random);

    let config = TrainConfig {
        num_episodes: cli.episodes,
        model_dir: cli.model_dir.clone(),
        log_frequency: cli.log_every,
        seed,
        resume: cli.resume,
        game_config,
        agent_config: AgentConfig {
            hidden_size: cli.hidden_size,
            learning_rate: cli.learning_rate,
            ..Default::default()
        },
        ..TrainConfig::new(cli.episodes, cli.model_dir.clone())
    };
    validate_config(&config)?;

    let train_mode = TrainMode::<TrainingBackend>::new(config, default_device())?;
    let stats = train_mode.run_blocking().await?;
    info!(
        games = stats.total_games(),
        record = stats.record(),
        mean_score = stats.mean_score(),
        "done"
    );

    Ok(())
}

/// Install the tracing subscriber
///
/// Training logs to stderr. The interactive modes draw on the terminal, so
/// their logs go to a file instead.
fn init_logging(cli: &Cli) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match cli.mode {
        Mode::Train => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
        Mode::Human | Mode::Watch => {
            let file = File::create(&cli.log_file)
                .with_context(|| format!("Failed to create log file {:?}", cli.log_file))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
    }

    Ok(())
}
