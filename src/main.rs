use clap::{Parser, Subcommand, ValueEnum};
use seega_arena::web::{ServerConfig, run_server};
use seega_arena::*;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "seega-arena", about = "Seega rules engine, bot matches and web play")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play one match between two bots
    Play {
        #[arg(long, default_value = "small")]
        variant: Variant,
        #[arg(long, value_enum, default_value_t = BotKind::Random)]
        white: BotKind,
        #[arg(long, value_enum, default_value_t = BotKind::Greedy)]
        black: BotKind,
        /// Milliseconds a bot may think per action
        #[arg(long, default_value_t = 2000)]
        time_per_move_ms: u64,
        #[arg(long, default_value_t = 500)]
        max_actions: usize,
        /// Seed for random bots
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Serve the game over HTTP
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: SocketAddr,
        #[arg(long, default_value = "static")]
        static_dir: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum BotKind {
    Random,
    Greedy,
}

fn make_bot(kind: BotKind, name: &str, seed: Option<u64>) -> Box<dyn Bot> {
    match (kind, seed) {
        (BotKind::Random, Some(seed)) => Box::new(RandomBot::with_seed(name.to_string(), seed)),
        (BotKind::Random, None) => Box::new(RandomBot::new(name.to_string())),
        (BotKind::Greedy, _) => Box::new(GreedyBot::new(name.to_string())),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Command::Play {
            variant,
            white,
            black,
            time_per_move_ms,
            max_actions,
            seed,
        } => {
            let config = MatchConfig {
                time_per_move: Duration::from_millis(time_per_move_ms),
                max_actions,
            };
            let white_bot = make_bot(white, "White", seed);
            let black_bot = make_bot(black, "Black", seed.map(|seed| seed.wrapping_add(1)));

            let mut match_game = Match::with_variant(white_bot, black_bot, config, variant);
            let result = match_game.play();

            println!("{}", match_game.game().board().display_board());
            match result {
                MatchResult::Win {
                    color,
                    winner_name,
                    actions,
                } => {
                    println!("{} wins as {} after {} actions!", winner_name, color, actions);
                }
                MatchResult::Draw { actions } => {
                    println!("Draw after {} actions", actions);
                }
                MatchResult::Timeout { violator, winner } => {
                    println!("{} wins by timeout (opponent: {})", winner, violator);
                }
                MatchResult::IllegalMove { violator, winner } => {
                    println!("{} wins by illegal move (opponent: {})", winner, violator);
                }
            }
        }
        Command::Serve { addr, static_dir } => {
            run_server(ServerConfig { addr, static_dir }).await?;
        }
    }

    Ok(())
}
