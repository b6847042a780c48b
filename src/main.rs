//! Console checkers for two players at one keyboard.

use std::io;

use checkers::board::SquareColor;
use checkers::config::{GameConfig, parse_start_color};
use checkers::console::ConsoleSession;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "checkers", about = "Two-player checkers in the terminal")]
struct Cli {
    /// Square color the pieces start on (red or black)
    #[arg(long, default_value = "black", value_parser = parse_start_color)]
    start_color: SquareColor,
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = GameConfig {
        start_color: cli.start_color,
        ..GameConfig::default()
    };
    info!(?config, "starting console session");

    let stdin = io::stdin();
    let mut console = ConsoleSession::new(stdin.lock(), io::stdout(), config);
    console.run()
}
