use std::path::Path;

use clap::Parser;
use notedeck::cli::commands::{Cli, Commands};
use notedeck::cli::handlers;
use notedeck::io::{config_io, deck_io};

/// `[log] level` from the deck's config, if a deck can be found
fn configured_level(deck_dir: Option<&str>) -> Option<String> {
    let start = match deck_dir {
        Some(dir) => Path::new(dir).to_path_buf(),
        None => std::env::current_dir().ok()?,
    };
    let root = deck_io::discover_deck(&start).ok()?;
    let (config, _) = config_io::read_config(&root.join("deck")).ok()?;
    Some(config.log.level)
}

fn init_tracing(deck_dir: Option<&str>) {
    let fallback_level = configured_level(deck_dir).unwrap_or_else(|| "warn".to_string());
    let filter = tracing_subscriber::EnvFilter::try_from_env("ND_LOG")
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(fallback_level.trim()))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.deck_dir.as_deref());

    match cli.command {
        Commands::Init(args) => {
            // Init is handled before deck discovery
            if let Err(e) = handlers::cmd_init(args, cli.deck_dir.as_deref().map(Path::new)) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
        _ => {
            if let Err(e) = handlers::dispatch(cli) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
