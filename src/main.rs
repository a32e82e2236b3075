//! tidings - a terminal RSS/Atom reader

mod config;
mod error;
mod fetch;
mod storage;
mod tui;

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::fetch::OfflineSource;
use crate::storage::ArticleStore;

fn print_usage() {
    eprintln!("Usage: tidings [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --config <FILE>       Load configuration from FILE");
    eprintln!("  -h, --help                Print help");
    eprintln!();
    eprintln!("Logging goes to tidings.log in the data directory;");
    eprintln!("set TIDINGS_LOG to change the filter (default: info).");
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut config_file: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                return;
            }
            "-c" | "--config" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a file path");
                    std::process::exit(1);
                }
                config_file = Some(PathBuf::from(&args[i]));
            }
            arg => {
                eprintln!("Error: Unknown option: {}", arg);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    init_logging();

    let (config, warnings) = config::load_config(config_file.as_ref());
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }

    let store = match store_path() {
        Some(path) => match ArticleStore::load(path) {
            Ok(store) => store,
            Err(e) => {
                eprintln!("Warning: could not load article store: {}", e);
                ArticleStore::new()
            }
        },
        None => {
            eprintln!("Warning: no data directory found; articles will not persist");
            ArticleStore::new()
        }
    };

    let mut app = tui::App::new(config, store, Box::new(OfflineSource), config_file);

    if let Err(e) = tui::run(&mut app) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = app.save() {
        eprintln!("Warning: could not save article store: {}", e);
    }
}

fn store_path() -> Option<PathBuf> {
    let mut path = config::user_data_dir()?;
    path.push("articles.toml");
    Some(path)
}

/// Log to a file in the data dir so the alternate screen stays clean. If no
/// data dir or file is available, logging is simply off.
fn init_logging() {
    let Some(mut path) = config::user_data_dir() else {
        return;
    };
    if std::fs::create_dir_all(&path).is_err() {
        return;
    }
    path.push("tidings.log");
    let Ok(file) = std::fs::File::options().create(true).append(true).open(&path) else {
        return;
    };
    let filter = EnvFilter::try_from_env("TIDINGS_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "tidings starting");
}
