use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use docterm::core::config::{self, CliOverrides};
use docterm::store::{DocumentStore, MemoryStore};
use docterm::tui;
use simplelog::{ConfigBuilder, WriteLogger};

#[derive(Parser)]
#[command(name = "docterm", about = "Terminal browser for document databases")]
struct Args {
    /// JSON data file to browse (`{ db: { collection: [docs] } }`)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Documents per page
    #[arg(short, long)]
    page_size: Option<usize>,

    /// Config file to use instead of ~/.docterm/config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let file_config = config::load_config(args.config.as_deref()).map_err(std::io::Error::other)?;
    let resolved = config::resolve(
        &file_config,
        &CliOverrides {
            data_file: args.data,
            page_size: args.page_size,
            log_level: args.log_level,
        },
    );

    // Initialize file logger - writes to docterm.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create("docterm.log") {
        let _ = WriteLogger::init(resolved.log_level, log_config, log_file);
    }

    let store: Arc<dyn DocumentStore> = match &resolved.data_file {
        Some(path) => Arc::new(MemoryStore::load(path).map_err(|e| {
            log::error!("Failed to load {}: {}", path.display(), e);
            std::io::Error::other(e)
        })?),
        None => Arc::new(MemoryStore::demo()),
    };

    log::info!("docterm starting up with store: {}", store.name());

    tui::run(resolved, store)
}
