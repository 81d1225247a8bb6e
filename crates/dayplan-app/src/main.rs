//! dayplan: terminal calendar with a chat assistant
//!
//! Usage:
//!   dayplan              - Start the interactive calendar
//!   dayplan --help       - Show help
//!   dayplan --version    - Show version

mod cli;
mod render;

use tracing_subscriber::EnvFilter;

/// Run mode
enum RunMode {
    /// Interactive calendar REPL
    Repl,
    /// Show help
    Help,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mode = parse_args();

    match mode {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("dayplan {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        RunMode::Repl => {}
    }

    // Initialize logging; the REPL owns stdout, so default to warnings only
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .init();

    // Load .env file
    dotenvy::dotenv().ok();

    // Load configuration (dayplan.toml, environment, defaults)
    let config = dayplan_core::Config::load()
        .map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    tracing::info!("Starting dayplan...");
    tracing::info!("Database: {}", config.storage.db_path);

    cli::run_app(config).await
}

/// Parse command line arguments
fn parse_args() -> RunMode {
    let args: Vec<String> = std::env::args().collect();

    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => return RunMode::Help,
            "--version" | "-v" => return RunMode::Version,
            _ => {}
        }
    }

    RunMode::Repl
}

/// Print help message
fn print_help() {
    println!("dayplan - terminal calendar with a chat assistant");
    println!();
    println!("Usage:");
    println!("  dayplan              Start the interactive calendar");
    println!("  dayplan --help       Show this help message");
    println!("  dayplan --version    Show version");
    println!();
    println!("Environment Variables:");
    println!("  DB_PATH              SQLite database path (default: data/dayplan.db)");
    println!("  CHAT_API_URL         Chat endpoint URL (default: http://localhost:5000/api/chat)");
    println!("  CHAT_TIMEOUT_SECS    Chat request timeout (default: 30)");
    println!();
    println!("Configuration can also live in dayplan.toml; see dayplan.toml.example.");
}
