//! Fishcart shop bot entry point.
//!
//! Binary name: `fishcart`
//!
//! Parses CLI arguments, initializes tracing and application state, then
//! either runs the Telegram long-poll loop (`run`) or prints a status
//! summary (`status`).

mod poll;
mod state;

use clap::{Parser, Subcommand};
use console::style;
use tokio_util::sync::CancellationToken;

use fishcart_infra::sqlite::SqliteSessionStore;
use state::AppState;

/// Telegram shop bot backed by a Strapi catalog.
#[derive(Parser)]
#[command(name = "fishcart", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Suppress all output except errors.
    #[arg(long, global = true)]
    quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Export spans via OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    otel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot: connect to Telegram and poll for updates.
    Run,

    /// Print the configuration summary and database reachability.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // -v/-q pick the default filter; RUST_LOG still wins.
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "info,fishcart=debug",
        _ => "trace",
    };
    if let Err(e) = fishcart_observe::init_tracing(filter, cli.otel) {
        eprintln!("failed to initialize tracing: {e}");
    }

    let state = AppState::init().await?;

    match cli.command {
        Commands::Run => run(state).await?,
        Commands::Status => status(&state).await,
    }

    fishcart_observe::shutdown_tracing();
    Ok(())
}

/// Run the long-poll loop until Ctrl+C or SIGTERM.
async fn run(state: AppState) -> anyhow::Result<()> {
    println!(
        "  {} Fishcart bot polling (backend {})",
        style("⚡").bold(),
        style(state.config.commerce_base_url()).cyan()
    );
    println!("  {}", style("Press Ctrl+C to stop").dim());

    let shutdown = CancellationToken::new();
    let poll_handle = tokio::spawn(poll::run_poll_loop(state, shutdown.clone()));

    shutdown_signal().await;
    shutdown.cancel();
    poll_handle.await?;

    println!("\n  Bot stopped.");
    Ok(())
}

/// Display the configuration summary and whether the session store answers.
async fn status(state: &AppState) {
    let store = SqliteSessionStore::new(state.db_pool.clone());
    let sessions = store.session_count().await;

    println!();
    println!(
        "  {} Fishcart v{}",
        style("⚡").bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("  {}", style("── Config ──").dim());
    println!(
        "  Commerce backend: {}",
        style(state.config.commerce_base_url()).cyan()
    );
    println!("  Database:         {}", state.config.database_url);
    println!();
    println!("  {}", style("── Sessions ──").dim());
    match sessions {
        Ok(count) => println!(
            "  Store reachable:  {} ({} stored)",
            style("✓").green(),
            style(count).bold()
        ),
        Err(e) => println!("  Store reachable:  {} ({e})", style("✗").red()),
    }
    println!();
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
