//! Lakehouse CLI - entrypoint for the query service

mod commands;

use clap::{Parser, Subcommand};
use commands::ServeCommand;
use tracing_subscriber::{layer::SubscriberExt, Layer};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "LAKEHOUSE_LOG_LEVEL", global = true)]
    log_level: String,

    /// Log format: compact, full
    #[arg(
        long,
        default_value = "compact",
        env = "LAKEHOUSE_LOG_FORMAT",
        global = true
    )]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP query server
    Serve(ServeCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // If RUST_LOG is set, use it directly; otherwise use our default filter
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .map_err(|e| anyhow::anyhow!("Invalid RUST_LOG environment variable: {}", e))?
    } else {
        // Lakehouse crates at the requested level, noisy dependencies at warn
        tracing_subscriber::EnvFilter::new(format!(
            "lakehouse={level},\
             lakehouse_api={level},\
             lakehouse_query={level},\
             lakehouse_query_fabric={level},\
             tower_http={level},\
             tiberius=warn,\
             h2=warn,\
             tower=warn,\
             hyper=warn,\
             reqwest=warn,\
             rustls=warn",
            level = cli.log_level
        ))
    };

    let fmt_layer = match cli.log_format.as_str() {
        "full" => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed(),
        _ => tracing_subscriber::fmt::layer() // "compact" or any other value
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set global default subscriber: {}", e))?;

    match cli.command {
        Commands::Serve(serve_cmd) => serve_cmd.execute(),
    }
}
