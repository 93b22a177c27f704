mod app;
mod cache;
mod connection;
mod input;
mod navigator;
mod screen;
mod session;
mod transport;

use deck_proto::config::{self, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = config::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("deckrc.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "debug".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("deckrc log: {}", log_path.display());

    tracing::info!("deckrc starting…");

    let config = Config::load().unwrap_or_default();
    app::run(config).await
}
