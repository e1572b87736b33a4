use std::path::PathBuf;

use chronica::db::Db;
use chronica::moderation::ContentFilter;
use chronica::AppState;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// SQLite database URL.
    #[arg(long, env, default_value = "sqlite://chronica.db")]
    database_url: String,

    /// The address to bind to.
    #[arg(short, long, env, default_value = "127.0.0.1:5000")]
    address: String,

    /// JSON file with banned-word lists per locale, e.g. {"ru": [...], "en": [...]}.
    /// Falls back to the built-in lists when omitted.
    #[arg(long, env)]
    banned_words: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "tracing=info,chronica=debug".to_owned());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .init();

    let args = Args::parse();

    let db = Db::new(&args.database_url).await?;
    let content_filter = match &args.banned_words {
        Some(path) => ContentFilter::from_json_file(path)?,
        None => ContentFilter::default(),
    };

    let router = chronica::router(AppState {
        db,
        filter: content_filter,
    });

    let listener = tokio::net::TcpListener::bind(&args.address).await?;
    tracing::info!("listening on {}", args.address);
    axum::serve(listener, router).await?;

    Ok(())
}
