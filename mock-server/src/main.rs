use std::path::PathBuf;

use mock_server::Seed;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let filter = EnvFilter::try_from_env("MOCK_SERVER_LOG")
        .unwrap_or_else(|_| EnvFilter::new("mock_server=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    let seed = match std::env::var_os("MOCK_SERVER_DB").map(PathBuf::from) {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading seed data");
            Seed::from_file(&path)?
        }
        None => Seed::demo(),
    };

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(
        todos = seed.todo.len(),
        users = seed.users.len(),
        "listening on {addr}"
    );
    mock_server::run_with(listener, seed).await
}
