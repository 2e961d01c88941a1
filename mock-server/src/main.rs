use mock_server::{Store, DEFAULT_API_KEY};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let store = Store::demo(DEFAULT_API_KEY).map_err(std::io::Error::other)?;
    let db = std::sync::Arc::new(tokio::sync::RwLock::new(store));

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, api_key = DEFAULT_API_KEY, "mock WorkWave API listening");
    mock_server::run(listener, db).await
}
