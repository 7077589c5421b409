use anyhow::Result;
use relay_server::config::{DEFAULT_HOST, DEFAULT_PORT};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let ax = relay_server::build()?;

    let host = ax
        .app
        .get("http.host")
        .unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = ax
        .app
        .get("http.port")
        .unwrap_or_else(|| DEFAULT_PORT.to_string());

    let addr = format!("{host}:{port}");

    info!(clients = ?ax.app.tenants().keys(), "multi-client relay on :{port}");

    ax.listen(addr).await?;

    Ok(())
}
