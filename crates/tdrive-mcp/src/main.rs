mod server;
mod tools;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use tdrive_core::{Config, FileBackend, TeldriveClient};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use server::TdriveServer;

/// Streamable HTTP endpoint, one request per exchange.
const HTTP_PATH: &str = "/mcp/http";
/// Session-based endpoint for clients that hold an event stream open.
const SSE_PATH: &str = "/mcp/sse";

const SSE_KEEP_ALIVE: Duration = Duration::from_secs(15);

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        log::error!("server error: {e}");
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let backend: Arc<dyn FileBackend> = Arc::new(TeldriveClient::new(&config)?);
    let mcp = TdriveServer::new(backend, config.max_content_bytes);
    let shutdown = CancellationToken::new();

    let app = Router::new()
        .nest_service(HTTP_PATH, mcp_service(mcp.clone(), false, &shutdown))
        .nest_service(SSE_PATH, mcp_service(mcp, true, &shutdown));

    let listener = TcpListener::bind(config.listen_addr).await?;
    log::info!(
        "{} listening on {} (backend {})",
        server::SERVER_NAME,
        listener.local_addr()?,
        config.base_url
    );

    let signal_token = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => log::info!("ctrl_c received; shutting down"),
                Err(e) => {
                    log::error!("failed to listen for ctrl_c: {e}");
                    std::future::pending::<()>().await;
                }
            }
            signal_token.cancel();
        })
        .await?;

    Ok(())
}

fn mcp_service(
    server: TdriveServer,
    stateful: bool,
    shutdown: &CancellationToken,
) -> StreamableHttpService<TdriveServer, LocalSessionManager> {
    let config = StreamableHttpServerConfig {
        stateful_mode: stateful,
        sse_keep_alive: stateful.then_some(SSE_KEEP_ALIVE),
        cancellation_token: shutdown.child_token(),
        ..Default::default()
    };
    StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        config,
    )
}
