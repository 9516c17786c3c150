use std::{net::SocketAddr, sync::Arc};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use wiki_dashboard::{
    AppState, Config, Dashboard,
    cache::TableCache,
    config::{CredentialProvider, EnvCredentials, TOKEN_KEY},
    fetch::build_client,
    router,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();

    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let credentials: Arc<dyn CredentialProvider> = Arc::new(EnvCredentials);
    if config.send_auth && credentials.credential(TOKEN_KEY).is_none() {
        warn!("{TOKEN_KEY} is not set; every panel will report a missing credential");
    }

    let client = build_client(config.http_timeout)?;
    let dashboard = Dashboard::new(&config, Arc::new(TableCache::new()), client, credentials);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(
        api_base = %config.api_base,
        ttl_secs = config.cache_ttl.as_secs(),
        send_auth = config.send_auth,
        "dashboard configured"
    );

    let app = router(AppState::new(config, dashboard));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("shutting down");
        })
        .await?;

    Ok(())
}
