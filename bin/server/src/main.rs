use std::sync::Arc;
use tourdesk_platform_access::CallbackChain;
use tourdesk_server::{
    api::HubApiClient,
    app,
    auth::{AppState, OidcClient},
    config::ServerConfig,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env().expect("failed to load configuration");
    tracing::info!(
        allowed_domains = ?config.access.allowed_domains(),
        api = %config.api.base_url,
        "Loaded configuration"
    );

    let api = Arc::new(HubApiClient::new(config.api.clone()).expect("failed to build API client"));

    let chain = CallbackChain::new(api.clone(), config.access, config.session.lifetime())
        .with_provider(config.api.provider.clone());

    // Initialize OIDC client
    tracing::info!("Discovering OIDC provider...");
    let oidc_client = OidcClient::discover(config.oidc)
        .await
        .expect("failed to discover OIDC provider");

    let app_state = Arc::new(AppState::new(
        chain,
        Arc::new(oidc_client),
        api,
        config.session,
    ));

    let app = app::router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .expect("failed to bind to address");

    tracing::info!("listening on http://{}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
