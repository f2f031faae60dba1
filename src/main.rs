use panel_http::{
    cert_errors::{self, CertErrorTranslator},
    routes::{self, AppState},
    Config, TimeoutPolicy,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "panel_http=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!(
        port = config.port,
        base_url = %config.base_url,
        "Starting panel-http"
    );

    // Per-request cookies are attached by the routes.
    let translator = CertErrorTranslator::embedded(config.language.clone(), None);
    if cert_errors::install(translator.clone()).is_err() {
        tracing::warn!("Certificate error translator was already registered");
    }

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::router(AppState {
        translator: Arc::new(translator),
        policy: TimeoutPolicy::STANDARD,
    })
    .layer(cors)
    .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on http://{}", addr);
    axum::serve(listener, app).await
}
