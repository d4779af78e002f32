use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use wall_service::feed::WallProjection;
use wall_service::services::{ChatClient, WallService};
use wall_service::session::SessionVerifier;
use wall_service::store::{InMemoryPostStore, PostStore};
use wall_service::{handlers, logging, metrics, Config};

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable; waiting for Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

async fn run_healthcheck(port: u16) -> anyhow::Result<()> {
    let url = format!("http://127.0.0.1:{}/api/v1/health/live", port);
    let resp = reqwest::Client::new()
        .get(&url)
        .send()
        .await
        .context("healthcheck HTTP error")?;

    anyhow::ensure!(
        resp.status().is_success(),
        "healthcheck HTTP status: {}",
        resp.status()
    );
    Ok(())
}

/// Wall Service
///
/// Serves the anonymous wall: posts, likes, comments, the engagement
/// leaderboard and WhisperBot.
///
/// # Routes
///
/// - `/api/v1/posts/*` - feed, create, like/unlike, comments
/// - `/api/v1/leaderboard` - ranked authors
/// - `/api/v1/chat`, `/api/v1/suggestions` - inference passthrough
/// - `/api/v1/health`, `/metrics` - operations
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let config = Config::from_env()
        .map_err(anyhow::Error::msg)
        .context("Failed to load configuration")?;

    // Container healthchecks: `wall-service healthcheck`
    if std::env::args().nth(1).as_deref() == Some("healthcheck") {
        return run_healthcheck(config.app.port).await;
    }

    logging::init_tracing();

    tracing::info!("Starting wall-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    if config.chat.api_key.is_none() {
        tracing::warn!("CHAT_API_KEY not configured; WhisperBot will answer offline");
    }

    let store: Arc<dyn PostStore> = Arc::new(InMemoryPostStore::new());
    let projection = Arc::new(WallProjection::new());
    let projection_task = projection.spawn(store.subscribe());

    let wall = web::Data::new(WallService::new(
        store.clone(),
        projection.clone(),
        config.wall.clone(),
    ));
    let chat = web::Data::new(
        ChatClient::new(config.chat.clone()).context("Failed to build inference client")?,
    );
    let verifier = web::Data::new(SessionVerifier::new(&config.auth));

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    let allowed_origins = config.cors.allowed_origins.clone();
    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else if !origin.is_empty() {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(wall.clone())
            .app_data(chat.clone())
            .app_data(verifier.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .route("/metrics", web::get().to(metrics::serve_metrics))
            .configure(handlers::configure_routes)
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .disable_signals()
    .run();

    let handle = server.handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received; stopping HTTP server");
        handle.stop(true).await;
    });

    server.await.context("HTTP server error")?;

    projection_task.abort();
    tracing::info!("wall-service stopped");
    Ok(())
}
