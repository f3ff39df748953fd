//! The HTTP front end: routes every URL the site answers to a handler and
//! falls back to the public directory for everything else.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::handler::Handler;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::site::{Site, FEED_PATH};

mod error;
mod handlers;

pub use error::{respond, Error, Result};

/// Builds the router for `site`.
pub fn router(site: Arc<Site>) -> Router {
    let public = ServeDir::new(&site.config.public_directory)
        .fallback(handlers::not_found.with_state(site.clone()));

    Router::new()
        .route("/", get(handlers::home))
        .route("/articles", get(handlers::archive))
        .route("/articles/:id", get(handlers::article))
        .route(FEED_PATH, get(handlers::feed))
        .route(
            "/article/:year/:month/:day/:id",
            get(handlers::legacy_article),
        )
        .route("/tech/atom.xml", get(handlers::legacy_feed))
        .route("/projects", get(handlers::projects))
        .route("/photos", get(handlers::photos))
        .route("/photos/:id", get(handlers::photo_detail))
        .route("/sitemap.xml", get(handlers::sitemap))
        .route("/stylesheets/:file", get(handlers::stylesheet))
        .fallback_service(public)
        .layer(TraceLayer::new_for_http())
        .with_state(site)
}

/// Serves `site` on `addr` until interrupted.
pub async fn serve(site: Arc<Site>, addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, articles = site.articles.len(), "listening");

    axum::serve(listener, router(site))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "can't listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "can't listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutting down");
}
