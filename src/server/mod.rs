//! HTTP surface of the portal.

pub mod extract;
pub mod routes;
pub mod session;

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::app_system::PortalSystem;
use routes::*;
use session::require_session;

const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// All routes. Everything except sign-up and login sits behind the session gate.
pub fn router(system: PortalSystem) -> Router {
    let protected = Router::new()
        .route("/api/auth/logout", post(sign_out_handler))
        .route("/api/me", get(me_handler))
        .route("/api/branding", get(branding_handler))
        .route("/api/quote", post(quote_handler))
        .route("/api/orders", post(submit_order_handler).get(order_history_handler))
        .route("/api/dashboard", get(dashboard_handler))
        .route(
            "/api/jobs/:job_id/files",
            post(upload_files_handler).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route_layer(middleware::from_fn_with_state(system.clone(), require_session));

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/auth/signup", post(sign_up_handler))
        .route("/api/auth/login", post(sign_in_handler))
        .merge(protected)
        .layer(cors)
        .with_state(system)
}

pub async fn serve(system: PortalSystem, port: u16) -> std::io::Result<()> {
    let address = format!("0.0.0.0:{port}");
    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, router(system))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
