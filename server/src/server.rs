use std::net::SocketAddr;

use axum::{body::Body, http::Request, Router};
use color_eyre::eyre::WrapErr;
use tower::ServiceBuilder;
use tracing::info;

/// Serve `app` on `0.0.0.0:$PORT` (default 3000) until the process exits
pub async fn run_server(app: Router) -> crate::Result<()> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let port: u16 = port
        .parse()
        .wrap_err_with(|| format!("PORT is not a valid port number: {port}"))?;
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let app = app.layer(
        ServiceBuilder::new()
            .layer(sentry_tower::NewSentryLayer::<Request<Body>>::new_from_top())
            .layer(sentry_tower::SentryHttpLayer::with_transaction()),
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .wrap_err("Failed to bind listener")?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .await
        .wrap_err("Server exited with an error")?;

    Ok(())
}
