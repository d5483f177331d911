//! Stateless HTTP gateway
//!
//! Every POST is an independent invocation: a fresh [`Session`] is created
//! per call, so no negotiation state survives between requests. Protocol
//! faults are carried inside a 200 response; HTTP 500 is reserved for the
//! case where the engine cannot even format a reply.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;

use crate::error::Result;
use crate::server::{MethodRouter, Session};

/// Build the gateway application around a shared router.
pub fn app(router: Arc<MethodRouter>) -> Router {
    Router::new().route("/", post(handle)).with_state(router)
}

/// Bind and serve the gateway until the process exits.
pub async fn serve(bind: &str, router: Arc<MethodRouter>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!("HTTP gateway listening on {bind}");
    axum::serve(listener, app(router)).await?;
    Ok(())
}

async fn handle(State(router): State<Arc<MethodRouter>>, body: String) -> Response {
    let mut session = Session::new();

    match router.handle_raw(&body, &mut session).await {
        Ok(Some(reply)) => with_rpc_headers(StatusCode::OK, reply),
        // Notifications get an empty 200 with the same headers.
        Ok(None) => with_rpc_headers(StatusCode::OK, String::new()),
        Err(e) => {
            tracing::error!("Failed to format gateway reply: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn with_rpc_headers(status: StatusCode, body: String) -> Response {
    (
        status,
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        ],
        body,
    )
        .into_response()
}
