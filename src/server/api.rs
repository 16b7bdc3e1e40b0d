use crate::error::ChatError;
use crate::gateway::CompletionGateway;
use crate::models::chat::{ ChatRequest, Turn };
use std::error::Error;
use std::net::SocketAddr;
use axum::{
    body::Bytes,
    routing::{ get, post },
    Router,
    extract::State,
    Json,
};
use serde::Serialize;
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, error };

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    model: String,
}

#[derive(Clone)]
pub struct AppState {
    pub gateway: CompletionGateway,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/api/health", get(health_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_http_server(
    addr: &str,
    gateway: CompletionGateway,
    tls: Option<(String, String)>
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = addr.parse::<SocketAddr>()?;
    let app = router(AppState { gateway });

    if let Some((cert_path, key_path)) = tls {
        info!("Loading TLS certificate from '{}' and key from '{}'", cert_path, key_path);
        let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
            cert_path,
            key_path
        ).await?;

        info!("Starting HTTPS API server on: https://{}", addr);
        axum_server::bind_rustls(addr, tls_config).serve(app.into_make_service()).await?;
    } else {
        let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
            format!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e)
        })?;
        info!("Starting HTTP API server on: http://{}", addr);
        axum::serve(listener, app.into_make_service()).await?;
    }

    Ok(())
}

/// `POST /api/chat`: one reply turn for the submitted history.
///
/// The body is parsed by hand so a missing or invalid `messages` field ends in
/// the same generic 500 as a provider failure.
async fn chat_handler(State(state): State<AppState>, body: Bytes) -> Result<Json<Turn>, ChatError> {
    let request = serde_json::from_slice::<ChatRequest>(&body).map_err(|e| {
        error!("Rejecting chat request: {}", e);
        ChatError::MalformedRequest(e.to_string())
    })?;

    let reply = state.gateway.complete(request.messages).await?;
    Ok(Json(reply))
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model: state.gateway.model(),
    })
}
