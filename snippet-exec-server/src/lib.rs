use axum::{
    body::Bytes,
    extract::State,
    routing::{get, post},
    Json, Router,
};
use snippet_exec::{CodeExecutionService, ExecutorConfig, NamingMode, Response};
use std::{net::SocketAddr, sync::Arc};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Execution service error: {0}")]
    Service(#[from] snippet_exec::Error),
    #[error("Server error: {0}")]
    ServerError(String),
}

#[derive(Clone)]
pub struct AppState {
    service: Arc<CodeExecutionService>,
}

pub fn create_service(config: ExecutorConfig) -> Result<CodeExecutionService, ServerError> {
    let service = CodeExecutionService::new(config)?;
    if let Err(e) = service.executor().check_tools() {
        warn!("Requests will fail until this is fixed: {}", e);
    }
    Ok(service)
}

pub fn create_app(config: ExecutorConfig) -> Result<Router, ServerError> {
    let state = AppState {
        service: Arc::new(create_service(config)?),
    };

    let cors = CorsLayer::permissive();

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/execute", post(execute_derived))
        .route("/execute/fixed", post(execute_fixed))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    Ok(app)
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), ServerError> {
    info!("Starting code execution server on {}", addr);
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::ServerError(e.to_string()))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::ServerError(e.to_string()))?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}

// The body is taken as raw bytes: malformed JSON is a failed execution, not a 4xx.
async fn execute_derived(State(state): State<AppState>, body: Bytes) -> Json<Response> {
    Json(
        state
            .service
            .handle_bytes(body.to_vec(), NamingMode::Derived)
            .await,
    )
}

async fn execute_fixed(State(state): State<AppState>, body: Bytes) -> Json<Response> {
    Json(
        state
            .service
            .handle_bytes(body.to_vec(), NamingMode::Fixed)
            .await,
    )
}
