//! HTTPゲートウェイ
//!
//! - `POST /api/analyze`: `{ "image": "<data url>" }` を解析
//! - `GET /health`: 稼働確認

use crate::error::{CareLabelError, Result};
use crate::gateway::Gateway;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use care_label_common::{AnalysisOutcome, PROMPT_VERSION};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
}

impl AppState {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway: Arc::new(gateway),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/analyze", post(analyze))
        .route("/health", get(health))
        // 写真のData URLは数MBになる。上限で弾くと統一結果にならないため無効化
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

/// 本文は生バイトで受け取り、解釈の失敗もゲートウェイの統一結果で返す
async fn analyze(State(state): State<AppState>, body: Bytes) -> (StatusCode, Json<AnalysisOutcome>) {
    match state.gateway.analyze_body(&body).await {
        Ok(analysis) => (StatusCode::OK, Json(AnalysisOutcome::Success(analysis))),
        Err(err) => (err.status(), Json(err.into())),
    }
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// サーバーを起動し、終了シグナルまで待つ
pub async fn serve(bind: &str, gateway: Gateway) -> Result<()> {
    tracing::info!(
        configured = gateway.is_configured(),
        prompt_version = PROMPT_VERSION,
        "gateway ready"
    );
    let app = create_router(AppState::new(gateway)).layer(
        // 画像本文やヘッダーはスパンに含めない
        TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::new().include_headers(false)),
    );

    let listener = TcpListener::bind(bind)
        .await
        .map_err(|e| CareLabelError::Server(format!("{}: {}", bind, e)))?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for ctrl_c: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => tracing::warn!("failed to install SIGTERM handler: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
