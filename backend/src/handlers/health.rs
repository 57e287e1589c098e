use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::AppState;

const SERVICE: &str = env!("CARGO_PKG_NAME");

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": SERVICE,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Ready once the store answers; the model provider is optional and only reported.
pub async fn readyz(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let database = match sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.db)
        .await
    {
        Ok(_) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check: database unreachable");
            "failed"
        }
    };
    let chat = if state.config.claude_api_key.is_empty() {
        "not_configured"
    } else {
        "configured"
    };

    let (status, label) = readiness(database == "ok");
    (
        status,
        Json(json!({
            "status": label,
            "service": SERVICE,
            "checks": { "database": database, "chat": chat },
        })),
    )
}

fn readiness(database_ok: bool) -> (StatusCode, &'static str) {
    if database_ok {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not_ready")
    }
}
