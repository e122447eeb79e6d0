use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde_json::json;

use super::AppState;

pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    match state.store.ping().await {
        Ok(()) => HttpResponse::Ok().json(json!({
            "status": "OK",
            "timestamp": Utc::now(),
            "database": "Connected",
        })),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            HttpResponse::ServiceUnavailable().json(json!({
                "status": "ERROR",
                "timestamp": Utc::now(),
                "database": "Disconnected",
            }))
        }
    }
}
