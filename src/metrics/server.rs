use actix_web::{web, HttpResponse};
use prometheus::{Encoder, Registry, TextEncoder};

use crate::api::AppState;

/// Encode every registered metric in the Prometheus text format.
pub fn render(registry: &Registry) -> Result<Vec<u8>, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();

    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(buffer)
}

pub async fn metrics_handler(state: web::Data<AppState>) -> HttpResponse {
    match render(state.metrics.registry()) {
        Ok(buffer) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(buffer),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Metrics;

    #[test]
    fn test_render_includes_registered_counters() {
        let metrics = Metrics::new().unwrap();
        metrics.record_order_deleted();

        let text = String::from_utf8(render(metrics.registry()).unwrap()).unwrap();
        assert!(text.contains("orders_deleted_total 1"));
        assert!(text.contains("# TYPE orders_created_total counter"));
    }
}
