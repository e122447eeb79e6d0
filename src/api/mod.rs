// ============================================================================
// HTTP API
// ============================================================================
//
// actix-web handlers mounted under /api. Handlers only translate between
// HTTP and the domain: request models are validated in `requests`, writes
// to orders go through `OrderCommandHandler`, everything else reads or
// writes the `Store` directly.
//
// ============================================================================

mod customers;
mod delivery;
mod error;
mod flavors;
mod health;
mod orders;
mod products;
pub mod requests;
mod stats;

use actix_web::{error::InternalError, web, HttpResponse};
use serde_json::json;
use std::sync::Arc;

use crate::domain::order::OrderCommandHandler;
use crate::metrics::{metrics_handler, Metrics};
use crate::store::Store;

/// Shared state injected into every handler.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub metrics: Arc<Metrics>,
    pub orders: OrderCommandHandler,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, metrics: Arc<Metrics>) -> Self {
        let orders = OrderCommandHandler::new(store.clone(), metrics.clone());
        Self { store, metrics, orders }
    }
}

/// Malformed bodies, queries and paths answer 400 with the usual error shape.
fn bad_request(message: String) -> actix_web::Error {
    tracing::debug!(error = %message, "Rejected malformed request");
    InternalError::from_response(
        message.clone(),
        HttpResponse::BadRequest().json(json!({ "error": message })),
    )
    .into()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| bad_request(err.to_string())))
        .app_data(web::QueryConfig::default().error_handler(|err, _req| bad_request(err.to_string())))
        .app_data(web::PathConfig::default().error_handler(|err, _req| bad_request(err.to_string())))
        .route("/health", web::get().to(health::health))
        .route("/metrics", web::get().to(metrics_handler))
        // Products
        .route("/products", web::get().to(products::list))
        .route("/products", web::post().to(products::create))
        .route("/products/{id}", web::put().to(products::update))
        .route("/products/{id}/reduce-stock", web::post().to(products::reduce_stock))
        // Flavors and extras
        .route("/flavors/pizza", web::get().to(flavors::list_pizza))
        .route("/flavors/pizza", web::post().to(flavors::create_pizza))
        .route("/flavors/pizza/{id}", web::put().to(flavors::update_pizza))
        .route("/flavors/esfiha", web::get().to(flavors::list_esfiha))
        .route("/flavors/esfiha", web::post().to(flavors::create_esfiha))
        .route("/flavors/esfiha/{id}", web::put().to(flavors::update_esfiha))
        .route("/extras", web::get().to(flavors::extras))
        // Delivery staff
        .route("/delivery/persons", web::get().to(delivery::list))
        .route("/delivery/persons", web::post().to(delivery::create))
        .route("/delivery/persons/{id}", web::put().to(delivery::update))
        .route("/delivery/persons/{id}", web::delete().to(delivery::deactivate))
        // Customers
        .route("/customers", web::get().to(customers::list))
        .route("/customers/phone/{phone}", web::get().to(customers::by_phone))
        // Orders
        .route("/orders", web::get().to(orders::list))
        .route("/orders", web::post().to(orders::create))
        .route("/orders/{id}", web::get().to(orders::get))
        .route("/orders/{id}", web::put().to(orders::update))
        .route("/orders/{id}", web::delete().to(orders::delete))
        .route("/orders/{id}/advance", web::post().to(orders::advance))
        // Stats
        .route("/stats/today", web::get().to(stats::today))
        .route("/stats/delivery", web::get().to(stats::delivery));
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::store::MemoryStore;

    /// Handler state over a fresh in-memory store.
    pub fn state(store: Arc<MemoryStore>) -> web::Data<AppState> {
        let metrics = Arc::new(Metrics::new().unwrap());
        web::Data::new(AppState::new(store, metrics))
    }
}
