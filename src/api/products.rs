use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::error::AppError;
use super::requests::{CreateProductRequest, ReduceStockRequest, UpdateProductRequest};
use super::AppState;

pub async fn list(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let products = state.store.list_products().await?;
    Ok(HttpResponse::Ok().json(products))
}

pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let product = state.store.create_product(body.into_inner().into_new_product()?).await?;
    tracing::info!(product_id = %product.id, name = %product.name, "Product created");
    Ok(HttpResponse::Created().json(product))
}

pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let product = state
        .store
        .update_product(id, body.into_inner().into_changes()?)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {}", id)))?;

    tracing::info!(
        product_id = %id,
        stock_quantity = product.stock_quantity,
        "Product updated"
    );
    Ok(HttpResponse::Ok().json(product))
}

pub async fn reduce_stock(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<ReduceStockRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let quantity = body.quantity;

    match state.store.reduce_stock(id, quantity).await {
        Ok(product) => {
            tracing::info!(
                product_id = %id,
                requested = quantity,
                remaining = product.stock_quantity,
                "Stock reduced"
            );
            Ok(HttpResponse::Ok().json(product))
        }
        Err(AppError::InsufficientStock { counter, requested, available }) => {
            state.metrics.record_stock_rejection(counter);
            tracing::warn!(
                product_id = %id,
                requested = requested,
                available = available,
                "Stock reduction rejected"
            );
            Err(AppError::InsufficientStock { counter, requested, available })
        }
        Err(e) => Err(e),
    }
}
