use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::domain::order::OrderCommand;
use crate::error::AppError;
use crate::store::OrderFilter;
use super::requests::{CreateOrderRequest, OrdersQuery, UpdateOrderRequest};
use super::AppState;

/// Newest first, with customer, delivery person and items nested.
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<OrdersQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let filter = match query.date {
        Some(date) => OrderFilter::for_day(date),
        None => OrderFilter::default(),
    }
    .with_status(query.status);

    let orders = state.store.list_orders(&filter).await?;
    Ok(HttpResponse::Ok().json(orders))
}

pub async fn get(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let order = state
        .store
        .get_order(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {}", id)))?;
    Ok(HttpResponse::Ok().json(order))
}

pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let command = body.into_inner().into_place_order()?;
    let order = state.orders.place(command).await?;
    Ok(HttpResponse::Created().json(order))
}

pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let order = state
        .orders
        .update(path.into_inner(), body.into_inner().into())
        .await?;
    Ok(HttpResponse::Ok().json(order))
}

pub async fn advance(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order = state.orders.handle(path.into_inner(), OrderCommand::Advance).await?;
    Ok(HttpResponse::Ok().json(order))
}

pub async fn delete(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    state.orders.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
