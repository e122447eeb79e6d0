use actix_web::{web, HttpResponse};
use chrono::Local;

use crate::domain::stats::{delivery_ranking, summarize_day};
use crate::error::AppError;
use crate::store::OrderFilter;
use super::requests::StatsQuery;
use super::AppState;

/// Summary of orders created today (server local date).
pub async fn today(
    state: web::Data<AppState>,
    query: web::Query<StatsQuery>,
) -> Result<HttpResponse, AppError> {
    let today = Local::now().date_naive();
    let orders = state.store.list_orders(&OrderFilter::for_day(today)).await?;
    Ok(HttpResponse::Ok().json(summarize_day(&orders, today, query.status)))
}

pub async fn delivery(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let today = Local::now().date_naive();
    let persons = state.store.list_delivery_persons().await?;
    let orders = state.store.list_orders(&OrderFilter::default()).await?;
    Ok(HttpResponse::Ok().json(delivery_ranking(&persons, &orders, today)))
}
