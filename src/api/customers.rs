use actix_web::{web, HttpResponse};

use crate::domain::customer::PhoneNumber;
use crate::error::AppError;
use super::AppState;

pub async fn list(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let customers = state.store.list_customers().await?;
    Ok(HttpResponse::Ok().json(customers))
}

pub async fn by_phone(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let phone = PhoneNumber::new(path.into_inner());
    let customer = state
        .store
        .find_customer_by_phone(&phone)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Customer with phone {}", phone.as_str())))?;
    Ok(HttpResponse::Ok().json(customer))
}
