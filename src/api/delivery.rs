use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::domain::catalog::DeliveryPersonChanges;
use crate::error::AppError;
use super::requests::{CreateDeliveryPersonRequest, UpdateDeliveryPersonRequest};
use super::AppState;

pub async fn list(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let persons = state.store.list_delivery_persons().await?;
    Ok(HttpResponse::Ok().json(persons))
}

pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<CreateDeliveryPersonRequest>,
) -> Result<HttpResponse, AppError> {
    let person = state
        .store
        .create_delivery_person(body.into_inner().into_new_delivery_person()?)
        .await?;
    tracing::info!(delivery_person_id = %person.id, name = %person.name, "Delivery person created");
    Ok(HttpResponse::Created().json(person))
}

pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateDeliveryPersonRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let person = state
        .store
        .update_delivery_person(id, body.into_inner().into_changes()?)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Delivery person {}", id)))?;
    Ok(HttpResponse::Ok().json(person))
}

/// Soft delete: the person stays on past orders but can no longer be assigned.
pub async fn deactivate(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let changes = DeliveryPersonChanges {
        active: Some(false),
        ..Default::default()
    };
    let person = state
        .store
        .update_delivery_person(id, changes)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Delivery person {}", id)))?;

    tracing::info!(delivery_person_id = %id, "Delivery person deactivated");
    Ok(HttpResponse::Ok().json(person))
}
