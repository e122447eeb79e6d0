use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::domain::catalog::FlavorKind;
use crate::domain::pricing::extras_menu;
use crate::error::AppError;
use super::requests::{CreateFlavorRequest, UpdateFlavorRequest};
use super::AppState;

async fn list(state: &AppState, kind: FlavorKind) -> Result<HttpResponse, AppError> {
    let flavors = state.store.list_flavors(kind).await?;
    Ok(HttpResponse::Ok().json(flavors))
}

async fn create(
    state: &AppState,
    kind: FlavorKind,
    request: CreateFlavorRequest,
) -> Result<HttpResponse, AppError> {
    let flavor = state.store.create_flavor(kind, request.into_new_flavor()?).await?;
    tracing::info!(kind = %kind, flavor_id = %flavor.id, name = %flavor.name, "Flavor created");
    Ok(HttpResponse::Created().json(flavor))
}

async fn update(
    state: &AppState,
    kind: FlavorKind,
    id: Uuid,
    request: UpdateFlavorRequest,
) -> Result<HttpResponse, AppError> {
    let flavor = state
        .store
        .update_flavor(kind, id, request.into_changes()?)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Flavor {}", id)))?;

    tracing::info!(kind = %kind, flavor_id = %id, "Flavor updated");
    Ok(HttpResponse::Ok().json(flavor))
}

pub async fn list_pizza(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    list(&state, FlavorKind::Pizza).await
}

pub async fn create_pizza(
    state: web::Data<AppState>,
    body: web::Json<CreateFlavorRequest>,
) -> Result<HttpResponse, AppError> {
    create(&state, FlavorKind::Pizza, body.into_inner()).await
}

pub async fn update_pizza(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateFlavorRequest>,
) -> Result<HttpResponse, AppError> {
    update(&state, FlavorKind::Pizza, path.into_inner(), body.into_inner()).await
}

pub async fn list_esfiha(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    list(&state, FlavorKind::Esfiha).await
}

pub async fn create_esfiha(
    state: web::Data<AppState>,
    body: web::Json<CreateFlavorRequest>,
) -> Result<HttpResponse, AppError> {
    create(&state, FlavorKind::Esfiha, body.into_inner()).await
}

pub async fn update_esfiha(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateFlavorRequest>,
) -> Result<HttpResponse, AppError> {
    update(&state, FlavorKind::Esfiha, path.into_inner(), body.into_inner()).await
}

pub async fn extras() -> HttpResponse {
    HttpResponse::Ok().json(extras_menu())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{configure, test_support};
    use crate::store::MemoryStore;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::json;
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_flavor_tables_are_separate() {
        let app = test::init_service(
            App::new()
                .app_data(test_support::state(Arc::new(MemoryStore::new())))
                .service(web::scope("/api").configure(configure)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/flavors/esfiha")
            .set_json(json!({ "name": "Carne", "category": "tradicional", "price": 2.5 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = test::TestRequest::get().uri("/api/flavors/esfiha").to_request();
        let esfihas: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(esfihas.as_array().unwrap().len(), 1);
        assert_eq!(esfihas[0]["active"], true);

        let req = test::TestRequest::get().uri("/api/flavors/pizza").to_request();
        let pizzas: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert!(pizzas.as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_invalid_category_is_bad_request() {
        let app = test::init_service(
            App::new()
                .app_data(test_support::state(Arc::new(MemoryStore::new())))
                .service(web::scope("/api").configure(configure)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/flavors/pizza")
            .set_json(json!({ "name": "Havaiana", "category": "gourmet", "price": 30 }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }

    #[actix_web::test]
    async fn test_extras_menu() {
        let app = test::init_service(
            App::new()
                .app_data(test_support::state(Arc::new(MemoryStore::new())))
                .service(web::scope("/api").configure(configure)),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/extras").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body.as_array().unwrap().len(), 6);
        assert_eq!(body[0], json!({ "name": "Bacon", "price": 4.0 }));
    }
}
