use axum::{
    extract::{rejection::{JsonRejection, PathRejection}, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use service::catalog::domain::{CatalogEntry, NewCatalogEntry};

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

#[utoipa::path(
    get, path = "/services", tag = "catalog",
    responses((status = 200, description = "Active services, newest first"))
)]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<CatalogEntry>>, JsonApiError> {
    Ok(Json(state.catalog.list_active().await?))
}

#[utoipa::path(
    get, path = "/services/{id}", tag = "catalog",
    params(("id" = Uuid, Path, description = "Catalog service id")),
    responses(
        (status = 200, description = "Service with its sub-services"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get(
    State(state): State<ServerState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<CatalogEntry>, JsonApiError> {
    let Path(id) = id?;
    Ok(Json(state.catalog.get_service(id).await?))
}

#[utoipa::path(
    post, path = "/admin/services", tag = "catalog",
    request_body = crate::openapi::NewCatalogEntryDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error"),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<NewCatalogEntry>, JsonRejection>,
) -> Result<(StatusCode, Json<CatalogEntry>), JsonApiError> {
    let Json(input) = payload?;
    let created = state.catalog.create_service(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
