use axum::{
    extract::{rejection::{JsonRejection, PathRejection}, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use service::enquiry::domain::{Enquiry, NewEnquiry};

use crate::errors::JsonApiError;
use crate::routes::auth::{CallerIdentity, ServerState};

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    #[serde(default)]
    pub status: String,
}

#[utoipa::path(
    post, path = "/customer/enquiries", tag = "enquiries",
    request_body = crate::openapi::NewEnquiryDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    Extension(caller): Extension<CallerIdentity>,
    payload: Result<Json<NewEnquiry>, JsonRejection>,
) -> Result<(StatusCode, Json<Enquiry>), JsonApiError> {
    let Json(input) = payload?;
    let created = state.enquiries.create_enquiry(caller.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/customer/enquiries", tag = "enquiries",
    responses((status = 200, description = "Caller's enquiries, newest first"), (status = 401, description = "Unauthorized"))
)]
pub async fn list_mine(
    State(state): State<ServerState>,
    Extension(caller): Extension<CallerIdentity>,
) -> Result<Json<Vec<Enquiry>>, JsonApiError> {
    Ok(Json(state.enquiries.list_for_user(caller.user_id).await?))
}

#[utoipa::path(
    get, path = "/admin/enquiries", tag = "enquiries",
    responses((status = 200, description = "All enquiries, newest first"), (status = 403, description = "Forbidden"))
)]
pub async fn list_all(State(state): State<ServerState>) -> Result<Json<Vec<Enquiry>>, JsonApiError> {
    Ok(Json(state.enquiries.list_all().await?))
}

#[utoipa::path(
    put, path = "/admin/enquiries/{id}", tag = "enquiries",
    params(("id" = Uuid, Path, description = "Enquiry id")),
    request_body = crate::openapi::StatusUpdateDoc,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Invalid status"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_status(
    State(state): State<ServerState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> Result<Json<Enquiry>, JsonApiError> {
    let Path(id) = id?;
    let Json(body) = payload?;
    Ok(Json(state.enquiries.update_status(id, &body.status).await?))
}
