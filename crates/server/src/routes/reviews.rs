use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::info;

use service::review::domain::{AdminReview, NewReview, Review, ReviewWithReviewer};

use crate::errors::JsonApiError;
use crate::routes::auth::{CallerIdentity, ServerState};

#[utoipa::path(
    post, path = "/reviews", tag = "reviews",
    request_body = crate::openapi::NewReviewDoc,
    responses(
        (status = 201, description = "Review recorded", body = crate::openapi::ReviewDoc),
        (status = 400, description = "Validation error, enquiry not completed, or already reviewed"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Enquiry not found or unauthorized"),
        (status = 500, description = "Failed to submit review")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    Extension(caller): Extension<CallerIdentity>,
    payload: Result<Json<NewReview>, JsonRejection>,
) -> Result<(StatusCode, Json<Review>), JsonApiError> {
    let Json(input) = payload?;
    let review = state
        .reviews
        .submit(caller.user_id, input)
        .await
        .map_err(|e| JsonApiError::from_review(e, "failed to submit review"))?;
    info!(review_id = %review.id, user_id = %caller.user_id, "review_submitted");
    Ok((StatusCode::CREATED, Json(review)))
}

#[utoipa::path(
    get, path = "/reviews/{subServiceId}", tag = "reviews",
    params(("subServiceId" = String, Path, description = "Sub-service identifier as stored on the review")),
    responses(
        (status = 200, description = "Reviews, newest first", body = [crate::openapi::ReviewDoc]),
        (status = 500, description = "Failed to fetch reviews")
    )
)]
pub async fn list_for_sub_service(
    State(state): State<ServerState>,
    Path(sub_service_id): Path<String>,
) -> Result<Json<Vec<ReviewWithReviewer>>, JsonApiError> {
    let reviews = state
        .reviews
        .list_for_sub_service(&sub_service_id)
        .await
        .map_err(|e| JsonApiError::from_review(e, "failed to fetch reviews"))?;
    Ok(Json(reviews))
}

#[utoipa::path(
    get, path = "/reviews", tag = "reviews",
    responses(
        (status = 200, description = "All reviews with user and service summaries"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn list_all(State(state): State<ServerState>) -> Result<Json<Vec<AdminReview>>, JsonApiError> {
    let reviews = state
        .reviews
        .list_all()
        .await
        .map_err(|e| JsonApiError::from_review(e, "failed to fetch reviews"))?;
    Ok(Json(reviews))
}
