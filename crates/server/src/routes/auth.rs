use std::sync::Arc;

use axum::{extract::{Request, State}, middleware::Next, response::Response};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use service::catalog::{repo::seaorm::SeaOrmCatalogRepository, repository::CatalogRepository, CatalogService};
use service::enquiry::{repo::seaorm::SeaOrmEnquiryRepository, repository::EnquiryRepository, EnquiryService};
use service::review::{repo::seaorm::SeaOrmReviewRepository, repository::ReviewRepository, ReviewService};
use service::storage::MemoryStore;

use crate::errors::JsonApiError;

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
}

/// Shared handler state. Services sit behind trait objects so the same
/// router runs on Postgres or on the in-memory store.
#[derive(Clone)]
pub struct ServerState {
    pub auth: ServerAuthConfig,
    pub reviews: Arc<ReviewService<dyn ReviewRepository>>,
    pub catalog: Arc<CatalogService<dyn CatalogRepository>>,
    pub enquiries: Arc<EnquiryService<dyn EnquiryRepository>>,
}

impl ServerState {
    pub fn seaorm(db: DatabaseConnection, auth: ServerAuthConfig) -> Self {
        let reviews: Arc<dyn ReviewRepository> = Arc::new(SeaOrmReviewRepository { db: db.clone() });
        let catalog: Arc<dyn CatalogRepository> = Arc::new(SeaOrmCatalogRepository { db: db.clone() });
        let enquiries: Arc<dyn EnquiryRepository> = Arc::new(SeaOrmEnquiryRepository { db });
        Self::from_repos(auth, reviews, catalog, enquiries)
    }

    pub fn in_memory(store: Arc<MemoryStore>, auth: ServerAuthConfig) -> Self {
        let reviews: Arc<dyn ReviewRepository> = store.clone();
        let catalog: Arc<dyn CatalogRepository> = store.clone();
        let enquiries: Arc<dyn EnquiryRepository> = store;
        Self::from_repos(auth, reviews, catalog, enquiries)
    }

    fn from_repos(
        auth: ServerAuthConfig,
        reviews: Arc<dyn ReviewRepository>,
        catalog: Arc<dyn CatalogRepository>,
        enquiries: Arc<dyn EnquiryRepository>,
    ) -> Self {
        Self {
            auth,
            reviews: Arc::new(ReviewService::new(reviews)),
            catalog: Arc::new(CatalogService::new(catalog)),
            enquiries: Arc::new(EnquiryService::new(enquiries)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Technician,
    Admin,
}

/// Token claims. Tokens are minted by the login flow elsewhere.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub uid: String,
    pub role: Role,
    pub exp: usize,
}

/// Verified caller, stored in request extensions by `require_bearer_token_state`.
#[derive(Debug, Clone, Copy)]
pub struct CallerIdentity {
    pub user_id: Uuid,
    pub role: Role,
}

impl CallerIdentity {
    pub fn is_admin(&self) -> bool { self.role == Role::Admin }
}

fn bearer_or_cookie(req: &Request) -> Result<Option<String>, JsonApiError> {
    let authz = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if let Some(h) = authz {
        let Some(token) = h.strip_prefix("Bearer ") else {
            tracing::warn!(path = %req.uri().path(), "invalid Authorization format (expect Bearer)");
            return Err(JsonApiError::unauthorized("invalid authorization header"));
        };
        return Ok(Some(token.trim().to_string()));
    }

    // Cookie 回退：读取 auth_token
    let jar = CookieJar::from_headers(req.headers());
    Ok(jar
        .get("auth_token")
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty()))
}

/// 校验 Authorization: Bearer <token>（或 auth_token cookie）
/// 缺失、非法或过期均返回 401
pub async fn require_bearer_token_state(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let Some(token) = bearer_or_cookie(&req)? else {
        tracing::warn!(path = %req.uri().path(), "missing Authorization header and auth_token cookie");
        return Err(JsonApiError::unauthorized("authentication required"));
    };

    let key = DecodingKey::from_secret(state.auth.jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let claims = match decode::<Claims>(&token, &key, &validation) {
        Ok(data) => data.claims,
        Err(e) => {
            tracing::warn!(path = %req.uri().path(), err = %e, "token validation failed");
            return Err(JsonApiError::unauthorized("invalid or expired token"));
        }
    };
    let user_id = Uuid::parse_str(&claims.uid).map_err(|_| JsonApiError::unauthorized("invalid token subject"))?;

    req.extensions_mut().insert(CallerIdentity { user_id, role: claims.role });
    Ok(next.run(req).await)
}

/// Runs after `require_bearer_token_state`; rejects non-admin callers.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, JsonApiError> {
    match req.extensions().get::<CallerIdentity>() {
        Some(caller) if caller.is_admin() => Ok(next.run(req).await),
        Some(caller) => {
            tracing::warn!(user_id = %caller.user_id, path = %req.uri().path(), "admin route denied");
            Err(JsonApiError::forbidden("admin access required"))
        }
        None => Err(JsonApiError::unauthorized("authentication required")),
    }
}
