use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct NewReviewDoc {
    pub service_id: Uuid,
    /// `{serviceId}-{index}` or a persistent sub-service id
    pub sub_service_id: String,
    pub sub_service_name: String,
    pub enquiry_id: Uuid,
    /// Integer from 1 to 5
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ReviewDoc {
    pub id: Uuid,
    pub user_id: Uuid,
    pub service_id: Uuid,
    pub sub_service_id: String,
    pub sub_service_name: String,
    pub rating: i32,
    pub comment: Option<String>,
    pub enquiry_id: Uuid,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct NewSubServiceDoc {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub actual_price: Option<f64>,
    pub image_url: String,
    pub issues_resolved: Vec<String>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct NewCatalogEntryDoc {
    pub category: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub sub_services: Vec<NewSubServiceDoc>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct NewEnquiryItemDoc {
    pub service_id: Uuid,
    pub sub_service_id: String,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct NewEnquiryDoc {
    pub service_type: String,
    pub appliance_type: String,
    pub message: String,
    pub address: String,
    pub landmark: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub brand: Option<String>,
    pub items: Vec<NewEnquiryItemDoc>,
}

#[derive(ToSchema)]
pub struct StatusUpdateDoc {
    /// pending | in-progress | completed | cancelled
    pub status: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::reviews::create,
        crate::routes::reviews::list_for_sub_service,
        crate::routes::reviews::list_all,
        crate::routes::catalog::list,
        crate::routes::catalog::get,
        crate::routes::catalog::create,
        crate::routes::enquiries::create,
        crate::routes::enquiries::list_mine,
        crate::routes::enquiries::list_all,
        crate::routes::enquiries::update_status,
    ),
    components(
        schemas(
            HealthResponse,
            NewReviewDoc,
            ReviewDoc,
            NewSubServiceDoc,
            NewCatalogEntryDoc,
            NewEnquiryItemDoc,
            NewEnquiryDoc,
            StatusUpdateDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "reviews"),
        (name = "catalog"),
        (name = "enquiries")
    )
)]
pub struct ApiDoc;
