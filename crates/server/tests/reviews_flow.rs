use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use server::routes::auth::{Claims, Role};

const SECRET: &str = "test-secret";

fn token(user_id: Uuid, role: Role) -> String {
    let exp = (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as usize;
    let claims = Claims { uid: user_id.to_string(), role, exp };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).expect("encode token")
}

async fn send(app: &Router, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        req = req.header("authorization", format!("Bearer {t}"));
    }
    let req = match body {
        Some(b) => req.header("content-type", "application/json").body(Body::from(b.to_string())),
        None => req.body(Body::empty()),
    }
    .expect("request");
    let res = app.clone().oneshot(req).await.expect("response");
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

struct Ctx {
    app: Router,
    customer: String,
    admin: String,
    service_id: String,
    enquiry_id: String,
}

/// Admin creates a two-line service, customer orders both lines.
async fn setup() -> Ctx {
    let (app, store) = server::in_memory_app(SECRET);
    let customer_id = Uuid::new_v4();
    store.insert_user(customer_id, "Priya", "9000000001").await;
    let customer = token(customer_id, Role::Customer);
    let admin = token(Uuid::new_v4(), Role::Admin);

    let (status, svc) = send(
        &app,
        "POST",
        "/admin/services",
        Some(&admin),
        Some(json!({
            "category": "Washing Machine",
            "title": "Washer repair",
            "subServices": [
                { "name": "Drum bearing", "price": 900.0 },
                { "name": "Drain pump", "price": 650.0 }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{svc}");
    let service_id = svc["id"].as_str().unwrap().to_string();

    let (status, enq) = send(
        &app,
        "POST",
        "/customer/enquiries",
        Some(&customer),
        Some(json!({
            "serviceType": "repair",
            "applianceType": "Washing Machine",
            "message": "drum noise",
            "address": "7 Residency Road",
            "city": "Bengaluru",
            "state": "KA",
            "pincode": "560025",
            "items": [
                { "serviceId": service_id, "subServiceId": format!("{service_id}-0"), "name": "Drum bearing", "price": 900.0 },
                { "serviceId": service_id, "subServiceId": format!("{service_id}-1"), "name": "Drain pump", "price": 650.0 }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{enq}");
    assert_eq!(enq["status"], "pending");
    let enquiry_id = enq["id"].as_str().unwrap().to_string();

    Ctx { app, customer, admin, service_id, enquiry_id }
}

impl Ctx {
    fn review(&self, index: usize, rating: Value) -> Value {
        json!({
            "serviceId": self.service_id,
            "subServiceId": format!("{}-{index}", self.service_id),
            "subServiceName": "line",
            "enquiryId": self.enquiry_id,
            "rating": rating,
            "comment": "tidy work"
        })
    }

    async fn complete(&self) {
        let uri = format!("/admin/enquiries/{}", self.enquiry_id);
        let (status, body) = send(&self.app, "PUT", &uri, Some(&self.admin), Some(json!({ "status": "completed" }))).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["status"], "completed");
    }

    async fn my_enquiry(&self) -> Value {
        let (_, list) = send(&self.app, "GET", "/customer/enquiries", Some(&self.customer), None).await;
        list.as_array().unwrap().iter().find(|e| e["id"] == self.enquiry_id.as_str()).cloned().unwrap()
    }
}

#[tokio::test]
async fn health_is_public() {
    let (app, _) = server::in_memory_app(SECRET);
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn review_requires_token() {
    let (app, _) = server::in_memory_app(SECRET);
    let (status, body) = send(&app, "POST", "/reviews", None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let (status, _) = send(&app, "POST", "/reviews", Some("not-a-jwt"), Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn cookie_token_is_accepted() {
    let (app, _) = server::in_memory_app(SECRET);
    let t = token(Uuid::new_v4(), Role::Customer);
    let req = Request::builder()
        .uri("/customer/enquiries")
        .header("cookie", format!("theme=dark; auth_token={t}"))
        .body(Body::empty())
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn admin_routes_reject_customers() {
    let ctx = setup().await;
    let (status, body) = send(&ctx.app, "GET", "/reviews", Some(&ctx.customer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Forbidden");
    let (status, _) = send(&ctx.app, "GET", "/admin/enquiries", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn review_before_completion_is_rejected() {
    let ctx = setup().await;
    let (status, body) = send(&ctx.app, "POST", "/reviews", Some(&ctx.customer), Some(ctx.review(0, json!(5)))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "only completed enquiries can be reviewed");
}

#[tokio::test]
async fn full_review_flow_updates_aggregates_and_completion() {
    let ctx = setup().await;
    ctx.complete().await;

    let (status, first) = send(&ctx.app, "POST", "/reviews", Some(&ctx.customer), Some(ctx.review(0, json!(5)))).await;
    assert_eq!(status, StatusCode::CREATED, "{first}");
    assert_eq!(first["rating"], 5);
    assert_eq!(first["subServiceId"], format!("{}-0", ctx.service_id));

    let (_, svc) = send(&ctx.app, "GET", &format!("/services/{}", ctx.service_id), None, None).await;
    assert_eq!(svc["subServices"][0]["rating"], 5.0);
    assert_eq!(svc["subServices"][0]["numReviews"], 1);
    assert_eq!(svc["subServices"][1]["numReviews"], 0);
    assert_eq!(ctx.my_enquiry().await["isReviewed"], false);

    let (status, dup) = send(&ctx.app, "POST", "/reviews", Some(&ctx.customer), Some(ctx.review(0, json!(1)))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(dup["message"], "already reviewed");

    let (status, _) = send(&ctx.app, "POST", "/reviews", Some(&ctx.customer), Some(ctx.review(1, json!(3)))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, svc) = send(&ctx.app, "GET", &format!("/services/{}", ctx.service_id), None, None).await;
    assert_eq!(svc["subServices"][1]["rating"], 3.0);
    assert_eq!(ctx.my_enquiry().await["isReviewed"], true);

    let (status, listed) = send(&ctx.app, "GET", &format!("/reviews/{}-0", ctx.service_id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["reviewerName"], "Priya");
    assert_eq!(listed[0]["comment"], "tidy work");

    let (status, all) = send(&ctx.app, "GET", "/reviews", Some(&ctx.admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0]["service"]["title"], "Washer repair");
    assert_eq!(all[0]["user"]["phone"], "9000000001");
}

#[tokio::test]
async fn invalid_ratings_are_validation_errors() {
    let ctx = setup().await;
    ctx.complete().await;
    for bad in [json!(4.5), json!(0), json!(6), Value::Null] {
        let (status, body) = send(&ctx.app, "POST", "/reviews", Some(&ctx.customer), Some(ctx.review(0, bad.clone()))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "rating {bad}");
        assert_eq!(body["error"], "Validation Error");
    }
}

#[tokio::test]
async fn foreign_enquiry_is_not_found() {
    let ctx = setup().await;
    ctx.complete().await;
    let stranger = token(Uuid::new_v4(), Role::Customer);
    let (status, body) = send(&ctx.app, "POST", "/reviews", Some(&stranger), Some(ctx.review(0, json!(4)))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "enquiry not found or unauthorized");
}

#[tokio::test]
async fn bad_status_and_missing_enquiry() {
    let ctx = setup().await;
    let uri = format!("/admin/enquiries/{}", ctx.enquiry_id);
    let (status, _) = send(&ctx.app, "PUT", &uri, Some(&ctx.admin), Some(json!({ "status": "done" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let uri = format!("/admin/enquiries/{}", Uuid::new_v4());
    let (status, _) = send(&ctx.app, "PUT", &uri, Some(&ctx.admin), Some(json!({ "status": "cancelled" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&ctx.app, "GET", "/services/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn metrics_expose_review_counters() {
    let ctx = setup().await;
    ctx.complete().await;
    let (status, _) = send(&ctx.app, "POST", "/reviews", Some(&ctx.customer), Some(ctx.review(0, json!(4)))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send(&ctx.app, "GET", "/metrics", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_str().unwrap().contains("servicedesk_reviews_created_total"));
}
