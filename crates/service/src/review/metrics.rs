use once_cell::sync::Lazy;
use prometheus::{register_int_counter, IntCounter};

pub static REVIEWS_CREATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "servicedesk_reviews_created_total",
        "Reviews persisted"
    )
    .expect("register servicedesk_reviews_created_total")
});

pub static DUPLICATE_REVIEWS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "servicedesk_duplicate_reviews_total",
        "Review submissions rejected as already reviewed"
    )
    .expect("register servicedesk_duplicate_reviews_total")
});

pub static UNRESOLVED_SUB_SERVICE_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "servicedesk_unresolved_sub_service_total",
        "Aggregate writes skipped because the sub-service identifier did not resolve"
    )
    .expect("register servicedesk_unresolved_sub_service_total")
});
