//! Service layer for the marketplace backend.
//! - Review recording, rating aggregation and enquiry completion (`review`).
//! - Catalog and enquiry stores the review workflow reads from.
//! - Repository traits with SeaORM implementations and an in-memory store.

pub mod errors;
pub mod catalog;
pub mod enquiry;
pub mod review;
pub mod storage;
