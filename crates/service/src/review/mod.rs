//! Review core: recording a rating, recomputing the sub-service aggregate,
//! resolving sub-service identifiers and tracking enquiry completion.
//!
//! Same three-layer split as the rest of the crate (domain, repository,
//! service), with a SeaORM repository under `repo`.

pub mod domain;
pub mod errors;
pub mod identifier;
pub mod metrics;
pub mod repository;
pub mod service;
pub mod repo;

pub use identifier::SubServiceRef;
pub use service::ReviewService;
