//! Catalog of bookable services and their ordered sub-services.

pub mod domain;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::CatalogService;
