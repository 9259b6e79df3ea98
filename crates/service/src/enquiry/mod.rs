//! Customer enquiries (orders) and their purchased items.

pub mod domain;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::EnquiryService;
