//! SeaORM entities for the marketplace schema plus the small query helpers
//! the service layer builds on. Validation that belongs to a single column
//! (phone format, status names, categories) lives next to the entity.

pub mod errors;
pub mod db;
pub mod user;
pub mod catalog_service;
pub mod sub_service;
pub mod enquiry;
pub mod enquiry_item;
pub mod review;

#[cfg(test)]
mod tests;
