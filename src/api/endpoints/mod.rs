//! Endpoint handlers, one module per resource.

pub mod audit;
pub mod compliance;
pub mod documents;
pub mod health;
