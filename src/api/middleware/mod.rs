//! Request middleware: role authentication, then audit logging.

pub mod audit;
pub mod auth;
