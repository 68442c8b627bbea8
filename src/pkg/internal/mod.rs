pub mod adaptors;
pub mod auth;
pub mod details;
pub mod lifecycle;
pub mod listing;
pub mod questions;
pub mod store;
pub mod validation;
