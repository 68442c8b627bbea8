pub mod applications;
pub mod auth;
pub mod comments;
pub mod listings;
pub mod probes;
pub mod profiles;
