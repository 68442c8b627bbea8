pub mod applications;
pub mod comments;
pub mod listings;
pub mod profiles;
pub mod sessions;
