pub mod claims;
pub mod error;
pub mod jwt;
pub mod middleware;

pub use middleware::{require_auth, UserId};
