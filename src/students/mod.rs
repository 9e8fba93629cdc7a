mod dto;
pub mod error;
pub mod handlers;
#[cfg(test)]
pub mod memory;
pub mod repo;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use repo::{PgStudentStore, StudentStore};
pub use services::StudentService;

pub fn router(state: &AppState) -> Router<AppState> {
    handlers::routes(state)
}
