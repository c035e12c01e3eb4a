use crate::state::AppState;
use axum::Router;

mod dto;
pub(crate) mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;

pub use extractors::{ensure_correct_user, MaybePrincipal, Principal};

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
