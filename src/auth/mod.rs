use crate::state::AppState;
use axum::Router;

pub(crate) mod avatar;
mod dto;
pub mod handlers;
pub mod jwt;
pub(crate) mod password;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::user_routes())
        .merge(handlers::auth_routes())
}
