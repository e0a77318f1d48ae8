use crate::handlers;
use crate::state::AppState;
use axum::{routing::{delete, get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/cart/add", post(handlers::form_add))
        .route("/cart/remove/:index", post(handlers::form_remove))
        .route("/api/cart", get(handlers::get_cart))
        .route("/api/cart/count", get(handlers::get_count))
        .route("/api/cart/items", post(handlers::add_item))
        .route("/api/cart/items/:index", delete(handlers::remove_item))
        .route("/api/catalog", get(handlers::get_catalog))
        .with_state(state)
}
