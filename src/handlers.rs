use crate::cart::CartStore;
use crate::catalog::{CatalogProduct, CATALOG};
use crate::errors::{AppError, CartError};
use crate::models::{AddItemResponse, CartSummary, ItemCountResponse, ProductRef};
use crate::state::AppState;
use crate::storage::FileStorage;
use crate::ui::render_index;
use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form, Json,
};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let cart = state.cart.lock().await;
    Html(render_index(CATALOG, &cart.summary()))
}

pub async fn get_cart(State(state): State<AppState>) -> Json<CartSummary> {
    let cart = state.cart.lock().await;
    Json(cart.summary())
}

pub async fn get_count(State(state): State<AppState>) -> Json<ItemCountResponse> {
    let cart = state.cart.lock().await;
    Json(ItemCountResponse {
        item_count: cart.item_count(),
    })
}

pub async fn get_catalog() -> Json<&'static [CatalogProduct]> {
    Json(CATALOG)
}

pub async fn add_item(
    State(state): State<AppState>,
    Json(payload): Json<ProductRef>,
) -> Result<Json<AddItemResponse>, AppError> {
    let response = apply_add(&state, payload).await?;
    Ok(Json(response))
}

pub async fn remove_item(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<CartSummary>, AppError> {
    let summary = mutate_cart(&state, move |cart| {
        cart.remove_item(index)?;
        Ok(cart.summary())
    })
    .await?;
    Ok(Json(summary))
}

pub async fn form_add(
    State(state): State<AppState>,
    Form(payload): Form<ProductRef>,
) -> Result<Redirect, AppError> {
    apply_add(&state, payload).await?;
    Ok(Redirect::to("/"))
}

pub async fn form_remove(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Redirect, AppError> {
    mutate_cart(&state, move |cart| cart.remove_item(index)).await?;
    Ok(Redirect::to("/"))
}

async fn apply_add(state: &AppState, payload: ProductRef) -> Result<AddItemResponse, AppError> {
    let product = payload.parse().map_err(CartError::from)?;

    mutate_cart(state, move |cart| {
        let notification = cart.add_item(product)?;
        Ok(AddItemResponse {
            notification,
            summary: cart.summary(),
        })
    })
    .await
}

// Mutations hit the filesystem, so they run on the blocking pool with the
// cart lock held for the whole read-modify-persist cycle.
async fn mutate_cart<T, F>(state: &AppState, f: F) -> Result<T, AppError>
where
    F: FnOnce(&mut CartStore<FileStorage>) -> Result<T, CartError> + Send + 'static,
    T: Send + 'static,
{
    let mut cart = state.cart.clone().lock_owned().await;
    let result = tokio::task::spawn_blocking(move || f(&mut *cart))
        .await
        .map_err(AppError::internal)?;
    Ok(result?)
}
