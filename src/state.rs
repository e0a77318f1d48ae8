use crate::cart::CartStore;
use crate::storage::FileStorage;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub cart: Arc<Mutex<CartStore<FileStorage>>>,
}

impl AppState {
    pub fn new(cart: CartStore<FileStorage>) -> Self {
        Self {
            cart: Arc::new(Mutex::new(cart)),
        }
    }
}
