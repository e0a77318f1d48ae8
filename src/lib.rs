pub mod app;
pub mod cart;
pub mod catalog;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod price;
pub mod storage;
pub mod ui;
pub mod state;

pub use app::router;
pub use cart::CartStore;
pub use state::AppState;
pub use storage::{resolve_data_path, FileStorage, MemoryStorage, Storage};
