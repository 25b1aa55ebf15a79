pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::{create_router, REQUEST_ID_HEADER};
pub use state::AppState;
