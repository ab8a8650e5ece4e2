mod handlers;
pub mod models;
mod state;
mod translate;

pub use handlers::{build_router, run_server};
pub use state::ServerState;
pub use translate::ServerError;
