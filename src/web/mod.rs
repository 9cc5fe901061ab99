pub mod api;
pub mod api_doc;
pub mod server;
pub mod state;

pub use server::{router, run_server};
pub use state::AppState;
