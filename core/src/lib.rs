pub mod api;
pub mod config;
pub mod context;
pub mod errors;
pub mod executor;
pub mod results;
pub mod suite;

pub use context::AppContext;
