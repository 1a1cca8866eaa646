pub mod auth;
pub mod config;
pub mod context;
pub mod database;
pub mod entities;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use context::AppContext;
pub use routes::app;
