pub mod auth;
pub mod cli;
pub mod config;
pub mod context;
pub mod database;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use routes::app;

#[cfg(test)]
pub mod testing;
