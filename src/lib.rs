mod annotate;
mod detection;
mod inference;
mod pipeline;
mod routes;
mod server;

pub mod app;
pub mod config;

pub use app::start_app;
