mod health;
mod predict;
mod welcome;

use crate::server::SharedState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(welcome::welcome))
        .route("/health", get(health::healthcheck))
        .route("/predict", post(predict::predict))
}
