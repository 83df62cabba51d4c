use axum::response::IntoResponse;

pub const WELCOME_MESSAGE: &str = "Welcome to the Skin Analysis API";

pub async fn welcome() -> impl IntoResponse {
    WELCOME_MESSAGE
}
