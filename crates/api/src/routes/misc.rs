use axum::extract::OriginalUri;
use axum::http::{Method, StatusCode};
use axum::{routing::get, Json, Router};

use crate::response::Message;

pub fn misc_routes<T>() -> Router<T>
where
    T: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/test",
            get(|| async { Json(Message::new("Server is working!")) })
        )
}

pub async fn route_not_found(method: Method, OriginalUri(uri): OriginalUri) -> (StatusCode, Json<Message>) {
    tracing::debug!("[route_not_found] {} {}", method, uri);
    (
        StatusCode::NOT_FOUND,
        Json(Message::new(format!("Route not found: {} {}", method, uri.path()))),
    )
}
