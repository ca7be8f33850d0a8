use axum::{
    extract::Path,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::path::PathBuf;
use tokio_util::io::ReaderStream;

use crate::api::file_basename;

//ROUTERS
pub fn static_router() -> Router {
    Router::new()
        .route("/static/*path", get(serve_static))
        .route("/images/services/:file", get(serve_service_image))
}

pub(crate) fn static_root() -> String {
    std::env::var("STATIC_DIR").unwrap_or_else(|_| "./static".to_owned())
}

//ROUTES
async fn serve_static(Path(path): Path<String>) -> Response {
    // Reject empty, hidden, and traversal components outright.
    if path
        .split('/')
        .any(|part| part.is_empty() || part.starts_with('.'))
    {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Invalid path"})),
        )
            .into_response();
    }

    stream_file(PathBuf::from(static_root()).join(&path)).await
}

async fn serve_service_image(Path(file): Path<String>) -> Response {
    let file = file_basename(&file).to_owned();
    stream_file(PathBuf::from(static_root()).join("services").join(file)).await
}

async fn stream_file(path: PathBuf) -> Response {
    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(_) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"message": "Resource not found"})),
            )
                .into_response();
        }
    };

    let content_type = mime_guess::from_path(&path)
        .first_raw()
        .unwrap_or("application/octet-stream");

    let stream = ReaderStream::new(file);
    let body = axum::body::Body::from_stream(stream);

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(content_type)
            .unwrap_or(HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("inline"),
    );

    (headers, body).into_response()
}
