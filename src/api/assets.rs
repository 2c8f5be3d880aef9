//! Embedded static assets
//!
//! The stylesheet is compiled into the binary; in development a missing
//! embedded file falls back to the `static/` directory on disk.

use axum::{
    body::Body,
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use rust_embed::Embed;
use std::path::PathBuf;

#[derive(Embed)]
#[folder = "static"]
struct Assets;

/// Serve `/static/*path`
pub async fn serve_static(Path(path): Path<String>) -> Response {
    let path = path.trim_start_matches('/');

    if let Some(content) = Assets::get(path) {
        return asset_response(path, content.data.into_owned());
    }

    // Never follow parent components out of the asset directory
    if path.split('/').any(|part| part == "..") {
        return StatusCode::NOT_FOUND.into_response();
    }

    let fs_path = PathBuf::from("static").join(path);
    match tokio::fs::read(&fs_path).await {
        Ok(content) => asset_response(path, content),
        Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

fn asset_response(path: &str, content: Vec<u8>) -> Response {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    (
        [(header::CONTENT_TYPE, mime.as_ref().to_string())],
        Body::from(content),
    )
        .into_response()
}
