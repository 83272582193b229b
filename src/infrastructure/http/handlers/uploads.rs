//! Static serving of uploaded files

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::warn;
use warp::http::StatusCode;

use crate::middleware::security_headers::{add_security_headers_to_response, SecurityHeadersMiddleware};

/// Resolve a request tail below `root`. Only plain file names and
/// directory names are accepted; anything that could leave `root` is refused.
pub fn resolve_upload_path(root: &Path, tail: &str) -> Option<PathBuf> {
    let mut path = root.to_path_buf();
    let mut segments = 0;
    for segment in tail.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
            return None;
        }
        path.push(segment);
        segments += 1;
    }
    (segments > 0).then_some(path)
}

fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// `GET /uploads/{path}`
pub async fn handle_upload_request(
    tail: warp::path::Tail,
    root: Arc<PathBuf>,
    security_headers: Arc<SecurityHeadersMiddleware>,
) -> Result<warp::reply::Response, warp::Rejection> {
    let Some(path) = resolve_upload_path(&root, tail.as_str()) else {
        return Err(warp::reject::not_found());
    };

    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(add_security_headers_to_response(
            warp::reply::with_header(
                warp::reply::with_status(bytes, StatusCode::OK),
                "Content-Type",
                content_type_for(&path),
            ),
            &security_headers,
        )),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(warp::reject::not_found()),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read uploaded file");
            Err(warp::reject::not_found())
        }
    }
}
