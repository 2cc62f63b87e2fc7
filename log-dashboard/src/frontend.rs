//! Dashboard page serving
//!
//! The page, its script and stylesheet are embedded at compile time from
//! `frontend/dist`, so the binary has no runtime file dependencies.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use include_dir::{include_dir, Dir};
use std::sync::Arc;

static FRONTEND_DISTRIBUTION: Dir = include_dir!("$CARGO_MANIFEST_DIR/frontend/dist");

const HTML: &str = "text/html; charset=utf-8";

/// Mount point of the dashboard, used to build the page's `<base href>`
#[derive(Clone)]
pub struct FrontendState {
    pub base_path: Arc<str>,
}

impl FrontendState {
    pub fn new(base_path: &str) -> Self {
        Self {
            base_path: Arc::from(base_path.trim_end_matches('/')),
        }
    }
}

/// Router serving the dashboard page
///
/// - GET / -> index.html with an injected `<base href>`
/// - GET /assets/* -> script, stylesheet and images
pub fn create_frontend_router(base_path: &str) -> Router {
    Router::new()
        .route("/", get(serve_index_page))
        .route("/assets/{*path}", get(serve_static_asset))
        .with_state(FrontendState::new(base_path))
}

/// The page calls the API with relative URLs, so the base tag is what makes
/// it work under any mount point
async fn serve_index_page(State(state): State<FrontendState>) -> Response {
    let Some(file) = FRONTEND_DISTRIBUTION.get_file("index.html") else {
        return serve_fallback_page();
    };

    let contents = inject_base_href(&String::from_utf8_lossy(file.contents()), &state.base_path);

    (
        [(header::CONTENT_TYPE, HTML), (header::CACHE_CONTROL, "no-cache")],
        contents,
    )
        .into_response()
}

fn inject_base_href(page: &str, base_path: &str) -> String {
    let mut contents = page.to_string();
    if let Some(head_position) = contents.find("<head>") {
        let base_tag = format!("\n    <base href=\"{}/\">", base_path);
        contents.insert_str(head_position + "<head>".len(), &base_tag);
    }
    contents
}

async fn serve_static_asset(Path(path): Path<String>) -> Response {
    let asset_path = format!("assets/{}", path);

    match FRONTEND_DISTRIBUTION.get_file(&asset_path) {
        Some(file) => {
            let mime_type = mime_guess::from_path(&asset_path).first_or_octet_stream().to_string();
            (
                [
                    (header::CONTENT_TYPE, mime_type),
                    (header::CACHE_CONTROL, "public, max-age=3600".to_string()),
                ],
                file.contents(),
            )
                .into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("Asset not found: {}", asset_path),
        )
            .into_response(),
    }
}

/// Shown when the crate was packaged without `frontend/dist/index.html`
fn serve_fallback_page() -> Response {
    let html = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Log Dashboard</title>
</head>
<body>
    <h1>Log Dashboard</h1>
    <p>The dashboard page is missing from this build. The API is still available:</p>
    <ul>
        <li><code>GET /api/data?page=1&amp;limit=50</code></li>
        <li><code>GET /api/data/search?q=term</code></li>
        <li><code>GET /api/data/stats</code></li>
        <li><code>GET /api/data/{id}</code></li>
        <li><code>GET /api/health</code></li>
    </ul>
</body>
</html>
"#;

    ([(header::CONTENT_TYPE, HTML), (header::CACHE_CONTROL, "no-cache")], html).into_response()
}
