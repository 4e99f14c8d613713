use axum::response::Html;
use tracing::info;

const INDEX_HTML: &str = include_str!("../../templates/index.html");

/// GET /
pub async fn handle_index() -> Html<&'static str> {
    info!("Accessing index page");
    Html(INDEX_HTML)
}
