use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../../templates/index.html");

/// Render the single-page UI.
pub fn index_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}
