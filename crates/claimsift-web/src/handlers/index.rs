use axum::response::Html;

use crate::template;

pub async fn index() -> Html<&'static str> {
    template::index_page()
}
