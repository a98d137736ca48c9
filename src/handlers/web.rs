use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};

use crate::assets::{APP_JS, INDEX_HTML};
use crate::error::AppError;
use crate::AppState;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(inject_api_prefix(INDEX_HTML, &state.api_prefix))
}

pub async fn static_file(Path(path): Path<String>) -> Response {
    match path.as_str() {
        "app.js" => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/javascript")],
            APP_JS,
        )
            .into_response(),
        _ => AppError::NotFound("File").into_response(),
    }
}

pub async fn fallback() -> AppError {
    AppError::NotFound("Route")
}

fn inject_api_prefix(html: &str, api_prefix: &str) -> String {
    let script = format!(r#"<script>window.API_PREFIX = "{}";</script>"#, api_prefix);
    html.replace("<head>", &format!("<head>\n    {}", script))
}
