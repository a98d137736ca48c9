use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::SignedCookieJar;
use serde_json::{json, Value};
use tracing::info;

use crate::error::AppError;
use crate::models::Credentials;
use crate::services::accounts::{self, Session};
use crate::validate::ValidJson;
use crate::AppState;

pub async fn register(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    ValidJson(req): ValidJson<Credentials>,
) -> Result<(StatusCode, SignedCookieJar, Json<Value>), AppError> {
    let session = {
        let state = state.clone();
        run_blocking(move || accounts::register(&state.db, &state.tokens, &req.email, &req.password))
            .await?
    };

    let jar = state.cookies.attach(jar, session.token);
    Ok((StatusCode::CREATED, jar, Json(json!({ "user": session.user }))))
}

pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    ValidJson(req): ValidJson<Credentials>,
) -> Result<(SignedCookieJar, Json<Value>), AppError> {
    let session = {
        let state = state.clone();
        run_blocking(move || accounts::login(&state.db, &state.tokens, &req.email, &req.password))
            .await?
    };

    let jar = state.cookies.attach(jar, session.token);
    Ok((jar, Json(json!({ "user": session.user }))))
}

pub async fn logout(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> (SignedCookieJar, Json<Value>) {
    info!("User logged out");
    (
        state.cookies.clear(jar),
        Json(json!({ "message": "Logged out successfully" })),
    )
}

/// Password hashing is CPU-bound; keep it off the async workers.
async fn run_blocking<F>(f: F) -> Result<Session, AppError>
where
    F: FnOnce() -> Result<Session, AppError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(format!("account task failed: {e}")))?
}
