use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::SignedCookieJar;
use tracing::warn;

use crate::error::AppError;
use crate::token::Identity;
use crate::AppState;

/// Authentication gate for protected routes.
///
/// Reads the signed `token` cookie, verifies it, and stores the resulting
/// [`Identity`] in the request extensions. Anything else is a 401.
pub async fn require_auth(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = state.cookies.read(&jar) else {
        return Err(AppError::Unauthorized);
    };

    let identity = state.tokens.verify(&token).map_err(|_| {
        warn!("rejected invalid or expired token");
        AppError::Unauthorized
    })?;

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// Handlers behind [`require_auth`] take the caller as an `Identity` argument.
/// Used on a route without the gate, it rejects with 401.
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}
