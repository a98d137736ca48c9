use tracing::info;

use crate::auth::{hash_password, verify_against_dummy, verify_password};
use crate::db::{self, DbPool};
use crate::error::AppError;
use crate::models::User;
use crate::token::{Identity, TokenCodec, TokenError};

/// A freshly authenticated account and the token to hand to the client.
#[derive(Debug)]
pub struct Session {
    pub user: User,
    pub token: String,
}

pub fn register(
    pool: &DbPool,
    codec: &TokenCodec,
    email: &str,
    password: &str,
) -> Result<Session, AppError> {
    let password_hash =
        hash_password(password).map_err(|e| AppError::Internal(format!("hashing failed: {e}")))?;

    let user = {
        let conn = db::connect(pool)?;
        db::insert_user(&conn, email, &password_hash)?
    };
    info!(user_id = %user.id, "registered account");

    issue_session(codec, user)
}

/// Unknown email and wrong password fail identically.
pub fn login(
    pool: &DbPool,
    codec: &TokenCodec,
    email: &str,
    password: &str,
) -> Result<Session, AppError> {
    let record = {
        let conn = db::connect(pool)?;
        db::find_user_by_email(&conn, email)?
    };

    let Some(record) = record else {
        verify_against_dummy(password);
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(password, &record.password_hash) {
        return Err(AppError::InvalidCredentials);
    }
    info!(user_id = %record.user.id, "logged in");

    issue_session(codec, record.user)
}

fn issue_session(codec: &TokenCodec, user: User) -> Result<Session, AppError> {
    let identity = Identity {
        id: user.id,
        email: user.email.clone(),
    };
    let token = codec.issue(&identity).map_err(|e| match e {
        TokenError::Signing(msg) => AppError::Internal(msg),
        TokenError::InvalidToken => AppError::Internal("token issuance failed".to_string()),
    })?;

    Ok(Session { user, token })
}
