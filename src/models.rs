use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validate::{is_email, Errors, FieldError, Validate};

pub const MAX_TEXT_LEN: usize = 500;
pub const MIN_PASSWORD_LEN: usize = 8;
/// Highest position a todo may hold, so the next tail position always fits.
pub const MAX_POSITION: i64 = i32::MAX as i64;

/// Account as returned to callers. The password hash never leaves `db`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub completed: bool,
    pub position: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Clone, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Validate for Credentials {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Errors::default();
        errors.check(is_email(&self.email), "email", "Invalid email address");
        errors.check(
            self.password.chars().count() >= MIN_PASSWORD_LEN,
            "password",
            "Password must be at least 8 characters long",
        );
        errors.finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTodo {
    #[serde(default)]
    pub text: String,
}

impl Validate for CreateTodo {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Errors::default();
        check_text(&mut errors, &self.text);
        errors.finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTodo {
    pub text: Option<String>,
    pub completed: Option<bool>,
    pub position: Option<i64>,
}

impl UpdateTodo {
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.completed.is_none() && self.position.is_none()
    }
}

impl Validate for UpdateTodo {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Errors::default();
        errors.check(!self.is_empty(), "body", "At least one field must be provided");
        if let Some(text) = &self.text {
            check_text(&mut errors, text);
        }
        if let Some(position) = self.position {
            errors.check(position >= 0, "position", "Position must be a non-negative integer");
            errors.check(
                position <= MAX_POSITION,
                "position",
                "Position must not exceed 2147483647",
            );
        }
        errors.finish()
    }
}

fn check_text(errors: &mut Errors, text: &str) {
    errors.check(
        !text.trim().is_empty(),
        "text",
        "Text must be at least 1 character long",
    );
    errors.check(
        text.chars().count() <= MAX_TEXT_LEN,
        "text",
        "Text must not exceed 500 characters",
    );
}
