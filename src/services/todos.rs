use rusqlite::TransactionBehavior;
use tracing::info;
use uuid::Uuid;

use crate::db::{self, DbPool};
use crate::error::AppError;
use crate::models::{Todo, UpdateTodo};
use crate::token::Identity;

/// Ownership guard for operations on a specific todo. Existence is checked
/// before ownership, so a missing id is `NotFound` even for a stranger.
pub fn authorize(caller: &Identity, todo: Option<&Todo>) -> Result<(), AppError> {
    let todo = todo.ok_or(AppError::NotFound("Todo"))?;
    if todo.user_id != caller.id {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn list(pool: &DbPool, caller: &Identity) -> Result<Vec<Todo>, AppError> {
    let conn = db::connect(pool)?;
    db::list_todos(&conn, caller.id)
}

pub fn get(pool: &DbPool, caller: &Identity, id: Uuid) -> Result<Todo, AppError> {
    let conn = db::connect(pool)?;
    let todo = db::get_todo(&conn, id)?;
    authorize(caller, todo.as_ref())?;
    todo.ok_or(AppError::NotFound("Todo"))
}

/// Appends at the caller's tail. Reading the current maximum and inserting
/// happen in one IMMEDIATE transaction so concurrent creates cannot share a
/// position.
pub fn create(pool: &DbPool, caller: &Identity, text: &str) -> Result<Todo, AppError> {
    let mut conn = db::connect(pool)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let position = db::next_position(&tx, caller.id)?;
    let todo = db::insert_todo(&tx, caller.id, text, position)?;
    tx.commit()?;

    info!(id = %todo.id, user_id = %caller.id, position, "created todo");
    Ok(todo)
}

pub fn update(
    pool: &DbPool,
    caller: &Identity,
    id: Uuid,
    changes: &UpdateTodo,
) -> Result<Todo, AppError> {
    let mut conn = db::connect(pool)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    authorize(caller, db::get_todo(&tx, id)?.as_ref())?;
    let todo = db::update_todo(&tx, id, changes)?;
    tx.commit()?;

    info!(id = %todo.id, completed = todo.completed, position = todo.position, "updated todo");
    Ok(todo)
}

pub fn delete(pool: &DbPool, caller: &Identity, id: Uuid) -> Result<(), AppError> {
    let mut conn = db::connect(pool)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    authorize(caller, db::get_todo(&tx, id)?.as_ref())?;
    if !db::delete_todo(&tx, id)? {
        return Err(AppError::NotFound("Todo"));
    }
    tx.commit()?;

    info!(%id, "deleted todo");
    Ok(())
}
