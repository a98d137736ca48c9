use axum::extract::{Path, State};
use axum::{http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::info;

use crate::error::AppError;
use crate::models::{CreateTodo, UpdateTodo};
use crate::services::todos;
use crate::token::Identity;
use crate::validate::{parse_id, ValidJson};
use crate::AppState;

pub async fn list_todos(
    caller: Identity,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let todos = todos::list(&state.db, &caller)?;
    info!(count = todos.len(), user_id = %caller.id, "Listed todos");
    Ok(Json(json!({ "todos": todos })))
}

pub async fn create_todo(
    caller: Identity,
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CreateTodo>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let todo = todos::create(&state.db, &caller, &req.text)?;
    Ok((StatusCode::CREATED, Json(json!({ "todo": todo }))))
}

pub async fn get_todo(
    caller: Identity,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let todo = todos::get(&state.db, &caller, parse_id(&id)?)?;
    Ok(Json(json!({ "todo": todo })))
}

pub async fn update_todo(
    caller: Identity,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<UpdateTodo>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&id)?;
    let todo = todos::update(&state.db, &caller, id, &req)?;
    Ok(Json(json!({ "todo": todo })))
}

pub async fn delete_todo(
    caller: Identity,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    todos::delete(&state.db, &caller, parse_id(&id)?)?;
    Ok(StatusCode::NO_CONTENT)
}
