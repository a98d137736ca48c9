use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{ffi, params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Todo, UpdateTodo, User, MAX_POSITION};

pub type DbPool = Arc<Mutex<Connection>>;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id BLOB PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
        updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
    );

    CREATE TABLE IF NOT EXISTS todos (
        id BLOB PRIMARY KEY,
        user_id BLOB NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        text TEXT NOT NULL,
        completed INTEGER NOT NULL DEFAULT 0,
        position INTEGER NOT NULL DEFAULT 0,
        created_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
        updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
    );

    CREATE INDEX IF NOT EXISTS todos_user_position ON todos (user_id, position);
";

const TODO_COLUMNS: &str = "id, user_id, text, completed, position, created_at, updated_at";

/// Opens (or creates) the database at `path` and applies the schema.
/// `:memory:` gives a private in-memory database.
pub fn init_db(path: &str) -> rusqlite::Result<DbPool> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.execute_batch(SCHEMA)?;
    Ok(Arc::new(Mutex::new(conn)))
}

pub fn connect(pool: &DbPool) -> Result<MutexGuard<'_, Connection>, AppError> {
    pool.lock()
        .map_err(|_| AppError::Internal("database connection poisoned".to_string()))
}

pub struct UserRecord {
    pub user: User,
    pub password_hash: String,
}

// User operations
pub fn insert_user(conn: &Connection, email: &str, password_hash: &str) -> Result<User, AppError> {
    let id = Uuid::new_v4();
    match conn.execute(
        "INSERT INTO users (id, email, password_hash) VALUES (?1, ?2, ?3)",
        params![id, email, password_hash],
    ) {
        Ok(_) => Ok(User {
            id,
            email: email.to_string(),
        }),
        Err(err) if is_unique_violation(&err) => Err(AppError::EmailAlreadyExists),
        Err(err) => Err(err.into()),
    }
}

pub fn find_user_by_email(conn: &Connection, email: &str) -> Result<Option<UserRecord>, AppError> {
    let record = conn
        .query_row(
            "SELECT id, email, password_hash FROM users WHERE email = ?1",
            [email],
            |row| {
                Ok(UserRecord {
                    user: User {
                        id: row.get(0)?,
                        email: row.get(1)?,
                    },
                    password_hash: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(record)
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

// Todo operations
fn todo_from_row(row: &Row<'_>) -> rusqlite::Result<Todo> {
    Ok(Todo {
        id: row.get(0)?,
        user_id: row.get(1)?,
        text: row.get(2)?,
        completed: row.get(3)?,
        position: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

pub fn list_todos(conn: &Connection, user_id: Uuid) -> Result<Vec<Todo>, AppError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TODO_COLUMNS} FROM todos WHERE user_id = ?1 ORDER BY position ASC, created_at ASC"
    ))?;
    let todos = stmt
        .query_map([user_id], todo_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(todos)
}

pub fn get_todo(conn: &Connection, id: Uuid) -> Result<Option<Todo>, AppError> {
    let todo = conn
        .query_row(
            &format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = ?1"),
            [id],
            todo_from_row,
        )
        .optional()?;
    Ok(todo)
}

/// Next free tail position for `user_id`: one past the current maximum, or 0.
/// Fails with `PositionLimitReached` once the tail sits at `MAX_POSITION`.
pub fn next_position(conn: &Connection, user_id: Uuid) -> Result<i64, AppError> {
    let max: Option<i64> = conn.query_row(
        "SELECT MAX(position) FROM todos WHERE user_id = ?1",
        [user_id],
        |row| row.get(0),
    )?;

    match max {
        None => Ok(0),
        Some(max) => max
            .checked_add(1)
            .filter(|next| *next <= MAX_POSITION)
            .ok_or(AppError::PositionLimitReached),
    }
}

pub fn insert_todo(
    conn: &Connection,
    user_id: Uuid,
    text: &str,
    position: i64,
) -> Result<Todo, AppError> {
    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO todos (id, user_id, text, position) VALUES (?1, ?2, ?3, ?4)",
        params![id, user_id, text, position],
    )?;

    get_todo(conn, id)?.ok_or_else(|| AppError::Internal(format!("todo {id} missing after insert")))
}

pub fn update_todo(conn: &Connection, id: Uuid, changes: &UpdateTodo) -> Result<Todo, AppError> {
    let mut updates = Vec::new();
    let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(text) = &changes.text {
        updates.push("text = ?");
        values.push(Box::new(text.clone()));
    }
    if let Some(completed) = changes.completed {
        updates.push("completed = ?");
        values.push(Box::new(completed));
    }
    if let Some(position) = changes.position {
        updates.push("position = ?");
        values.push(Box::new(position));
    }

    if !updates.is_empty() {
        updates.push("updated_at = strftime('%s', 'now')");
        values.push(Box::new(id));

        let query = format!("UPDATE todos SET {} WHERE id = ?", updates.join(", "));
        let value_refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();
        conn.execute(&query, value_refs.as_slice())?;
    }

    get_todo(conn, id)?.ok_or(AppError::NotFound("Todo"))
}

pub fn delete_todo(conn: &Connection, id: Uuid) -> Result<bool, AppError> {
    let rows = conn.execute("DELETE FROM todos WHERE id = ?1", [id])?;
    Ok(rows > 0)
}
