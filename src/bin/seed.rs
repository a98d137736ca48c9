//! Creates a demo account with a few todos.

use tracing::info;

use todo_app::auth::hash_password;
use todo_app::config::DEFAULT_DATABASE_PATH;
use todo_app::db;
use todo_app::error::AppError;

const EMAIL: &str = "test-user@todo.dev";
const PASSWORD: &str = "secret123";
const TODOS: [(&str, bool); 3] = [
    ("First task", false),
    ("Second task", true),
    ("Third task", false),
];

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| DEFAULT_DATABASE_PATH.to_string());
    let pool = db::init_db(&path)?;
    let password_hash = hash_password(PASSWORD).map_err(|e| anyhow::anyhow!("hashing failed: {e}"))?;

    let mut conn = db::connect(&pool)?;
    let tx = conn.transaction()?;

    let user = match db::insert_user(&tx, EMAIL, &password_hash) {
        Ok(user) => user,
        Err(AppError::EmailAlreadyExists) => {
            info!(email = EMAIL, "seed account already exists, nothing to do");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    for (position, (text, completed)) in TODOS.iter().enumerate() {
        let todo = db::insert_todo(&tx, user.id, text, position as i64)?;
        if *completed {
            let changes = todo_app::models::UpdateTodo {
                completed: Some(true),
                ..Default::default()
            };
            db::update_todo(&tx, todo.id, &changes)?;
        }
    }
    tx.commit()?;

    info!(email = EMAIL, user_id = %user.id, todos = TODOS.len(), "seeded");
    Ok(())
}
