//! create-user: provision a dashboard account.
//!
//! Usage: create-user <username> <email> <password>
//!
//! Reads DATABASE_URL from the environment (or .env).

use anyhow::{bail, Context, Result};
use sqlx::postgres::PgPoolOptions;

use pulsebox::database::UserRepository;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [username, email, password] = args.as_slice() else {
        bail!("usage: create-user <username> <email> <password>");
    };

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgresql://localhost:5432/pulsebox".to_string());

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .context("failed to connect to database")?;

    let password_hash =
        bcrypt::hash(password, bcrypt::DEFAULT_COST).context("failed to hash password")?;

    let users = UserRepository::new(pool);
    let user_id = users.insert(username, email, &password_hash).await?;

    println!("created user {username} <{email}> with id {user_id}");
    Ok(())
}
