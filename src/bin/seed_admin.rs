use std::env;

use anyhow::{Context, Result};
use diesel::prelude::*;
use uuid::Uuid;

use greenpulse_backend::{
    auth::password,
    config::AppConfig,
    db,
    models::{NewUser, Role},
    schema::users,
};

/// Creates the initial admin account. Safe to re-run; an existing admin with
/// the same email is left untouched.
fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let email = env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@greenpulse.com".to_string());
    let plain_password = env::var("ADMIN_PASSWORD").context("ADMIN_PASSWORD must be set")?;

    let config = AppConfig::from_env()?;
    let pool = db::init_pool(&config.database_url, 1)?;
    let mut conn = pool.get().context("failed to get database connection")?;

    let existing = users::table
        .filter(users::email.eq(&email))
        .select(users::id)
        .first::<Uuid>(&mut conn)
        .optional()?;

    if existing.is_some() {
        println!("Admin account {email} already exists.");
        return Ok(());
    }

    let admin = NewUser {
        id: Uuid::new_v4(),
        name: "GreenPulse Admin".to_string(),
        email: email.clone(),
        phone: "9999999999".to_string(),
        password_hash: password::hash_password(&plain_password)?,
        role: Role::Admin,
        vehicle_type: None,
    };

    diesel::insert_into(users::table)
        .values(&admin)
        .execute(&mut conn)
        .context("failed to insert admin account")?;

    println!("Admin account {email} created.");
    Ok(())
}
