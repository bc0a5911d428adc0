use std::env;

use diesel::prelude::*;
use diesel_migrations::{embed_migrations, EmbeddedMigrations};
use dotenvy::dotenv;

pub mod availability;
pub mod catalog;
pub mod error;
pub mod models;
pub mod reservation;
pub mod schema;
pub mod sequence;

use crate::error::StoreError;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

/// Opens a database connection from `DATABASE_URL`. Callers scope one
/// connection to one logical operation; dropping it releases the connection
/// on every exit path.
pub fn establish_connection() -> Result<PgConnection, StoreError> {
    dotenv().ok();

    let database_url = env::var("DATABASE_URL").map_err(|_| StoreError::MissingDatabaseUrl)?;
    Ok(PgConnection::establish(&database_url)?)
}
