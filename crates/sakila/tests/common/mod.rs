//! Shared setup for database-backed tests.
//!
//! Tests are skipped when `DATABASE_URL` is not set. The embedded migrations
//! run once per test binary; tests that write do so in a transaction they
//! never commit.

#![allow(dead_code)]

use tokio::sync::OnceCell;
use tokio_postgres::{Client, NoTls};

static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// Connect, or return from the calling test when `DATABASE_URL` is not set.
macro_rules! connect_or_skip {
    () => {
        match $crate::common::try_connect().await {
            Some(client) => client,
            None => {
                eprintln!("DATABASE_URL not set; skipping");
                return;
            }
        }
    };
}

pub async fn try_connect() -> Option<Client> {
    let _ = dotenvy::dotenv();
    let database_url = std::env::var("DATABASE_URL").ok()?;
    let (mut client, connection) = tokio_postgres::connect(&database_url, NoTls)
        .await
        .expect("Failed to connect to DATABASE_URL with NoTls");
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            eprintln!("tokio-postgres connection error: {e}");
        }
    });

    let migrating = &mut client;
    MIGRATED
        .get_or_init(|| async move {
            sakila::migrate::run(migrating)
                .await
                .expect("failed to apply migrations");
        })
        .await;

    Some(client)
}

/// Ids of the seeded actors.
pub const SEEDED_ACTOR_IDS: [i64; 6] = [1, 2, 3, 4, 5, 6];

/// Ids of the seeded films.
pub const SEEDED_FILM_IDS: [i64; 7] = [1, 2, 3, 4, 5, 6, 7];
