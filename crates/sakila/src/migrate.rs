//! Schema migrations via [`refinery`].
//!
//! The sample schema and its seed data are embedded from
//! `crates/sakila/migrations` at compile time.
//!
//! # Example
//!
//! ```ignore
//! let pool = sakila::create_pool(&std::env::var("DATABASE_URL")?)?;
//! sakila::migrate::run_pool(&pool).await?;
//! ```

use crate::error::StoreResult;

pub use refinery::{Report, Runner, SchemaVersion};

mod embedded {
    refinery::embed_migrations!("migrations");
}

/// Runner over the embedded migrations.
pub fn runner() -> Runner {
    embedded::migrations::runner()
}

/// Apply every pending migration.
pub async fn run(client: &mut tokio_postgres::Client) -> StoreResult<Report> {
    let report = runner().run_async(client).await?;
    tracing::info!(
        applied = report.applied_migrations().len(),
        "schema migrations applied"
    );
    Ok(report)
}

/// Pool variant of [`run`].
#[cfg(feature = "pool")]
pub async fn run_pool(pool: &deadpool_postgres::Pool) -> StoreResult<Report> {
    let mut client = pool.get().await?;
    run(&mut client).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeds_every_migration_version() {
        let mut versions: Vec<SchemaVersion> = runner()
            .get_migrations()
            .iter()
            .map(|m| m.version())
            .collect();
        versions.sort_unstable();
        assert_eq!(versions, vec![1, 2]);
    }
}
