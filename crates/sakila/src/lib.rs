//! # sakila
//!
//! Repositories over the Sakila sample schema (actors, films, the
//! `film_actor` bridge table, inventory and rentals) on PostgreSQL, built on a
//! small parameter-safe SQL layer.
//!
//! The same operations are offered through several access styles:
//! - a generic per-table [`Dao`],
//! - plain record values ([`ActorRecord`]) whose store I/O lives on the repository,
//! - composed statements ([`Sql`], [`Condition`], the mutation builders),
//! - joins written out by hand or derived from foreign keys ([`schema::JoinPath`]).
//!
//! ## Quick start
//!
//! ```ignore
//! use sakila::{ActorFilmographySearchOption, ActorRepository, create_pool};
//!
//! let pool = create_pool(&std::env::var("DATABASE_URL")?)?;
//! sakila::migrate::run_pool(&pool).await?;
//!
//! let actors = ActorRepository::new(pool.get().await?);
//! let option = ActorFilmographySearchOption::default().film_title("EGG");
//! for entry in actors.find_actor_filmography(&option).await? {
//!     println!("{}: {} films", entry.actor.full_name(), entry.films.len());
//! }
//! ```
//!
//! Every executed statement is logged at DEBUG under the `sakila.sql` target.

pub mod client;
pub mod condition;
pub mod config;
pub mod dao;
pub mod error;
pub mod group;
pub mod model;
pub mod repository;
pub mod row;
pub mod schema;
pub mod sql;
pub mod transaction;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "migrate")]
pub mod migrate;

pub use client::GenericClient;
pub use condition::Condition;
pub use config::StoreConfig;
pub use dao::{Dao, Insertable, Table};
pub use error::{StoreError, StoreResult};
pub use group::group_rows;
pub use model::{
    Actor, ActorFilmography, ActorFilmographySearchOption, ActorRecord, ActorUpdateRequest, Film,
    FilmActor, FilmPriceSummary, FilmRentalSummary, FilmWithActor, NewActor, Pageable,
    PriceCategory, SimpleFilmInfo,
};
pub use repository::{ActorRepository, FilmDaoRepository, FilmRepository};
pub use row::{FromPrefixedRow, FromRow, PrefixedRow, RowExt};
pub use sql::{DeleteStatement, InsertStatement, Sql, UpdateStatement, sql};

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_config};
