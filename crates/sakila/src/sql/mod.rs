//! Dynamic SQL builder.
//!
//! `Sql` composes statements piece by piece without manually tracking
//! placeholder indices; the mutation builders in this module produce `Sql`
//! for INSERT / UPDATE / DELETE.
//!
//! # Example
//!
//! ```ignore
//! use sakila::sql;
//!
//! let mut q = sql("SELECT actor_id, first_name FROM actor WHERE 1=1");
//! if let Some(name) = first_name {
//!     q.push(" AND first_name = ").push_bind(name);
//! }
//! q.push(" ORDER BY actor_id");
//!
//! let actors: Vec<Actor> = q.fetch_all_as(&conn).await?;
//! ```

mod builder;
mod mutation;
mod param;


pub use builder::Sql;
pub use mutation::{DeleteStatement, InsertStatement, UpdateStatement};
pub use param::Param;

/// Start building a SQL statement.
pub fn sql(initial_sql: impl Into<String>) -> Sql {
    Sql::new(initial_sql)
}
