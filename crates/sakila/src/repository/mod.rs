//! Repositories over the sample schema.
//!
//! A repository wraps any [`GenericClient`](crate::GenericClient): a plain
//! connection, a pooled one, or a reference to a transaction the caller owns.

mod actor;
mod film;

pub use actor::ActorRepository;
pub use film::{FilmDaoRepository, FilmRepository};
