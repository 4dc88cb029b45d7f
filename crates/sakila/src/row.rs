//! Row mapping traits and utilities

use crate::error::{StoreError, StoreResult};
use tokio_postgres::Row;
use tokio_postgres::types::FromSql;

/// Trait for converting a database row into a Rust struct.
///
/// # Example
///
/// ```ignore
/// use sakila::{FromRow, RowExt, StoreResult};
///
/// struct Count {
///     total: i64,
/// }
///
/// impl FromRow for Count {
///     fn from_row(row: &tokio_postgres::Row) -> StoreResult<Self> {
///         Ok(Self { total: row.try_get_column("total")? })
///     }
/// }
/// ```
pub trait FromRow: Sized {
    /// Convert a database row into Self
    fn from_row(row: &Row) -> StoreResult<Self>;
}

/// Extension trait for Row to provide typed access
pub trait RowExt {
    /// Try to get a column value, returning StoreError::Decode on failure
    fn try_get_column<T>(&self, column: &str) -> StoreResult<T>
    where
        T: for<'a> FromSql<'a>;
}

impl RowExt for Row {
    fn try_get_column<T>(&self, column: &str) -> StoreResult<T>
    where
        T: for<'a> FromSql<'a>,
    {
        self.try_get(column)
            .map_err(|e| StoreError::decode(column, e.to_string()))
    }
}

/// A view over the columns of one projection inside a wider row.
///
/// Joined queries alias every column as `<prefix><column>` (see
/// [`TableDef::aliased_columns`](crate::schema::TableDef::aliased_columns)), so
/// several entities can be decoded from the same row.
#[derive(Clone, Copy)]
pub struct PrefixedRow<'a> {
    row: &'a Row,
    prefix: &'a str,
}

impl<'a> PrefixedRow<'a> {
    pub fn new(row: &'a Row, prefix: &'a str) -> Self {
        Self { row, prefix }
    }

    /// View with no prefix: column names are used as-is.
    pub fn plain(row: &'a Row) -> Self {
        Self { row, prefix: "" }
    }

    pub fn get<T>(&self, column: &str) -> StoreResult<T>
    where
        T: for<'b> FromSql<'b>,
    {
        if self.prefix.is_empty() {
            return self.row.try_get_column(column);
        }
        self.row.try_get_column(&format!("{}{column}", self.prefix))
    }
}

/// Decoding of an entity from a (possibly prefixed) slice of a row.
pub trait FromPrefixedRow: Sized {
    /// A NOT NULL column of the entity. Reading NULL here means the outer
    /// join that produced the row found no match for this entity.
    const KEY_COLUMN: &'static str;

    fn from_prefixed(row: PrefixedRow<'_>) -> StoreResult<Self>;

    /// Decode the entity, or `None` when the projection is entirely null.
    fn from_prefixed_opt(row: PrefixedRow<'_>) -> StoreResult<Option<Self>> {
        let key: Option<i64> = row.get(Self::KEY_COLUMN)?;
        match key {
            Some(_) => Self::from_prefixed(row).map(Some),
            None => Ok(None),
        }
    }
}
