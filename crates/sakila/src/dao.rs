//! Generic per-table data access object.
//!
//! A model implements [`Table`] once; [`Dao<M>`] then provides key lookup,
//! range fetch, insert, full update and delete for it.

use crate::client::GenericClient;
use crate::condition::Condition;
use crate::error::StoreResult;
use crate::row::FromRow;
use crate::schema::TableDef;
use crate::sql::{DeleteStatement, InsertStatement, Param, Sql, UpdateStatement, sql};
use std::fmt;
use std::marker::PhantomData;
use tokio_postgres::types::ToSql;

/// A model stored one-to-one in a table with a single-column primary key.
pub trait Table: FromRow + Send + Sync {
    const DEF: &'static TableDef;

    type Id: ToSql + Clone + Send + Sync + 'static;

    fn id(&self) -> Self::Id;

    /// Every non-key column with its current value.
    fn column_values(&self) -> Vec<(&'static str, Param)>;
}

/// Input for an INSERT into `Target`'s table; the key is generated by the store.
pub trait Insertable: Send + Sync {
    type Target: Table;

    fn insert_values(&self) -> Vec<(&'static str, Param)>;
}

pub struct Dao<M> {
    _model: PhantomData<fn() -> M>,
}

impl<M> Default for Dao<M> {
    fn default() -> Self {
        Self {
            _model: PhantomData,
        }
    }
}

impl<M> Clone for Dao<M> {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl<M: Table> fmt::Debug for Dao<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dao").field("table", &M::DEF.name).finish()
    }
}

impl<M: Table> Dao<M> {
    pub fn new() -> Self {
        Self::default()
    }

    fn select() -> Sql {
        sql(format!("SELECT {} FROM {}", M::DEF.column_list(), M::DEF.name))
    }

    fn key_condition(id: M::Id) -> Condition {
        Condition::eq(&M::DEF.qualified(M::DEF.primary_key), id)
    }

    pub async fn find_by_id(&self, conn: &impl GenericClient, id: M::Id) -> StoreResult<Option<M>> {
        let mut q = Self::select().tagged(format!("{}.find_by_id", M::DEF.name));
        q.push_where(&Self::key_condition(id));
        q.fetch_opt_as(conn).await
    }

    /// Rows whose `column` lies within `[lower, upper]`, ordered by key.
    ///
    /// A missing bound leaves that side open.
    pub async fn fetch_range_of<T>(
        &self,
        conn: &impl GenericClient,
        column: &str,
        lower: Option<T>,
        upper: Option<T>,
    ) -> StoreResult<Vec<M>>
    where
        T: ToSql + Send + Sync + 'static,
    {
        let filter = range_condition(&M::DEF.qualified(column), lower, upper);

        let mut q = Self::select().tagged(format!("{}.fetch_range_of", M::DEF.name));
        q.push_where(&filter);
        q.push(" ORDER BY ")
            .push(&M::DEF.qualified(M::DEF.primary_key));
        q.fetch_all_as(conn).await
    }

    /// Insert one row; returns the affected row count.
    ///
    /// The generated key is not returned; read it with [`Dao::last_insert_id`]
    /// on the same session.
    pub async fn insert<I>(&self, conn: &impl GenericClient, value: &I) -> StoreResult<u64>
    where
        I: Insertable<Target = M>,
    {
        let (columns, values): (Vec<&str>, Vec<Param>) = value.insert_values().into_iter().unzip();
        InsertStatement::into_table(M::DEF.name)
            .columns(&columns)
            .values(values)
            .execute(conn)
            .await
    }

    /// The value most recently produced by a sequence in this session.
    pub async fn last_insert_id(&self, conn: &impl GenericClient) -> StoreResult<i64> {
        sql("SELECT lastval()")
            .tagged("lastval")
            .fetch_scalar_one(conn)
            .await
    }

    /// Write every non-key column of `model` to the row with its key.
    pub async fn update(&self, conn: &impl GenericClient, model: &M) -> StoreResult<u64> {
        let mut stmt = UpdateStatement::table(M::DEF.name);
        for (column, value) in model.column_values() {
            stmt = stmt.set_param(column, value);
        }
        stmt.filter(Self::key_condition(model.id()))
            .execute(conn)
            .await
    }

    pub async fn delete_by_id(&self, conn: &impl GenericClient, id: M::Id) -> StoreResult<u64> {
        DeleteStatement::from_table(M::DEF.name)
            .filter(Self::key_condition(id))
            .execute(conn)
            .await
    }
}

/// `BETWEEN` for two bounds, a one-sided comparison for one, no restriction for none.
fn range_condition<T>(column: &str, lower: Option<T>, upper: Option<T>) -> Condition
where
    T: ToSql + Send + Sync + 'static,
{
    match (lower, upper) {
        (Some(lo), Some(hi)) => Condition::between(column, lo, hi),
        (Some(lo), None) => Condition::gte(column, lo),
        (None, Some(hi)) => Condition::lte(column, hi),
        (None, None) => Condition::none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(c: &Condition) -> (String, usize) {
        let mut q = Sql::empty();
        q.push_where(c);
        (q.to_sql(), q.params_ref().len())
    }

    #[test]
    fn range_with_both_bounds_is_between() {
        let c = range_condition("film.length", Some(45_i16), Some(60_i16));
        assert_eq!(render(&c), (" WHERE film.length BETWEEN $1 AND $2".to_string(), 2));
    }

    #[test]
    fn range_with_one_bound_is_open_on_the_other_side() {
        let c = range_condition("film.length", Some(100_i16), None);
        assert_eq!(render(&c), (" WHERE film.length >= $1".to_string(), 1));

        let c = range_condition("film.length", None, Some(50_i16));
        assert_eq!(render(&c), (" WHERE film.length <= $1".to_string(), 1));
    }

    #[test]
    fn range_without_bounds_places_no_restriction() {
        let c = range_condition::<i16>("film.length", None, None);
        assert!(c.is_always_true());
        assert_eq!(render(&c), (String::new(), 0));
    }
}
