//! INSERT / UPDATE / DELETE statement builders.
//!
//! Each builder renders into a [`Sql`], so execution, logging and placeholder
//! numbering are shared with hand-composed queries.

use super::builder::Sql;
use super::param::Param;
use crate::client::GenericClient;
use crate::condition::Condition;
use crate::error::{StoreError, StoreResult};
use crate::row::FromRow;
use tokio_postgres::types::{FromSql, ToSql};

/// Multi-row INSERT builder.
///
/// All rows go into a single `INSERT ... VALUES (..), (..)` statement; with a
/// RETURNING clause the store yields one row per VALUES tuple, in input order.
#[derive(Clone, Debug)]
pub struct InsertStatement {
    table: String,
    columns: Vec<String>,
    rows: Vec<Vec<Param>>,
    returning: Option<String>,
}

impl InsertStatement {
    pub fn into_table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: Vec::new(),
            rows: Vec::new(),
            returning: None,
        }
    }

    /// Set the column list shared by every row.
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Append one VALUES tuple, in column order.
    pub fn values(mut self, row: Vec<Param>) -> Self {
        self.rows.push(row);
        self
    }

    pub fn returning(mut self, columns: &str) -> Self {
        self.returning = Some(columns.to_string());
        self
    }

    /// Render the statement.
    pub fn build(&self) -> StoreResult<Sql> {
        if self.rows.is_empty() {
            return Err(StoreError::validation(format!(
                "INSERT INTO {} has no rows",
                self.table
            )));
        }
        let width = self.columns.len();
        if let Some(bad) = self.rows.iter().find(|r| r.len() != width) {
            return Err(StoreError::validation(format!(
                "INSERT INTO {}: row has {} values for {width} columns",
                self.table,
                bad.len()
            )));
        }

        let mut q = Sql::new(format!(
            "INSERT INTO {} ({}) VALUES ",
            self.table,
            self.columns.join(", ")
        ));
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                q.push(", ");
            }
            q.push("(");
            for (j, value) in row.iter().enumerate() {
                if j > 0 {
                    q.push(", ");
                }
                q.push_param(value.clone());
            }
            q.push(")");
        }
        if let Some(cols) = &self.returning {
            q.push(" RETURNING ").push(cols);
        }
        Ok(q)
    }

    pub async fn execute(&self, conn: &impl GenericClient) -> StoreResult<u64> {
        self.build()?.execute(conn).await
    }

    pub async fn fetch_one_as<T: FromRow>(&self, conn: &impl GenericClient) -> StoreResult<T> {
        self.build()?.fetch_one_as(conn).await
    }

    pub async fn fetch_all_as<T: FromRow>(&self, conn: &impl GenericClient) -> StoreResult<Vec<T>> {
        self.build()?.fetch_all_as(conn).await
    }

    pub async fn fetch_scalar_all<T>(&self, conn: &impl GenericClient) -> StoreResult<Vec<T>>
    where
        T: for<'b> FromSql<'b> + Send + Sync,
    {
        self.build()?.fetch_scalar_all(conn).await
    }
}

#[derive(Clone, Debug)]
enum Assignment {
    Value(Param),
    Raw(String),
}

/// UPDATE builder. Refuses to render without a SET list or without a WHERE clause.
#[derive(Clone, Debug)]
pub struct UpdateStatement {
    table: String,
    assignments: Vec<(String, Assignment)>,
    filter: Condition,
    returning: Option<String>,
}

impl UpdateStatement {
    pub fn table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            assignments: Vec::new(),
            filter: Condition::none(),
            returning: None,
        }
    }

    /// Set a column value.
    pub fn set<T: ToSql + Send + Sync + 'static>(self, column: &str, value: T) -> Self {
        self.set_param(column, Param::new(value))
    }

    /// Set a column to an already wrapped value.
    pub fn set_param(mut self, column: &str, value: Param) -> Self {
        self.assignments
            .push((column.to_string(), Assignment::Value(value)));
        self
    }

    /// Set an optional column value (None => skip).
    pub fn set_opt<T: ToSql + Send + Sync + 'static>(self, column: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.set(column, v),
            None => self,
        }
    }

    /// Set a raw SQL expression, e.g. `now()`.
    pub fn set_raw(mut self, column: &str, expr: &str) -> Self {
        self.assignments
            .push((column.to_string(), Assignment::Raw(expr.to_string())));
        self
    }

    /// AND a condition into the WHERE clause.
    pub fn filter(mut self, condition: Condition) -> Self {
        self.filter = self.filter.and(condition);
        self
    }

    pub fn returning(mut self, columns: &str) -> Self {
        self.returning = Some(columns.to_string());
        self
    }

    pub fn build(&self) -> StoreResult<Sql> {
        if self.assignments.is_empty() {
            return Err(StoreError::validation(format!(
                "UPDATE {} has no SET columns",
                self.table
            )));
        }
        if self.filter.is_always_true() {
            return Err(StoreError::validation(format!(
                "UPDATE {} without WHERE is refused",
                self.table
            )));
        }

        let mut q = Sql::new(format!("UPDATE {} SET ", self.table));
        for (i, (column, assignment)) in self.assignments.iter().enumerate() {
            if i > 0 {
                q.push(", ");
            }
            q.push(column).push(" = ");
            match assignment {
                Assignment::Value(p) => {
                    q.push_param(p.clone());
                }
                Assignment::Raw(expr) => {
                    q.push(expr);
                }
            }
        }
        q.push_where(&self.filter);
        if let Some(cols) = &self.returning {
            q.push(" RETURNING ").push(cols);
        }
        Ok(q)
    }

    pub async fn execute(&self, conn: &impl GenericClient) -> StoreResult<u64> {
        self.build()?.execute(conn).await
    }

    pub async fn fetch_opt_as<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> StoreResult<Option<T>> {
        self.build()?.fetch_opt_as(conn).await
    }
}

/// DELETE builder. Refuses to render without a WHERE clause.
#[derive(Clone, Debug)]
pub struct DeleteStatement {
    table: String,
    filter: Condition,
}

impl DeleteStatement {
    pub fn from_table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            filter: Condition::none(),
        }
    }

    /// AND a condition into the WHERE clause.
    pub fn filter(mut self, condition: Condition) -> Self {
        self.filter = self.filter.and(condition);
        self
    }

    pub fn build(&self) -> StoreResult<Sql> {
        if self.filter.is_always_true() {
            return Err(StoreError::validation(format!(
                "DELETE FROM {} without WHERE is refused",
                self.table
            )));
        }
        let mut q = Sql::new(format!("DELETE FROM {}", self.table));
        q.push_where(&self.filter);
        Ok(q)
    }

    pub async fn execute(&self, conn: &impl GenericClient) -> StoreResult<u64> {
        self.build()?.execute(conn).await
    }
}
