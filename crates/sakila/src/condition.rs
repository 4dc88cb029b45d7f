//! Query conditions for dynamic WHERE clauses.
//!
//! A [`Condition`] is a predicate over SQL expressions with bound values. The
//! conditional constructors ([`Condition::contains_if_not_blank`],
//! [`Condition::in_if_not_empty`]) turn absent or blank filter input into the
//! always-true condition, so a search form maps onto a single predicate:
//!
//! ```ignore
//! use sakila::Condition;
//!
//! let filter = Condition::all([
//!     Condition::contains_if_not_blank("film.title", option.title.as_deref()),
//!     Condition::in_if_not_empty("film.film_id", ids.as_deref()),
//! ]);
//! let mut q = sakila::sql("SELECT * FROM film");
//! q.push_where(&filter);
//! ```

use crate::sql::{Param, Sql};
use tokio_postgres::types::ToSql;

/// Escape character used by every LIKE pattern built here.
pub const LIKE_ESCAPE: char = '!';

#[derive(Debug, Clone)]
enum ConditionInner {
    /// Places no restriction.
    True,
    /// Raw SQL (escape hatch).
    Raw(String),
    Cmp {
        expr: String,
        operator: &'static str,
        value: Param,
    },
    Like {
        expr: String,
        pattern: Param,
    },
    In {
        expr: String,
        values: Vec<Param>,
    },
    Unary {
        expr: String,
        operator: &'static str,
    },
    Between {
        expr: String,
        from: Param,
        to: Param,
    },
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Exists(Sql),
}

/// A query condition primitive used by builders and repositories.
#[derive(Debug, Clone)]
pub struct Condition(ConditionInner);

/// Whether `s` contains at least one non-whitespace character.
pub fn has_text(s: &str) -> bool {
    s.chars().any(|c| !c.is_whitespace())
}

/// Escape `%`, `_` and the escape character itself for a LIKE pattern.
pub fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c == LIKE_ESCAPE || c == '%' || c == '_' {
            out.push(LIKE_ESCAPE);
        }
        out.push(c);
    }
    out
}

impl Condition {
    /// The always-true condition.
    pub fn none() -> Self {
        Condition(ConditionInner::True)
    }

    /// Create a raw SQL condition.
    ///
    /// # Safety
    /// Be careful with SQL injection when using raw conditions.
    pub fn raw(sql: impl Into<String>) -> Self {
        Condition(ConditionInner::Raw(sql.into()))
    }

    fn cmp<T>(expr: &str, operator: &'static str, value: T) -> Self
    where
        T: ToSql + Send + Sync + 'static,
    {
        Condition(ConditionInner::Cmp {
            expr: expr.to_string(),
            operator,
            value: Param::new(value),
        })
    }

    /// expr = value
    pub fn eq<T: ToSql + Send + Sync + 'static>(expr: &str, value: T) -> Self {
        Self::cmp(expr, "=", value)
    }

    /// expr >= value
    pub fn gte<T: ToSql + Send + Sync + 'static>(expr: &str, value: T) -> Self {
        Self::cmp(expr, ">=", value)
    }

    /// expr <= value
    pub fn lte<T: ToSql + Send + Sync + 'static>(expr: &str, value: T) -> Self {
        Self::cmp(expr, "<=", value)
    }

    /// Substring containment: `expr LIKE '%value%' ESCAPE '!'`.
    ///
    /// Wildcards inside `value` match literally.
    pub fn contains(expr: &str, value: &str) -> Self {
        Condition(ConditionInner::Like {
            expr: expr.to_string(),
            pattern: Param::new(format!("%{}%", escape_like(value))),
        })
    }

    /// [`Condition::contains`] for non-blank input, otherwise always-true.
    pub fn contains_if_not_blank(expr: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) if has_text(v) => Self::contains(expr, v),
            _ => Self::none(),
        }
    }

    /// expr IN (values...). An empty list matches nothing.
    pub fn in_list<T, I>(expr: &str, values: I) -> Self
    where
        T: ToSql + Send + Sync + 'static,
        I: IntoIterator<Item = T>,
    {
        let values: Vec<Param> = values.into_iter().map(Param::new).collect();
        if values.is_empty() {
            return Self::raw("FALSE");
        }
        Condition(ConditionInner::In {
            expr: expr.to_string(),
            values,
        })
    }

    /// [`Condition::in_list`] for a non-empty list, otherwise always-true.
    pub fn in_if_not_empty<T>(expr: &str, values: Option<&[T]>) -> Self
    where
        T: ToSql + Clone + Send + Sync + 'static,
    {
        match values {
            Some(vs) if !vs.is_empty() => Self::in_list(expr, vs.iter().cloned()),
            _ => Self::none(),
        }
    }

    pub fn is_not_null(expr: &str) -> Self {
        Condition(ConditionInner::Unary {
            expr: expr.to_string(),
            operator: "IS NOT NULL",
        })
    }

    /// expr BETWEEN from AND to (inclusive).
    pub fn between<T: ToSql + Send + Sync + 'static>(expr: &str, from: T, to: T) -> Self {
        Condition(ConditionInner::Between {
            expr: expr.to_string(),
            from: Param::new(from),
            to: Param::new(to),
        })
    }

    /// EXISTS (subquery).
    pub fn exists(subquery: Sql) -> Self {
        Condition(ConditionInner::Exists(subquery))
    }

    /// Logical AND of all conditions. Always-true members are dropped; an AND of
    /// nothing is always-true.
    pub fn all(conditions: impl IntoIterator<Item = Condition>) -> Self {
        let mut members = Vec::new();
        for c in conditions {
            match c.0 {
                ConditionInner::True => {}
                ConditionInner::And(inner) => members.extend(inner),
                other => members.push(Condition(other)),
            }
        }
        match members.len() {
            0 => Self::none(),
            1 => members.swap_remove(0),
            _ => Condition(ConditionInner::And(members)),
        }
    }

    /// Logical OR of all conditions. Any always-true member makes the whole
    /// disjunction always-true; an OR of nothing matches nothing.
    pub fn any(conditions: impl IntoIterator<Item = Condition>) -> Self {
        let mut members = Vec::new();
        for c in conditions {
            match c.0 {
                ConditionInner::True => return Self::none(),
                ConditionInner::Or(inner) => members.extend(inner),
                other => members.push(Condition(other)),
            }
        }
        match members.len() {
            0 => Self::raw("FALSE"),
            1 => members.swap_remove(0),
            _ => Condition(ConditionInner::Or(members)),
        }
    }

    pub fn and(self, other: Condition) -> Self {
        Self::all([self, other])
    }

    pub fn or(self, other: Condition) -> Self {
        Self::any([self, other])
    }

    /// Whether this condition places no restriction at all.
    pub fn is_always_true(&self) -> bool {
        matches!(self.0, ConditionInner::True)
    }

    /// Append this condition into a [`Sql`] builder.
    ///
    /// Placeholders are generated by `Sql`, and values are carried over.
    pub fn append_to_sql(&self, sql: &mut Sql) {
        match &self.0 {
            ConditionInner::True => {
                sql.push("TRUE");
            }
            ConditionInner::Raw(s) => {
                sql.push(s);
            }
            ConditionInner::Cmp {
                expr,
                operator,
                value,
            } => {
                sql.push(expr)
                    .push(" ")
                    .push(operator)
                    .push(" ")
                    .push_param(value.clone());
            }
            ConditionInner::Like { expr, pattern } => {
                sql.push(expr).push(" LIKE ").push_param(pattern.clone());
                sql.push(&format!(" ESCAPE '{LIKE_ESCAPE}'"));
            }
            ConditionInner::In { expr, values } => {
                sql.push(expr).push(" IN (");
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        sql.push(", ");
                    }
                    sql.push_param(v.clone());
                }
                sql.push(")");
            }
            ConditionInner::Unary { expr, operator } => {
                sql.push(expr).push(" ").push(operator);
            }
            ConditionInner::Between { expr, from, to } => {
                sql.push(expr)
                    .push(" BETWEEN ")
                    .push_param(from.clone())
                    .push(" AND ")
                    .push_param(to.clone());
            }
            ConditionInner::And(members) => {
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        sql.push(" AND ");
                    }
                    m.append_member(sql);
                }
            }
            ConditionInner::Or(members) => {
                sql.push("(");
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        sql.push(" OR ");
                    }
                    m.append_member(sql);
                }
                sql.push(")");
            }
            ConditionInner::Exists(subquery) => {
                sql.push("EXISTS (").push_sql(subquery.clone()).push(")");
            }
        }
    }

    // Raw text may contain its own AND/OR, so it is parenthesized inside a compound.
    fn append_member(&self, sql: &mut Sql) {
        if let ConditionInner::Raw(s) = &self.0 {
            sql.push("(").push(s).push(")");
        } else {
            self.append_to_sql(sql);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::sql;

    fn render(c: &Condition) -> (String, usize) {
        let mut q = Sql::empty();
        q.push_condition(c);
        (q.to_sql(), q.params_ref().len())
    }

    #[test]
    fn blank_and_absent_filters_are_always_true() {
        assert!(Condition::contains_if_not_blank("film.title", None).is_always_true());
        assert!(Condition::contains_if_not_blank("film.title", Some("")).is_always_true());
        assert!(Condition::contains_if_not_blank("film.title", Some(" \t\n")).is_always_true());
        assert!(Condition::in_if_not_empty::<i64>("actor_id", None).is_always_true());
        assert!(Condition::in_if_not_empty::<i64>("actor_id", Some(&[])).is_always_true());
    }

    #[test]
    fn both_filters_blank_render_no_where_clause() {
        let filter = Condition::all([
            Condition::contains_if_not_blank("actor.first_name", Some("  ")),
            Condition::contains_if_not_blank("film.title", None),
        ]);
        assert!(filter.is_always_true());

        let mut q = sql("SELECT * FROM actor");
        q.push_where(&filter);
        assert_eq!(q.to_sql(), "SELECT * FROM actor");
        assert!(q.params_ref().is_empty());
    }

    #[test]
    fn contains_escapes_wildcards() {
        assert_eq!(escape_like("50%_off!"), "50!%!_off!!");

        let (text, params) = render(&Condition::contains("film.title", "EGG"));
        assert_eq!(text, "film.title LIKE $1 ESCAPE '!'");
        assert_eq!(params, 1);
    }

    #[test]
    fn in_if_not_empty_binds_every_value() {
        let ids = [1_i64, 2, 3];
        let (text, params) = render(&Condition::in_if_not_empty("actor_id", Some(&ids[..])));
        assert_eq!(text, "actor_id IN ($1, $2, $3)");
        assert_eq!(params, 3);
    }

    #[test]
    fn empty_in_list_matches_nothing() {
        let (text, params) = render(&Condition::in_list("actor_id", Vec::<i64>::new()));
        assert_eq!(text, "FALSE");
        assert_eq!(params, 0);
    }

    #[test]
    fn and_drops_always_true_members() {
        let c = Condition::all([
            Condition::none(),
            Condition::eq("first_name", "ED".to_string()),
            Condition::none(),
            Condition::eq("last_name", "CHASE".to_string()),
        ]);
        let (text, params) = render(&c);
        assert_eq!(text, "first_name = $1 AND last_name = $2");
        assert_eq!(params, 2);

        let single = Condition::none().and(Condition::is_not_null("return_date"));
        assert_eq!(render(&single).0, "return_date IS NOT NULL");
    }

    #[test]
    fn or_is_parenthesized_inside_and() {
        let c = Condition::eq("film_id", 1_i64).and(
            Condition::eq("first_name", "ED".to_string())
                .or(Condition::eq("last_name", "CHASE".to_string())),
        );
        let (text, params) = render(&c);
        assert_eq!(text, "film_id = $1 AND (first_name = $2 OR last_name = $3)");
        assert_eq!(params, 3);
    }

    #[test]
    fn or_with_always_true_member_is_always_true() {
        let c = Condition::eq("a", 1_i64).or(Condition::none());
        assert!(c.is_always_true());
        assert_eq!(render(&Condition::any(Vec::new())).0, "FALSE");
    }

    #[test]
    fn raw_members_are_parenthesized() {
        let c = Condition::raw("a = 1 OR b = 2").and(Condition::raw("c = 3"));
        assert_eq!(render(&c).0, "(a = 1 OR b = 2) AND (c = 3)");
    }

    #[test]
    fn between_and_exists_carry_params_in_order() {
        let mut sub = sql("SELECT 1 FROM rental WHERE rental.inventory_id = inventory.inventory_id AND rental.customer_id = ");
        sub.push_bind(7_i64);

        let c = Condition::between("length", 60_i32, 90_i32).and(Condition::exists(sub));
        let (text, params) = render(&c);
        assert_eq!(
            text,
            "length BETWEEN $1 AND $2 AND EXISTS (SELECT 1 FROM rental WHERE rental.inventory_id = inventory.inventory_id AND rental.customer_id = $3)"
        );
        assert_eq!(params, 3);
    }

    #[test]
    fn has_text_ignores_whitespace() {
        assert!(!has_text(""));
        assert!(!has_text("   "));
        assert!(has_text(" a "));
    }
}
