//! Static table and foreign-key metadata for the sample schema.
//!
//! Joins can be written two ways: with a hand-written `ON` clause
//! ([`JoinPath::join_on`]) or derived from a declared [`ForeignKey`]
//! ([`JoinPath::join_via`]). Both produce the same FROM-list text when the
//! hand-written clause matches the key.

use crate::error::{StoreError, StoreResult};

/// A table's name, column list and primary key.
#[derive(Debug, PartialEq, Eq)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [&'static str],
    pub primary_key: &'static str,
}

impl TableDef {
    /// `table.column`
    pub fn qualified(&self, column: &str) -> String {
        format!("{}.{column}", self.name)
    }

    /// Every column, table-qualified, comma separated.
    pub fn column_list(&self) -> String {
        self.columns
            .iter()
            .map(|c| self.qualified(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Every column aliased as `<prefix><column>`, e.g. `actor.actor_id AS actor__actor_id`.
    ///
    /// Used when several tables share one select list; decode the result with
    /// [`PrefixedRow`](crate::row::PrefixedRow).
    pub fn aliased_columns(&self, prefix: &str) -> String {
        self.columns
            .iter()
            .map(|c| format!("{}.{c} AS {prefix}{c}", self.name))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// `child.child_column` references `parent.parent_column`.
#[derive(Debug)]
pub struct ForeignKey {
    pub name: &'static str,
    pub child: &'static TableDef,
    pub child_column: &'static str,
    pub parent: &'static TableDef,
    pub parent_column: &'static str,
}

impl ForeignKey {
    /// `child.child_column = parent.parent_column`
    pub fn on_clause(&self) -> String {
        format!(
            "{}.{} = {}.{}",
            self.child.name, self.child_column, self.parent.name, self.parent_column
        )
    }
}

pub static ACTOR: TableDef = TableDef {
    name: "actor",
    columns: &["actor_id", "first_name", "last_name", "last_update"],
    primary_key: "actor_id",
};

pub static FILM: TableDef = TableDef {
    name: "film",
    columns: &[
        "film_id",
        "title",
        "description",
        "release_year",
        "rental_duration",
        "rental_rate",
        "length",
        "replacement_cost",
        "last_update",
    ],
    primary_key: "film_id",
};

pub static FILM_ACTOR: TableDef = TableDef {
    name: "film_actor",
    columns: &["actor_id", "film_id", "last_update"],
    primary_key: "actor_id",
};

pub static INVENTORY: TableDef = TableDef {
    name: "inventory",
    columns: &["inventory_id", "film_id", "store_id", "last_update"],
    primary_key: "inventory_id",
};

pub static RENTAL: TableDef = TableDef {
    name: "rental",
    columns: &[
        "rental_id",
        "rental_date",
        "inventory_id",
        "customer_id",
        "return_date",
        "last_update",
    ],
    primary_key: "rental_id",
};

pub static FILM_ACTOR_ACTOR_FK: ForeignKey = ForeignKey {
    name: "film_actor_actor_id_fkey",
    child: &FILM_ACTOR,
    child_column: "actor_id",
    parent: &ACTOR,
    parent_column: "actor_id",
};

pub static FILM_ACTOR_FILM_FK: ForeignKey = ForeignKey {
    name: "film_actor_film_id_fkey",
    child: &FILM_ACTOR,
    child_column: "film_id",
    parent: &FILM,
    parent_column: "film_id",
};

pub static INVENTORY_FILM_FK: ForeignKey = ForeignKey {
    name: "inventory_film_id_fkey",
    child: &INVENTORY,
    child_column: "film_id",
    parent: &FILM,
    parent_column: "film_id",
};

pub static RENTAL_INVENTORY_FK: ForeignKey = ForeignKey {
    name: "rental_inventory_id_fkey",
    child: &RENTAL,
    child_column: "inventory_id",
    parent: &INVENTORY,
    parent_column: "inventory_id",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

impl JoinKind {
    fn keyword(self) -> &'static str {
        match self {
            JoinKind::Inner => "JOIN",
            JoinKind::Left => "LEFT JOIN",
        }
    }
}

#[derive(Debug, Clone)]
struct Join {
    kind: JoinKind,
    table: &'static TableDef,
    on: String,
}

/// A FROM-list item: a root table followed by joins.
#[derive(Debug, Clone)]
pub struct JoinPath {
    root: &'static TableDef,
    joins: Vec<Join>,
}

impl JoinPath {
    pub fn from(root: &'static TableDef) -> Self {
        Self {
            root,
            joins: Vec::new(),
        }
    }

    /// Join `table` with a hand-written ON clause.
    pub fn join_on(mut self, kind: JoinKind, table: &'static TableDef, on: &str) -> Self {
        self.joins.push(Join {
            kind,
            table,
            on: on.to_string(),
        });
        self
    }

    /// Join along a foreign key.
    ///
    /// The key may point either way; the side not yet on the path is joined. A
    /// key touching none or both of the path's tables is rejected.
    pub fn join_via(self, kind: JoinKind, fk: &'static ForeignKey) -> StoreResult<Self> {
        let has_child = self.contains(fk.child);
        let has_parent = self.contains(fk.parent);
        let table = match (has_child, has_parent) {
            (true, false) => fk.parent,
            (false, true) => fk.child,
            _ => {
                return Err(StoreError::validation(format!(
                    "foreign key {} does not extend a path rooted at {}",
                    fk.name, self.root.name
                )));
            }
        };
        Ok(self.join_on(kind, table, &fk.on_clause()))
    }

    fn contains(&self, table: &TableDef) -> bool {
        self.root == table || self.joins.iter().any(|j| j.table == table)
    }

    /// Append `root [kind JOIN table ON ...]*` to `out`.
    pub fn write_sql(&self, out: &mut String) {
        out.push_str(self.root.name);
        for join in &self.joins {
            out.push(' ');
            out.push_str(join.kind.keyword());
            out.push(' ');
            out.push_str(join.table.name);
            out.push_str(" ON ");
            out.push_str(&join.on);
        }
    }

    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        self.write_sql(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliased_columns_use_prefix() {
        assert_eq!(
            ACTOR.aliased_columns("actor__"),
            "actor.actor_id AS actor__actor_id, actor.first_name AS actor__first_name, \
             actor.last_name AS actor__last_name, actor.last_update AS actor__last_update"
        );
    }

    #[test]
    fn column_list_is_qualified() {
        assert_eq!(
            FILM_ACTOR.column_list(),
            "film_actor.actor_id, film_actor.film_id, film_actor.last_update"
        );
    }

    #[test]
    fn implicit_path_matches_explicit_on_clauses() {
        let explicit = JoinPath::from(&FILM)
            .join_on(JoinKind::Left, &FILM_ACTOR, "film_actor.film_id = film.film_id")
            .join_on(JoinKind::Left, &ACTOR, "film_actor.actor_id = actor.actor_id");

        let implicit = JoinPath::from(&FILM)
            .join_via(JoinKind::Left, &FILM_ACTOR_FILM_FK)
            .and_then(|p| p.join_via(JoinKind::Left, &FILM_ACTOR_ACTOR_FK))
            .unwrap();

        assert_eq!(explicit.to_sql(), implicit.to_sql());
        assert_eq!(
            implicit.to_sql(),
            "film LEFT JOIN film_actor ON film_actor.film_id = film.film_id \
             LEFT JOIN actor ON film_actor.actor_id = actor.actor_id"
        );
    }

    #[test]
    fn join_via_follows_key_from_child_side() {
        let path = JoinPath::from(&RENTAL)
            .join_via(JoinKind::Inner, &RENTAL_INVENTORY_FK)
            .unwrap();
        assert_eq!(
            path.to_sql(),
            "rental JOIN inventory ON rental.inventory_id = inventory.inventory_id"
        );
    }

    #[test]
    fn join_via_rejects_unrelated_key() {
        let err = JoinPath::from(&ACTOR)
            .join_via(JoinKind::Left, &INVENTORY_FILM_FK)
            .unwrap_err();
        assert!(err.is_validation());
    }
}
