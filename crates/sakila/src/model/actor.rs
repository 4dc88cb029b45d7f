use super::film::Film;
use crate::condition::has_text;
use crate::dao::{Insertable, Table};
use crate::error::StoreResult;
use crate::row::{FromPrefixedRow, FromRow, PrefixedRow};
use crate::schema::{ACTOR, TableDef};
use crate::sql::Param;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

/// A row of `actor`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    pub actor_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub last_update: DateTime<Utc>,
}

impl Actor {
    /// `"first last"`
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl FromPrefixedRow for Actor {
    const KEY_COLUMN: &'static str = "actor_id";

    fn from_prefixed(row: PrefixedRow<'_>) -> StoreResult<Self> {
        Ok(Self {
            actor_id: row.get("actor_id")?,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            last_update: row.get("last_update")?,
        })
    }
}

impl FromRow for Actor {
    fn from_row(row: &Row) -> StoreResult<Self> {
        Self::from_prefixed(PrefixedRow::plain(row))
    }
}

impl Table for Actor {
    const DEF: &'static TableDef = &ACTOR;

    type Id = i64;

    fn id(&self) -> i64 {
        self.actor_id
    }

    fn column_values(&self) -> Vec<(&'static str, Param)> {
        vec![
            ("first_name", Param::new(self.first_name.clone())),
            ("last_name", Param::new(self.last_name.clone())),
            ("last_update", Param::new(self.last_update)),
        ]
    }
}

/// Insert input for `actor`; identity and timestamp come from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewActor {
    pub first_name: String,
    pub last_name: String,
}

impl NewActor {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    pub(crate) fn params(&self) -> Vec<Param> {
        vec![
            Param::new(self.first_name.clone()),
            Param::new(self.last_name.clone()),
        ]
    }
}

impl Insertable for NewActor {
    type Target = Actor;

    fn insert_values(&self) -> Vec<(&'static str, Param)> {
        vec![
            ("first_name", Param::new(self.first_name.clone())),
            ("last_name", Param::new(self.last_name.clone())),
        ]
    }
}

/// An actor as a plain value whose identity and timestamp may not be assigned yet.
///
/// Every store operation on a record goes through
/// [`ActorRepository`](crate::repository::ActorRepository): insert, store,
/// refresh, update and delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorRecord {
    pub actor_id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub last_update: Option<DateTime<Utc>>,
}

impl ActorRecord {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            actor_id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            last_update: None,
        }
    }

    /// Whether the record has never been written.
    pub fn is_new(&self) -> bool {
        self.actor_id.is_none()
    }

    /// Overwrite every field with the stored row.
    pub fn load(&mut self, actor: Actor) {
        *self = actor.into();
    }
}

impl From<Actor> for ActorRecord {
    fn from(actor: Actor) -> Self {
        Self {
            actor_id: Some(actor.actor_id),
            first_name: actor.first_name,
            last_name: actor.last_name,
            last_update: Some(actor.last_update),
        }
    }
}

impl FromRow for ActorRecord {
    fn from_row(row: &Row) -> StoreResult<Self> {
        Actor::from_row(row).map(Self::from)
    }
}

/// Partial update of an actor: only non-blank fields apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorUpdateRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl ActorUpdateRequest {
    pub fn first_name(mut self, value: impl Into<String>) -> Self {
        self.first_name = Some(value.into());
        self
    }

    pub fn last_name(mut self, value: impl Into<String>) -> Self {
        self.last_name = Some(value.into());
        self
    }

    pub fn concrete_first_name(&self) -> Option<&str> {
        self.first_name.as_deref().filter(|s| has_text(s))
    }

    pub fn concrete_last_name(&self) -> Option<&str> {
        self.last_name.as_deref().filter(|s| has_text(s))
    }

    /// Whether no field would change anything.
    pub fn is_noop(&self) -> bool {
        self.concrete_first_name().is_none() && self.concrete_last_name().is_none()
    }

    /// Copy the concrete fields onto `record`.
    pub fn apply_to(&self, record: &mut ActorRecord) {
        if let Some(v) = self.concrete_first_name() {
            record.first_name = v.to_string();
        }
        if let Some(v) = self.concrete_last_name() {
            record.last_name = v.to_string();
        }
    }
}

/// One actor with the films reached through `film_actor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorFilmography {
    pub actor: Actor,
    pub films: Vec<Film>,
}

/// Filters for [`find_actor_filmography`](crate::repository::ActorRepository::find_actor_filmography).
/// Blank or absent fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorFilmographySearchOption {
    /// Substring of `"first last"`.
    pub actor_name: Option<String>,
    /// Substring of the film title.
    pub film_title: Option<String>,
}

impl ActorFilmographySearchOption {
    pub fn actor_name(mut self, value: impl Into<String>) -> Self {
        self.actor_name = Some(value.into());
        self
    }

    pub fn film_title(mut self, value: impl Into<String>) -> Self {
        self.film_title = Some(value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_request_skips_blank_fields() {
        let mut record = ActorRecord::new("PENELOPE", "GUINESS");
        ActorUpdateRequest::default()
            .first_name("ED")
            .last_name("   ")
            .apply_to(&mut record);

        assert_eq!(record.first_name, "ED");
        assert_eq!(record.last_name, "GUINESS");
    }

    #[test]
    fn update_request_with_only_blanks_is_noop() {
        let req = ActorUpdateRequest::default().first_name("").last_name("\t");
        assert!(req.is_noop());
        assert!(ActorUpdateRequest::default().is_noop());
        assert!(!ActorUpdateRequest::default().last_name("CHASE").is_noop());
    }

    #[test]
    fn record_from_actor_is_not_new() {
        let actor = Actor {
            actor_id: 3,
            first_name: "ED".into(),
            last_name: "CHASE".into(),
            last_update: Utc::now(),
        };
        assert_eq!(actor.full_name(), "ED CHASE");

        let record = ActorRecord::from(actor.clone());
        assert!(!record.is_new());
        assert_eq!(record.actor_id, Some(3));
        assert!(ActorRecord::new("A", "B").is_new());
    }
}
