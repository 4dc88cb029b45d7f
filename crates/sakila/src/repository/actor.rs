use crate::client::GenericClient;
use crate::condition::Condition;
use crate::dao::Dao;
use crate::error::{StoreError, StoreResult};
use crate::group::group_rows;
use crate::model::{
    Actor, ActorFilmography, ActorFilmographySearchOption, ActorRecord, ActorUpdateRequest, Film,
    NewActor,
};
use crate::row::{FromPrefixedRow, PrefixedRow};
use crate::schema::{ACTOR, FILM, FILM_ACTOR_ACTOR_FK, FILM_ACTOR_FILM_FK, JoinKind, JoinPath};
use crate::sql::{DeleteStatement, InsertStatement, Sql, UpdateStatement, sql};

const ACTOR_PREFIX: &str = "actor__";
const FILM_PREFIX: &str = "film__";

/// Reads, grouped reads and every write strategy for `actor`.
pub struct ActorRepository<C> {
    client: C,
    dao: Dao<Actor>,
}

impl<C: GenericClient> ActorRepository<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            dao: Dao::new(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn select(tag: &str) -> Sql {
        sql(format!("SELECT {} FROM actor", ACTOR.column_list())).tagged(format!("actor.{tag}"))
    }

    fn returning_columns() -> String {
        ACTOR.columns.join(", ")
    }

    fn insert_statement(actors: &[NewActor]) -> InsertStatement {
        actors.iter().fold(
            InsertStatement::into_table(ACTOR.name).columns(&["first_name", "last_name"]),
            |stmt, a| stmt.values(a.params()),
        )
    }

    fn key(actor_id: i64) -> Condition {
        Condition::eq("actor.actor_id", actor_id)
    }

    // ==================== Reads ====================

    pub async fn find_by_id(&self, actor_id: i64) -> StoreResult<Option<Actor>> {
        self.dao.find_by_id(&self.client, actor_id).await
    }

    pub async fn find_record_by_actor_id(&self, actor_id: i64) -> StoreResult<Option<ActorRecord>> {
        let mut q = Self::select("find_record_by_actor_id");
        q.push_where(&Self::key(actor_id));
        q.fetch_opt_as(&self.client).await
    }

    pub async fn find_by_first_name_and_last_name(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> StoreResult<Vec<Actor>> {
        let filter = Condition::eq("actor.first_name", first_name.to_string())
            .and(Condition::eq("actor.last_name", last_name.to_string()));

        let mut q = Self::select("find_by_first_name_and_last_name");
        q.push_where(&filter).push(" ORDER BY actor.actor_id");
        q.fetch_all_as(&self.client).await
    }

    pub async fn find_by_first_name_or_last_name(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> StoreResult<Vec<Actor>> {
        let filter = Condition::eq("actor.first_name", first_name.to_string())
            .or(Condition::eq("actor.last_name", last_name.to_string()));

        let mut q = Self::select("find_by_first_name_or_last_name");
        q.push_where(&filter).push(" ORDER BY actor.actor_id");
        q.fetch_all_as(&self.client).await
    }

    /// Actors whose id is in `ids`; every actor when `ids` is absent or empty.
    pub async fn find_by_actor_id_in(&self, ids: Option<&[i64]>) -> StoreResult<Vec<Actor>> {
        let mut q = Self::select("find_by_actor_id_in");
        q.push_where(&Condition::in_if_not_empty("actor.actor_id", ids))
            .push(" ORDER BY actor.actor_id");
        q.fetch_all_as(&self.client).await
    }

    /// Actors with their films, filtered by a substring of the actor's full
    /// name and a substring of the film title.
    ///
    /// Actors are returned in id order. An actor without films appears with an
    /// empty list unless a film-title filter is set, in which case the filter
    /// removes the actor's film-less row.
    pub async fn find_actor_filmography(
        &self,
        option: &ActorFilmographySearchOption,
    ) -> StoreResult<Vec<ActorFilmography>> {
        let path = JoinPath::from(&ACTOR)
            .join_via(JoinKind::Left, &FILM_ACTOR_ACTOR_FK)?
            .join_via(JoinKind::Left, &FILM_ACTOR_FILM_FK)?;

        let filter = Condition::all([
            Condition::contains_if_not_blank(
                "(actor.first_name || ' ' || actor.last_name)",
                option.actor_name.as_deref(),
            ),
            Condition::contains_if_not_blank("film.title", option.film_title.as_deref()),
        ]);

        let mut q = sql(format!(
            "SELECT {}, {} FROM ",
            ACTOR.aliased_columns(ACTOR_PREFIX),
            FILM.aliased_columns(FILM_PREFIX)
        ))
        .tagged("actor.find_actor_filmography");
        q.push_join_path(&path)
            .push_where(&filter)
            .push(" ORDER BY actor.actor_id, film.film_id");

        let rows = q.fetch_all(&self.client).await?;
        let grouped = group_rows(
            rows,
            |row| Actor::from_prefixed(PrefixedRow::new(row, ACTOR_PREFIX)),
            |row| Film::from_prefixed_opt(PrefixedRow::new(row, FILM_PREFIX)),
        )?;

        Ok(grouped
            .into_iter()
            .map(|(actor, films)| ActorFilmography { actor, films })
            .collect())
    }

    // ==================== Insert ====================

    /// Insert through the DAO, then read the generated key back from the session.
    pub async fn save_by_dao(&self, actor: &NewActor) -> StoreResult<i64> {
        self.dao.insert(&self.client, actor).await?;
        let actor_id = self.dao.last_insert_id(&self.client).await?;
        tracing::debug!(actor_id, "inserted actor via dao");
        Ok(actor_id)
    }

    /// `INSERT ... RETURNING actor_id`
    pub async fn save_with_returning_pk_only(&self, actor: &NewActor) -> StoreResult<i64> {
        let actor_id: i64 = Self::insert_statement(std::slice::from_ref(actor))
            .returning("actor_id")
            .build()?
            .tagged("actor.save_with_returning_pk_only")
            .fetch_scalar_one(&self.client)
            .await?;
        tracing::debug!(actor_id, "inserted actor");
        Ok(actor_id)
    }

    /// `INSERT ... RETURNING` every column.
    pub async fn save_with_returning(&self, actor: &NewActor) -> StoreResult<Actor> {
        let saved: Actor = Self::insert_statement(std::slice::from_ref(actor))
            .returning(&Self::returning_columns())
            .fetch_one_as(&self.client)
            .await?;
        tracing::debug!(actor_id = saved.actor_id, "inserted actor");
        Ok(saved)
    }

    /// Insert a new record; its identity and timestamp are filled in place.
    pub async fn insert_record(&self, record: &mut ActorRecord) -> StoreResult<()> {
        let saved = self
            .save_with_returning(&NewActor::new(
                record.first_name.clone(),
                record.last_name.clone(),
            ))
            .await?;
        record.load(saved);
        Ok(())
    }

    /// Insert the record when it has no identity yet, otherwise write all of
    /// its columns back. The record is refreshed from the written row.
    pub async fn store_record(&self, record: &mut ActorRecord) -> StoreResult<()> {
        let Some(actor_id) = record.actor_id else {
            return self.insert_record(record).await;
        };

        let updated: Option<Actor> = UpdateStatement::table(ACTOR.name)
            .set("first_name", record.first_name.clone())
            .set("last_name", record.last_name.clone())
            .set_raw("last_update", "now()")
            .filter(Self::key(actor_id))
            .returning(&Self::returning_columns())
            .fetch_opt_as(&self.client)
            .await?;

        match updated {
            Some(actor) => {
                tracing::debug!(actor_id, "stored actor record");
                record.load(actor);
                Ok(())
            }
            None => Err(StoreError::not_found(format!("actor {actor_id} no longer exists"))),
        }
    }

    /// Re-read every column of the record from its row.
    pub async fn refresh_record(&self, record: &mut ActorRecord) -> StoreResult<()> {
        let actor_id = record
            .actor_id
            .ok_or_else(|| StoreError::validation("cannot refresh an actor record without identity"))?;
        let actor = self
            .find_by_id(actor_id)
            .await?
            .ok_or_else(|| StoreError::not_found(format!("actor {actor_id} no longer exists")))?;
        record.load(actor);
        Ok(())
    }

    // ==================== Bulk insert ====================

    /// One multi-row INSERT; returns the number of inserted rows.
    pub async fn bulk_insert(&self, actors: &[NewActor]) -> StoreResult<u64> {
        if actors.is_empty() {
            return Ok(0);
        }
        let inserted = Self::insert_statement(actors).execute(&self.client).await?;
        tracing::debug!(inserted, "bulk inserted actors");
        Ok(inserted)
    }

    /// One multi-row INSERT; returns the generated keys in input order.
    pub async fn bulk_insert_with_returning_pks(&self, actors: &[NewActor]) -> StoreResult<Vec<i64>> {
        if actors.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = Self::insert_statement(actors)
            .returning("actor_id")
            .fetch_scalar_all(&self.client)
            .await?;
        tracing::debug!(inserted = ids.len(), "bulk inserted actors");
        Ok(ids)
    }

    /// One multi-row INSERT; returns the inserted rows in input order.
    pub async fn bulk_insert_with_returning(&self, actors: &[NewActor]) -> StoreResult<Vec<Actor>> {
        if actors.is_empty() {
            return Ok(Vec::new());
        }
        let saved: Vec<Actor> = Self::insert_statement(actors)
            .returning(&Self::returning_columns())
            .fetch_all_as(&self.client)
            .await?;
        tracing::debug!(inserted = saved.len(), "bulk inserted actors");
        Ok(saved)
    }

    // ==================== Update ====================

    /// Write every column of `actor` (DAO).
    pub async fn update(&self, actor: &Actor) -> StoreResult<u64> {
        self.dao.update(&self.client, actor).await
    }

    /// Partial update as a single statement setting only the concrete fields.
    ///
    /// A request without concrete fields executes nothing and returns 0.
    pub async fn update_with_request(
        &self,
        actor_id: i64,
        request: &ActorUpdateRequest,
    ) -> StoreResult<u64> {
        if request.is_noop() {
            return Ok(0);
        }
        let updated = UpdateStatement::table(ACTOR.name)
            .set_opt("first_name", request.concrete_first_name().map(str::to_string))
            .set_opt("last_name", request.concrete_last_name().map(str::to_string))
            .set_raw("last_update", "now()")
            .filter(Self::key(actor_id))
            .execute(&self.client)
            .await?;
        tracing::debug!(actor_id, updated, "partially updated actor");
        Ok(updated)
    }

    /// Partial update by read, modify in memory, write back all columns.
    ///
    /// Concurrent writers can lose updates here: a change made to a field the
    /// request leaves unset, between this read and this write, is overwritten
    /// with the value read. [`update_with_request`](Self::update_with_request)
    /// does not have this problem.
    ///
    /// A request without concrete fields executes nothing and returns 0.
    pub async fn update_with_record(
        &self,
        actor_id: i64,
        request: &ActorUpdateRequest,
    ) -> StoreResult<u64> {
        if request.is_noop() {
            return Ok(0);
        }
        let Some(mut record) = self.find_record_by_actor_id(actor_id).await? else {
            return Ok(0);
        };
        request.apply_to(&mut record);
        self.store_record(&mut record).await?;
        Ok(1)
    }

    // ==================== Delete ====================

    pub async fn delete_by_id_with_dao(&self, actor_id: i64) -> StoreResult<u64> {
        self.dao.delete_by_id(&self.client, actor_id).await
    }

    pub async fn delete_by_id(&self, actor_id: i64) -> StoreResult<u64> {
        let deleted = DeleteStatement::from_table(ACTOR.name)
            .filter(Self::key(actor_id))
            .execute(&self.client)
            .await?;
        tracing::debug!(actor_id, deleted, "deleted actor");
        Ok(deleted)
    }

    /// Delete the record's row. A record without identity deletes nothing.
    pub async fn delete_record(&self, record: &ActorRecord) -> StoreResult<u64> {
        match record.actor_id {
            Some(actor_id) => self.delete_by_id(actor_id).await,
            None => Ok(0),
        }
    }
}
