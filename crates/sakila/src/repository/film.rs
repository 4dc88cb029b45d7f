use crate::client::GenericClient;
use crate::condition::Condition;
use crate::dao::Dao;
use crate::error::StoreResult;
use crate::model::{
    Film, FilmPriceSummary, FilmRentalSummary, FilmWithActor, Pageable, PriceCategory,
    SimpleFilmInfo,
};
use crate::schema::{
    ACTOR, FILM, FILM_ACTOR, FILM_ACTOR_ACTOR_FK, FILM_ACTOR_FILM_FK, INVENTORY, JoinKind,
    JoinPath, RENTAL, RENTAL_INVENTORY_FK,
};
use crate::sql::{Sql, sql};

/// Reads over `film` and its relations.
pub struct FilmRepository<C> {
    client: C,
}

impl<C: GenericClient> FilmRepository<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn key(film_id: i64) -> Condition {
        Condition::eq("film.film_id", film_id)
    }

    fn film_with_actor_select(tag: &str) -> Sql {
        sql(format!(
            "SELECT {}, {}, {} FROM ",
            FILM.aliased_columns(FilmWithActor::FILM_PREFIX),
            FILM_ACTOR.aliased_columns(FilmWithActor::FILM_ACTOR_PREFIX),
            ACTOR.aliased_columns(FilmWithActor::ACTOR_PREFIX)
        ))
        .tagged(format!("film.{tag}"))
    }

    async fn film_with_actor_page(
        &self,
        mut q: Sql,
        pageable: &Pageable,
    ) -> StoreResult<Vec<FilmWithActor>> {
        q.push(" ORDER BY film.film_id, actor.actor_id")
            .limit_offset(pageable.limit(), pageable.offset());
        q.fetch_all_as(&self.client).await
    }

    pub async fn find_by_id(&self, film_id: i64) -> StoreResult<Option<Film>> {
        let mut q = sql(format!("SELECT {} FROM film", FILM.column_list())).tagged("film.find_by_id");
        q.push_where(&Self::key(film_id));
        q.fetch_opt_as(&self.client).await
    }

    pub async fn find_simple_info_by_id(&self, film_id: i64) -> StoreResult<Option<SimpleFilmInfo>> {
        let mut q = sql("SELECT film.film_id, film.title, film.description FROM film")
            .tagged("film.find_simple_info_by_id");
        q.push_where(&Self::key(film_id));
        q.fetch_opt_as(&self.client).await
    }

    /// One row per (film, actor) pair, films without actors included once with
    /// no actor. Ordered by film id then actor id.
    pub async fn find_film_with_actor_list(
        &self,
        pageable: &Pageable,
    ) -> StoreResult<Vec<FilmWithActor>> {
        let mut q = Self::film_with_actor_select("find_film_with_actor_list");
        q.push(
            "film \
             LEFT JOIN film_actor ON film.film_id = film_actor.film_id \
             LEFT JOIN actor ON film_actor.actor_id = actor.actor_id",
        );
        self.film_with_actor_page(q, pageable).await
    }

    /// [`find_film_with_actor_list`](Self::find_film_with_actor_list) with the
    /// join path spelled out table by table.
    pub async fn find_film_with_actor_list_by_explicit_path_join(
        &self,
        pageable: &Pageable,
    ) -> StoreResult<Vec<FilmWithActor>> {
        let path = JoinPath::from(&FILM)
            .join_on(JoinKind::Left, &FILM_ACTOR, "film_actor.film_id = film.film_id")
            .join_on(JoinKind::Left, &ACTOR, "film_actor.actor_id = actor.actor_id");

        let mut q = Self::film_with_actor_select("find_film_with_actor_list_by_explicit_path_join");
        q.push_join_path(&path);
        self.film_with_actor_page(q, pageable).await
    }

    /// [`find_film_with_actor_list`](Self::find_film_with_actor_list) with the
    /// joins derived from the foreign keys.
    pub async fn find_film_with_actor_list_by_implicit_path_join(
        &self,
        pageable: &Pageable,
    ) -> StoreResult<Vec<FilmWithActor>> {
        let path = JoinPath::from(&FILM)
            .join_via(JoinKind::Left, &FILM_ACTOR_FILM_FK)?
            .join_via(JoinKind::Left, &FILM_ACTOR_ACTOR_FK)?;

        let mut q = Self::film_with_actor_select("find_film_with_actor_list_by_implicit_path_join");
        q.push_join_path(&path);
        self.film_with_actor_page(q, pageable).await
    }

    /// Rate, price category and number of inventory copies of every film whose
    /// title contains `film_title`.
    ///
    /// The title filter always applies: an empty string matches every film and
    /// whitespace is matched literally.
    pub async fn find_film_price_summary_by_film_title(
        &self,
        film_title: &str,
    ) -> StoreResult<Vec<FilmPriceSummary>> {
        let mut q = sql(format!(
            "SELECT film.film_id, film.title AS film_title, film.rental_rate, \
             {} AS price_category, \
             (SELECT COUNT(*) FROM inventory WHERE inventory.film_id = film.film_id) AS inventory_count \
             FROM film",
            PriceCategory::case_expr("film.rental_rate")
        ))
        .tagged("film.find_film_price_summary_by_film_title");
        q.push_where(&Condition::contains("film.title", film_title))
            .push(" ORDER BY film.film_id");
        q.fetch_all_as(&self.client).await
    }

    /// Average rental length in days per film, longest first; films never
    /// returned from a rental come last.
    pub async fn find_film_rental_summary_by_film_title_order_by_rental_duration(
        &self,
        film_title: &str,
    ) -> StoreResult<Vec<FilmRentalSummary>> {
        let rentals = JoinPath::from(&RENTAL).join_via(JoinKind::Inner, &RENTAL_INVENTORY_FK)?;

        let mut q = sql(
            "SELECT film.film_id, film.title AS film_title, \
             rental_duration_info.average_rental_duration AS rental_duration \
             FROM film LEFT JOIN (SELECT inventory.film_id, \
             AVG(EXTRACT(DAY FROM (rental.return_date - rental.rental_date)))::float8 AS average_rental_duration \
             FROM ",
        )
        .tagged("film.find_film_rental_summary_by_film_title_order_by_rental_duration");
        q.push_join_path(&rentals)
            .push_where(&Condition::is_not_null("rental.return_date"))
            .push(
                " GROUP BY inventory.film_id) AS rental_duration_info \
                 ON film.film_id = rental_duration_info.film_id",
            )
            .push_where(&Condition::contains("film.title", film_title))
            .push(" ORDER BY rental_duration_info.average_rental_duration DESC NULLS LAST, film.film_id");
        q.fetch_all_as(&self.client).await
    }

    /// Films whose title contains `film_title` and that were rented at least once.
    pub async fn find_rented_films_by_film_title(&self, film_title: &str) -> StoreResult<Vec<Film>> {
        let copies = JoinPath::from(&INVENTORY).join_via(JoinKind::Inner, &RENTAL_INVENTORY_FK)?;
        let mut rented = sql("SELECT 1 FROM ");
        rented
            .push_join_path(&copies)
            .push(" WHERE inventory.film_id = film.film_id");

        let filter = Condition::all([
            Condition::contains("film.title", film_title),
            Condition::exists(rented),
        ]);

        let mut q = sql(format!("SELECT {} FROM film", FILM.column_list()))
            .tagged("film.find_rented_films_by_film_title");
        q.push_where(&filter).push(" ORDER BY film.film_id");
        q.fetch_all_as(&self.client).await
    }
}

/// Film reads backed by the generic [`Dao`].
pub struct FilmDaoRepository<C> {
    films: FilmRepository<C>,
    dao: Dao<Film>,
}

impl<C: GenericClient> FilmDaoRepository<C> {
    pub fn new(client: C) -> Self {
        Self {
            films: FilmRepository::new(client),
            dao: Dao::new(),
        }
    }

    pub async fn find_by_id(&self, film_id: i64) -> StoreResult<Option<Film>> {
        self.dao.find_by_id(self.films.client(), film_id).await
    }

    /// Films whose length lies in `[from, to]`; a missing bound is open.
    pub async fn find_by_range_between(
        &self,
        from: Option<i16>,
        to: Option<i16>,
    ) -> StoreResult<Vec<Film>> {
        self.dao
            .fetch_range_of(self.films.client(), "length", from, to)
            .await
    }

    pub async fn find_simple_info_by_id(&self, film_id: i64) -> StoreResult<Option<SimpleFilmInfo>> {
        self.films.find_simple_info_by_id(film_id).await
    }

    pub async fn find_film_with_actor_list(
        &self,
        pageable: &Pageable,
    ) -> StoreResult<Vec<FilmWithActor>> {
        self.films.find_film_with_actor_list(pageable).await
    }
}
