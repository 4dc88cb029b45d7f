use super::actor::Actor;
use crate::dao::Table;
use crate::error::{StoreError, StoreResult};
use crate::row::{FromPrefixedRow, FromRow, PrefixedRow, RowExt};
use crate::schema::{FILM, TableDef};
use crate::sql::Param;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tokio_postgres::Row;

/// A row of `film`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Film {
    pub film_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub release_year: Option<i32>,
    pub rental_duration: i16,
    pub rental_rate: Decimal,
    pub length: Option<i16>,
    pub replacement_cost: Decimal,
    pub last_update: DateTime<Utc>,
}

impl FromPrefixedRow for Film {
    const KEY_COLUMN: &'static str = "film_id";

    fn from_prefixed(row: PrefixedRow<'_>) -> StoreResult<Self> {
        Ok(Self {
            film_id: row.get("film_id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            release_year: row.get("release_year")?,
            rental_duration: row.get("rental_duration")?,
            rental_rate: row.get("rental_rate")?,
            length: row.get("length")?,
            replacement_cost: row.get("replacement_cost")?,
            last_update: row.get("last_update")?,
        })
    }
}

impl FromRow for Film {
    fn from_row(row: &Row) -> StoreResult<Self> {
        Self::from_prefixed(PrefixedRow::plain(row))
    }
}

impl Table for Film {
    const DEF: &'static TableDef = &FILM;

    type Id = i64;

    fn id(&self) -> i64 {
        self.film_id
    }

    fn column_values(&self) -> Vec<(&'static str, Param)> {
        vec![
            ("title", Param::new(self.title.clone())),
            ("description", Param::new(self.description.clone())),
            ("release_year", Param::new(self.release_year)),
            ("rental_duration", Param::new(self.rental_duration)),
            ("rental_rate", Param::new(self.rental_rate)),
            ("length", Param::new(self.length)),
            ("replacement_cost", Param::new(self.replacement_cost)),
            ("last_update", Param::new(self.last_update)),
        ]
    }
}

/// A row of the `film_actor` bridge table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilmActor {
    pub actor_id: i64,
    pub film_id: i64,
    pub last_update: DateTime<Utc>,
}

impl FromPrefixedRow for FilmActor {
    const KEY_COLUMN: &'static str = "actor_id";

    fn from_prefixed(row: PrefixedRow<'_>) -> StoreResult<Self> {
        Ok(Self {
            actor_id: row.get("actor_id")?,
            film_id: row.get("film_id")?,
            last_update: row.get("last_update")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleFilmInfo {
    pub film_id: i64,
    pub title: String,
    pub description: Option<String>,
}

impl FromRow for SimpleFilmInfo {
    fn from_row(row: &Row) -> StoreResult<Self> {
        Ok(Self {
            film_id: row.try_get_column("film_id")?,
            title: row.try_get_column("title")?,
            description: row.try_get_column("description")?,
        })
    }
}

/// One row of `film LEFT JOIN film_actor LEFT JOIN actor`.
///
/// Columns are expected under the `film__`, `film_actor__` and `actor__` prefixes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilmWithActor {
    pub film: Film,
    pub film_actor: Option<FilmActor>,
    pub actor: Option<Actor>,
}

impl FilmWithActor {
    pub const FILM_PREFIX: &'static str = "film__";
    pub const FILM_ACTOR_PREFIX: &'static str = "film_actor__";
    pub const ACTOR_PREFIX: &'static str = "actor__";

    pub fn film_title(&self) -> &str {
        &self.film.title
    }

    pub fn film_id(&self) -> i64 {
        self.film.film_id
    }

    /// `"first last"`, or `None` for a film without actors.
    pub fn actor_full_name(&self) -> Option<String> {
        self.actor.as_ref().map(Actor::full_name)
    }
}

impl FromRow for FilmWithActor {
    fn from_row(row: &Row) -> StoreResult<Self> {
        Ok(Self {
            film: Film::from_prefixed(PrefixedRow::new(row, Self::FILM_PREFIX))?,
            film_actor: FilmActor::from_prefixed_opt(PrefixedRow::new(
                row,
                Self::FILM_ACTOR_PREFIX,
            ))?,
            actor: Actor::from_prefixed_opt(PrefixedRow::new(row, Self::ACTOR_PREFIX))?,
        })
    }
}

/// Price band of a film's rental rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriceCategory {
    Cheap,
    Normal,
    Expensive,
}

impl PriceCategory {
    pub const ALL: [PriceCategory; 3] = [Self::Cheap, Self::Normal, Self::Expensive];

    pub fn code(self) -> &'static str {
        match self {
            PriceCategory::Cheap => "Cheap",
            PriceCategory::Normal => "Normal",
            PriceCategory::Expensive => "Expensive",
        }
    }

    /// Look up a category by code, ignoring case.
    pub fn of(code: &str) -> StoreResult<Self> {
        match code.to_ascii_lowercase().as_str() {
            "cheap" => Ok(Self::Cheap),
            "normal" => Ok(Self::Normal),
            "expensive" => Ok(Self::Expensive),
            _ => Err(StoreError::invalid_argument(format!(
                "Unknown price category: {code}"
            ))),
        }
    }

    /// SQL `CASE` deriving the category code from a rental-rate expression.
    ///
    /// Rates up to 1.00 are cheap, up to 3.00 normal, anything above expensive.
    pub fn case_expr(rate_expr: &str) -> String {
        format!(
            "CASE WHEN {rate_expr} <= 1.0 THEN '{}' WHEN {rate_expr} <= 3.0 THEN '{}' ELSE '{}' END",
            Self::Cheap.code(),
            Self::Normal.code(),
            Self::Expensive.code()
        )
    }
}

impl fmt::Display for PriceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for PriceCategory {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::of(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilmPriceSummary {
    pub film_id: i64,
    pub film_title: String,
    pub rental_rate: Decimal,
    pub price_category: PriceCategory,
    pub inventory_count: i64,
}

impl FromRow for FilmPriceSummary {
    fn from_row(row: &Row) -> StoreResult<Self> {
        let code: String = row.try_get_column("price_category")?;
        Ok(Self {
            film_id: row.try_get_column("film_id")?,
            film_title: row.try_get_column("film_title")?,
            rental_rate: row.try_get_column("rental_rate")?,
            price_category: PriceCategory::of(&code)?,
            inventory_count: row.try_get_column("inventory_count")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmRentalSummary {
    pub film_id: i64,
    pub film_title: String,
    /// Average whole days between rental and return; `None` without returned rentals.
    pub rental_duration: Option<f64>,
}

impl FromRow for FilmRentalSummary {
    fn from_row(row: &Row) -> StoreResult<Self> {
        Ok(Self {
            film_id: row.try_get_column("film_id")?,
            film_title: row.try_get_column("film_title")?,
            rental_duration: row.try_get_column("rental_duration")?,
        })
    }
}
