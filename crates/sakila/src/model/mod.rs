//! Value types read from and written to the store.

mod actor;
mod film;
mod page;

pub use actor::{
    Actor, ActorFilmography, ActorFilmographySearchOption, ActorRecord, ActorUpdateRequest,
    NewActor,
};
pub use film::{
    Film, FilmActor, FilmPriceSummary, FilmRentalSummary, FilmWithActor, PriceCategory,
    SimpleFilmInfo,
};
pub use page::Pageable;
