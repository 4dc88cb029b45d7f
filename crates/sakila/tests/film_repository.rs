//! Film repositories against a live database.

#[macro_use]
mod common;

use common::SEEDED_FILM_IDS;
use rust_decimal::Decimal;
use sakila::{FilmDaoRepository, FilmRepository, Pageable, PriceCategory};

fn film_ids(films: &[sakila::Film]) -> Vec<i64> {
    films.iter().map(|f| f.film_id).collect()
}

#[tokio::test]
async fn find_by_id_and_simple_info() {
    let client = connect_or_skip!();
    let films = FilmRepository::new(&client);

    let film = films.find_by_id(5).await.unwrap().unwrap();
    assert_eq!(film.title, "EGG IGBY");
    assert_eq!(film.length, Some(67));
    assert_eq!(film.rental_rate, Decimal::new(299, 2));

    let info = films.find_simple_info_by_id(5).await.unwrap().unwrap();
    assert_eq!(info.film_id, 5);
    assert_eq!(info.title, film.title);
    assert_eq!(info.description, film.description);

    assert!(films.find_by_id(999_999).await.unwrap().is_none());
    assert!(films.find_simple_info_by_id(999_999).await.unwrap().is_none());
}

#[tokio::test]
async fn film_with_actor_list_includes_films_without_actors() {
    let client = connect_or_skip!();
    let films = FilmRepository::new(&client);

    let rows = films
        .find_film_with_actor_list(&Pageable::new(0, 100))
        .await
        .unwrap();

    let ids: Vec<i64> = rows.iter().map(|r| r.film_id()).collect();
    assert_eq!(ids, vec![1, 1, 2, 3, 4, 5, 5, 6, 6, 7]);

    assert_eq!(rows[0].film_title(), "ACADEMY DINOSAUR");
    assert_eq!(rows[0].actor_full_name().as_deref(), Some("PENELOPE GUINESS"));
    let link = rows[0].film_actor.as_ref().unwrap();
    assert_eq!((link.actor_id, link.film_id), (1, 1));

    let divorce = rows.last().unwrap();
    assert_eq!(divorce.film_title(), "DIVORCE SHINING");
    assert!(divorce.film_actor.is_none());
    assert!(divorce.actor.is_none());
    assert_eq!(divorce.actor_full_name(), None);
}

#[tokio::test]
async fn film_with_actor_list_pages() {
    let client = connect_or_skip!();
    let films = FilmRepository::new(&client);

    let all = films
        .find_film_with_actor_list(&Pageable::new(0, 100))
        .await
        .unwrap();
    let second = films
        .find_film_with_actor_list(&Pageable::new(1, 4))
        .await
        .unwrap();
    assert_eq!(second, all[4..8].to_vec());

    let past_end = films
        .find_film_with_actor_list(&Pageable::new(50, 4))
        .await
        .unwrap();
    assert!(past_end.is_empty());
}

#[tokio::test]
async fn path_joins_match_the_handwritten_join() {
    let client = connect_or_skip!();
    let films = FilmRepository::new(&client);

    for pageable in [Pageable::new(0, 100), Pageable::new(0, 3), Pageable::new(2, 3)] {
        let base = films.find_film_with_actor_list(&pageable).await.unwrap();
        let explicit = films
            .find_film_with_actor_list_by_explicit_path_join(&pageable)
            .await
            .unwrap();
        let implicit = films
            .find_film_with_actor_list_by_implicit_path_join(&pageable)
            .await
            .unwrap();
        assert_eq!(explicit, base);
        assert_eq!(implicit, base);
    }
}

#[tokio::test]
async fn price_summary_categorizes_rates_and_counts_copies() {
    let client = connect_or_skip!();
    let films = FilmRepository::new(&client);

    let egg = films.find_film_price_summary_by_film_title("EGG").await.unwrap();
    assert_eq!(egg.len(), 1);
    assert_eq!(egg[0].film_id, 5);
    assert_eq!(egg[0].film_title, "EGG IGBY");
    assert_eq!(egg[0].price_category, PriceCategory::Normal);
    assert_eq!(egg[0].inventory_count, 2);

    let all = films.find_film_price_summary_by_film_title("").await.unwrap();
    let ids: Vec<i64> = all.iter().map(|s| s.film_id).collect();
    assert_eq!(ids, SEEDED_FILM_IDS.to_vec());

    let academy = &all[0];
    assert_eq!(academy.price_category, PriceCategory::Cheap);
    assert_eq!(academy.rental_rate, Decimal::new(99, 2));
    assert_eq!(academy.inventory_count, 3);

    assert_eq!(all[1].price_category, PriceCategory::Expensive);
    assert_eq!(all[6].inventory_count, 0);
}

#[tokio::test]
async fn rental_summary_orders_longest_first() {
    let client = connect_or_skip!();
    let films = FilmRepository::new(&client);

    let summary = films
        .find_film_rental_summary_by_film_title_order_by_rental_duration("")
        .await
        .unwrap();

    let order: Vec<(i64, Option<f64>)> = summary
        .iter()
        .map(|s| (s.film_id, s.rental_duration))
        .collect();
    assert_eq!(
        order,
        vec![
            (5, Some(7.0)),
            (1, Some(4.0)),
            (2, Some(2.0)),
            (3, None),
            (4, None),
            (6, None),
            (7, None),
        ]
    );

    let filtered = films
        .find_film_rental_summary_by_film_title_order_by_rental_duration("AC")
        .await
        .unwrap();
    let ids: Vec<i64> = filtered.iter().map(|s| s.film_id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn rented_films_require_a_rental() {
    let client = connect_or_skip!();
    let films = FilmRepository::new(&client);

    let all = films.find_rented_films_by_film_title("").await.unwrap();
    assert_eq!(film_ids(&all), vec![1, 2, 5, 6]);

    let with_a = films.find_rented_films_by_film_title("A").await.unwrap();
    assert_eq!(film_ids(&with_a), vec![1, 2, 6]);

    let never_rented = films
        .find_rented_films_by_film_title("DIVORCE")
        .await
        .unwrap();
    assert!(never_rented.is_empty());
}

#[tokio::test]
async fn title_arguments_filter_literally_even_when_blank() {
    let client = connect_or_skip!();
    let films = FilmRepository::new(&client);

    // No seeded title contains two consecutive spaces.
    assert!(
        films
            .find_film_price_summary_by_film_title("  ")
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        films
            .find_film_rental_summary_by_film_title_order_by_rental_duration("  ")
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        films
            .find_rented_films_by_film_title("  ")
            .await
            .unwrap()
            .is_empty()
    );

    let single_space = films
        .find_film_price_summary_by_film_title(" ")
        .await
        .unwrap();
    assert_eq!(single_space.len(), SEEDED_FILM_IDS.len());
}

#[tokio::test]
async fn dao_repository_reads() {
    let client = connect_or_skip!();
    let films = FilmDaoRepository::new(&client);

    let film = films.find_by_id(3).await.unwrap().unwrap();
    assert_eq!(film.title, "ADAPTATION HOLES");
    assert!(films.find_by_id(999_999).await.unwrap().is_none());

    let info = films.find_simple_info_by_id(3).await.unwrap().unwrap();
    assert_eq!(info.title, "ADAPTATION HOLES");

    let rows = films
        .find_film_with_actor_list(&Pageable::new(0, 2))
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn dao_range_bounds_are_inclusive_and_optional() {
    let client = connect_or_skip!();
    let films = FilmDaoRepository::new(&client);

    let between = films.find_by_range_between(Some(45), Some(60)).await.unwrap();
    assert_eq!(film_ids(&between), vec![2, 3, 6, 7]);

    let up_to = films.find_by_range_between(None, Some(50)).await.unwrap();
    assert_eq!(film_ids(&up_to), vec![2, 3, 7]);

    let from = films.find_by_range_between(Some(100), None).await.unwrap();
    assert_eq!(film_ids(&from), vec![4]);

    let unbounded = films.find_by_range_between(None, None).await.unwrap();
    assert_eq!(film_ids(&unbounded), SEEDED_FILM_IDS.to_vec());
}
