mod common;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use bytes::Bytes;
use marquee::repository::RepoError;
use mq_catalog::dto::PersonDto;
use mq_catalog::NetError;
use mq_core::{Genre, Movie, MovieId};

use common::{movie_dto, poster_url, StubCatalog, TestHarness};

fn ids(movies: &[Movie]) -> Vec<i64> {
    movies.iter().map(|m| m.id.get()).collect()
}

#[tokio::test]
async fn favorites_scenario() {
    let h = TestHarness::with_catalog(StubCatalog::with_movies(vec![movie_dto(
        326,
        "Побег из Шоушенка",
        &["драма"],
    )]));

    assert_matches!(
        h.repo.get_favorite_movies(),
        Err(RepoError::UserNotAuthenticated)
    );

    h.register("viewer@example.com");
    assert!(h.repo.get_favorite_movies().unwrap().is_empty());

    let popular = h.repo.get_popular_movies().await.unwrap();
    let movie = &popular[0];
    assert!(h.repo.toggle_favorite(movie).unwrap());

    let favorites = h.repo.get_favorite_movies().unwrap();
    assert_eq!(ids(&favorites), [326]);
    assert!(favorites[0].is_favorite);
}

#[tokio::test]
async fn popular_works_without_session_and_stores_results() {
    let h = TestHarness::with_catalog(StubCatalog::with_movies(vec![
        movie_dto(1, "One", &["drama"]),
        movie_dto(2, "Two", &["drama", "crime"]),
    ]));

    let movies = h.repo.get_popular_movies().await.unwrap();
    assert_eq!(ids(&movies), [1, 2]);
    assert!(movies.iter().all(|m| !m.is_favorite && !m.is_recent));

    let stored = h.store.get_movie(MovieId::from(2)).unwrap().unwrap();
    assert_eq!(stored.genres, vec![Genre::new("drama"), Genre::new("crime")]);

    // Both movies share the one "drama" genre.
    assert_eq!(h.store.list_genres().unwrap().len(), 2);
}

#[tokio::test]
async fn reingest_replaces_genres() {
    let h = TestHarness::with_catalog(StubCatalog::with_movies(vec![movie_dto(
        1,
        "One",
        &["drama", "crime"],
    )]));
    h.repo.get_popular_movies().await.unwrap();

    *h.catalog.movies.lock() = vec![movie_dto(1, "One", &["comedy"])];
    let movies = h.repo.get_popular_movies().await.unwrap();
    assert_eq!(movies[0].genres, vec![Genre::new("comedy")]);
}

#[tokio::test]
async fn results_carry_viewer_flags() {
    let h = TestHarness::with_catalog(StubCatalog::with_movies(vec![
        movie_dto(1, "One", &[]),
        movie_dto(2, "Two", &[]),
    ]));
    h.register("flags@example.com");

    let movies = h.repo.get_popular_movies().await.unwrap();
    h.repo.toggle_favorite(&movies[0]).unwrap();
    h.repo.add_to_recently_watched(&movies[1]).unwrap();

    let movies = h.repo.get_popular_movies().await.unwrap();
    assert!(movies[0].is_favorite && !movies[0].is_recent);
    assert!(!movies[1].is_favorite && movies[1].is_recent);

    h.repo.logout().unwrap();
    let movies = h.repo.get_popular_movies().await.unwrap();
    assert!(movies.iter().all(|m| !m.is_favorite && !m.is_recent));
}

#[tokio::test]
async fn blank_search_skips_network() {
    let h = TestHarness::new();
    assert!(h.repo.search_movies("   ").await.unwrap().is_empty());
    assert_eq!(h.catalog.fetches(), 0);
}

#[tokio::test]
async fn search_sends_trimmed_query() {
    let h = TestHarness::with_catalog(StubCatalog::with_movies(vec![movie_dto(
        435,
        "Зеленая миля",
        &[],
    )]));
    let movies = h.repo.search_movies("  green mile ").await.unwrap();
    assert_eq!(ids(&movies), [435]);
    assert_eq!(h.catalog.last_query.lock().as_deref(), Some("green mile"));
}

#[tokio::test]
async fn empty_search_result_is_ok() {
    let h = TestHarness::new();
    assert!(h.repo.search_movies("nothing").await.unwrap().is_empty());
    assert_eq!(h.catalog.fetches(), 1);
}

#[tokio::test]
async fn network_failure_surfaces() {
    let h = TestHarness::new();
    *h.catalog.offline.lock() = true;
    assert_matches!(
        h.repo.get_popular_movies().await,
        Err(RepoError::NetworkError(NetError::InvalidData(_)))
    );
}

#[tokio::test]
async fn user_scoped_operations_need_session() {
    let h = TestHarness::new();
    let movie = Movie::new(MovieId::from(1));

    assert_matches!(
        h.repo.toggle_favorite(&movie),
        Err(RepoError::UserNotAuthenticated)
    );
    assert_matches!(
        h.repo.add_to_recently_watched(&movie),
        Err(RepoError::UserNotAuthenticated)
    );
    assert_matches!(
        h.repo.get_recently_watched_movies(),
        Err(RepoError::UserNotAuthenticated)
    );
    assert_matches!(h.repo.is_favorite(&movie), Err(RepoError::UserNotAuthenticated));
}

#[tokio::test]
async fn unknown_movie_is_not_favorite() {
    let h = TestHarness::new();
    h.register("a@example.com");
    let movie = Movie::new(MovieId::from(999));
    assert!(!h.repo.is_favorite(&movie).unwrap());
    assert!(!h.repo.is_recently_watched(&movie).unwrap());
    assert!(!h.repo.remove_from_recently_watched(&movie).unwrap());
}

#[tokio::test]
async fn toggle_stores_unknown_movie_first() {
    let h = TestHarness::new();
    h.register("a@example.com");

    let mut movie = Movie::new(MovieId::from(77));
    movie.name = "Offline".into();
    movie.is_favorite = true;

    assert!(h.repo.toggle_favorite(&movie).unwrap());
    assert!(!h.repo.toggle_favorite(&movie).unwrap());

    let stored = h.repo.get_movie(MovieId::from(77)).unwrap();
    assert_eq!(stored.name, "Offline");
    assert!(!stored.is_favorite);
}

#[tokio::test]
async fn favorites_are_per_user() {
    let h = TestHarness::new();
    let movie = Movie::new(MovieId::from(5));

    h.register("first@example.com");
    h.repo.toggle_favorite(&movie).unwrap();

    h.register("second@example.com");
    assert!(h.repo.get_favorite_movies().unwrap().is_empty());
    assert!(!h.repo.get_movie(MovieId::from(5)).unwrap().is_favorite);
}

#[tokio::test]
async fn recently_watched_most_recent_first() {
    let h = TestHarness::new();
    h.register("a@example.com");
    let first = Movie::new(MovieId::from(1));
    let second = Movie::new(MovieId::from(2));

    h.repo.add_to_recently_watched(&first).unwrap();
    h.repo.add_to_recently_watched(&second).unwrap();
    assert_eq!(ids(&h.repo.get_recently_watched_movies().unwrap()), [2, 1]);

    h.repo.add_to_recently_watched(&first).unwrap();
    let recent = h.repo.get_recently_watched_movies().unwrap();
    assert_eq!(ids(&recent), [1, 2]);
    assert!(recent.iter().all(|m| m.is_recent));

    assert!(h.repo.remove_from_recently_watched(&first).unwrap());
    assert_eq!(ids(&h.repo.get_recently_watched_movies().unwrap()), [2]);
}

#[tokio::test]
async fn missing_movie_is_data_not_found() {
    let h = TestHarness::new();
    assert_matches!(
        h.repo.get_movie(MovieId::from(404)),
        Err(RepoError::DataNotFound(_))
    );
}

#[tokio::test]
async fn load_persons_replaces_crew() {
    let h = TestHarness::new();
    *h.catalog.persons.lock() = vec![
        PersonDto {
            id: Some(7987),
            name: Some("Тим Роббинс".into()),
            ..Default::default()
        },
        PersonDto {
            id: None,
            name: Some("No id".into()),
            ..Default::default()
        },
        PersonDto {
            id: Some(7986),
            name: Some("Морган Фриман".into()),
            ..Default::default()
        },
    ];

    let movie = Movie::new(MovieId::from(326));
    let persons = h.repo.load_persons(&movie).await.unwrap();
    assert_eq!(persons.len(), 2);
    assert_eq!(persons[0].name, "Тим Роббинс");

    let stored = h.repo.get_movie(MovieId::from(326)).unwrap();
    assert_eq!(stored.persons, persons);
}

#[tokio::test]
async fn image_downloaded_once() {
    let h = TestHarness::new();
    let url = poster_url(1);
    h.catalog
        .images
        .lock()
        .insert(url.clone(), Bytes::from_static(b"\x89PNG"));

    let first = h.repo.load_image(&url).await.unwrap();
    let second = h.repo.load_image(&url).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(h.catalog.downloads(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_image_loads_coalesce() {
    let h = TestHarness::new();
    let url = poster_url(2);
    h.catalog
        .images
        .lock()
        .insert(url.clone(), Bytes::from_static(b"jpeg"));
    *h.catalog.download_delay.lock() = Some(Duration::from_millis(50));

    let loads = (0..6).map(|_| {
        let repo = Arc::clone(&h.repo);
        let url = url.clone();
        tokio::spawn(async move { repo.load_image(&url).await })
    });
    for result in futures::future::join_all(loads).await {
        assert_eq!(&result.unwrap().unwrap()[..], b"jpeg");
    }
    assert_eq!(h.catalog.downloads(), 1);
}

#[tokio::test]
async fn failed_download_not_cached() {
    let h = TestHarness::new();
    let url = poster_url(3);

    assert_matches!(
        h.repo.load_image(&url).await,
        Err(RepoError::NetworkError(_))
    );
    assert!(!h.repo.images().contains(&url));

    h.catalog
        .images
        .lock()
        .insert(url.clone(), Bytes::from_static(b"ok"));
    assert!(h.repo.load_image(&url).await.is_ok());
    assert_eq!(h.catalog.downloads(), 2);
}

#[tokio::test]
async fn session_change_clears_images() {
    let h = TestHarness::new();
    let url = poster_url(4);
    h.catalog
        .images
        .lock()
        .insert(url.clone(), Bytes::from_static(b"img"));
    h.register("a@example.com");

    h.repo.load_image(&url).await.unwrap();
    assert!(h.repo.images().contains(&url));

    h.repo.logout().unwrap();
    assert!(h.repo.images().is_empty());

    h.repo.load_image(&url).await.unwrap();
    h.repo.login("a@example.com", "password123").unwrap();
    assert!(h.repo.images().is_empty());
    assert_eq!(h.catalog.downloads(), 2);
}
