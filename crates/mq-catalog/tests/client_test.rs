use std::time::Duration;

use mq_catalog::{CatalogClient, CatalogClientConfig, HttpCatalogClient, NetError};
use mq_core::MovieId;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> HttpCatalogClient {
    HttpCatalogClient::new(CatalogClientConfig {
        base_url: server.uri(),
        api_key: "test-key".into(),
        timeout: Duration::from_millis(500),
        page_size: 10,
    })
    .unwrap()
}

#[tokio::test]
async fn popular_sends_key_and_sort() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie"))
        .and(header("X-API-KEY", "test-key"))
        .and(query_param("sortField", "votes.kp"))
        .and(query_param("sortType", "-1"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "docs": [{ "id": 326, "name": "Побег из Шоушенка" }],
            "total": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let list = client(&server).fetch_movies(None).await.unwrap();
    assert_eq!(list.docs.len(), 1);
    assert_eq!(list.docs[0].id, Some(326));
}

#[tokio::test]
async fn search_uses_search_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/search"))
        .and(query_param("query", "green mile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "docs": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let list = client(&server).fetch_movies(Some("green mile")).await.unwrap();
    assert!(list.docs.is_empty());
}

#[tokio::test]
async fn persons_filtered_by_movie() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/person"))
        .and(query_param("movies.id", "435"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "docs": [{ "id": 9144, "name": "Том Хэнкс", "profession": [{ "value": "Актер" }] }]
        })))
        .mount(&server)
        .await;

    let list = client(&server)
        .fetch_persons_by_movie(MovieId::from(435))
        .await
        .unwrap();
    assert_eq!(list.docs[0].id, Some(9144));
}

#[tokio::test]
async fn error_status_is_invalid_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client(&server).fetch_movies(None).await.unwrap_err();
    assert!(matches!(err, NetError::InvalidData(_)), "{err:?}");
}

#[tokio::test]
async fn empty_body_is_invalid_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = client(&server)
        .download_bytes(&format!("{}/poster.jpg", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, NetError::InvalidData(_)), "{err:?}");
}

#[tokio::test]
async fn schema_mismatch_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"docs\": 5}"))
        .mount(&server)
        .await;

    let err = client(&server).fetch_movies(None).await.unwrap_err();
    assert!(matches!(err, NetError::DecodeError(_)), "{err:?}");
}

#[tokio::test]
async fn slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "docs": [] }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let err = client(&server).fetch_movies(None).await.unwrap_err();
    assert!(matches!(err, NetError::RequestFailed(_)), "{err:?}");
}

#[tokio::test]
async fn download_returns_raw_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/poster.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, 0xFF]))
        .mount(&server)
        .await;

    let bytes = client(&server)
        .download_bytes(&format!("{}/poster.jpg", server.uri()))
        .await
        .unwrap();
    assert_eq!(&bytes[..], &[0xFF, 0xD8, 0xFF]);
}

#[tokio::test]
async fn malformed_download_url_fails_fast() {
    let server = MockServer::start().await;
    let err = client(&server).download_bytes("::not a url").await.unwrap_err();
    assert!(matches!(err, NetError::BadUrl(_)), "{err:?}");
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}
