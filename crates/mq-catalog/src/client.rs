//! The [`CatalogClient`] trait and its reqwest implementation.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use mq_core::MovieId;
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::dto::{MovieListDto, PersonListDto};
use crate::error::NetError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const DEFAULT_BASE_URL: &str = "https://api.kinopoisk.dev/v1.4";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_PAGE_SIZE: u32 = 50;
const API_KEY_HEADER: &str = "X-API-KEY";

/// Fields requested for list endpoints. Keeps payloads small.
const MOVIE_FIELDS: &[&str] = &[
    "id",
    "name",
    "alternativeName",
    "enName",
    "poster",
    "movieLength",
    "premiere",
    "year",
    "genres",
    "rating",
    "votes",
    "description",
    "shortDescription",
    "persons",
    "videos",
];

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Remote catalog operations. Implemented over HTTP by
/// [`HttpCatalogClient`] and by stubs in tests.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Popular movies when `query` is `None`, otherwise a text search.
    async fn fetch_movies(&self, query: Option<&str>) -> Result<MovieListDto, NetError>;

    /// Cast and crew of one movie.
    async fn fetch_persons_by_movie(&self, movie_id: MovieId) -> Result<PersonListDto, NetError>;

    /// Raw bytes behind an absolute URL (posters, photos).
    async fn download_bytes(&self, url: &str) -> Result<Bytes, NetError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// Connection settings for [`HttpCatalogClient`].
#[derive(Debug, Clone)]
pub struct CatalogClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
    pub page_size: u32,
}

impl Default for CatalogClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            timeout: REQUEST_TIMEOUT,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Catalog client over reqwest.
pub struct HttpCatalogClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    page_size: u32,
}

impl HttpCatalogClient {
    /// Build a client. Fails with [`NetError::BadUrl`] if the base URL does
    /// not parse.
    pub fn new(config: CatalogClientConfig) -> Result<Self, NetError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| NetError::BadUrl(format!("{base_url}: {e}")))?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(NetError::RequestFailed)?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key,
            page_size: config.page_size,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, NetError> {
        let raw = format!("{}{path}", self.base_url);
        Url::parse(&raw).map_err(|e| NetError::BadUrl(format!("{raw}: {e}")))
    }

    /// GET `url` with the API key and decode a JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, NetError> {
        debug!(url = %url, "Catalog request");
        let body = self.send(self.client.get(url).header(API_KEY_HEADER, &self.api_key)).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Send a request and return the body of a non-empty success response.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Bytes, NetError> {
        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(NetError::InvalidData(format!(
                "unexpected status {status} from {}",
                resp.url()
            )));
        }
        let body = resp.bytes().await?;
        if body.is_empty() {
            return Err(NetError::InvalidData("empty response body".into()));
        }
        Ok(body)
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn fetch_movies(&self, query: Option<&str>) -> Result<MovieListDto, NetError> {
        let limit = self.page_size.to_string();
        let url = match query {
            Some(q) => {
                let mut url = self.endpoint("/movie/search")?;
                url.query_pairs_mut()
                    .append_pair("page", "1")
                    .append_pair("limit", &limit)
                    .append_pair("query", q);
                url
            }
            None => {
                let mut url = self.endpoint("/movie")?;
                {
                    let mut pairs = url.query_pairs_mut();
                    pairs
                        .append_pair("page", "1")
                        .append_pair("limit", &limit)
                        .append_pair("sortField", "votes.kp")
                        .append_pair("sortType", "-1");
                    for field in MOVIE_FIELDS {
                        pairs.append_pair("selectFields", field);
                    }
                }
                url
            }
        };
        self.get_json(url).await
    }

    async fn fetch_persons_by_movie(&self, movie_id: MovieId) -> Result<PersonListDto, NetError> {
        let mut url = self.endpoint("/person")?;
        url.query_pairs_mut()
            .append_pair("page", "1")
            .append_pair("limit", &self.page_size.to_string())
            .append_pair("movies.id", &movie_id.to_string());
        self.get_json(url).await
    }

    async fn download_bytes(&self, url: &str) -> Result<Bytes, NetError> {
        let url = Url::parse(url).map_err(|e| NetError::BadUrl(format!("{url}: {e}")))?;
        debug!(url = %url, "Downloading");
        self.send(self.client.get(url)).await
    }
}
