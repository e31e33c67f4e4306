use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::error::ClientError;
use crate::models::{Credits, GenreList, MoviePage, ReviewPage};

pub const POSTER_BASE: &str = "https://image.tmdb.org/t/p/original";
pub const LANGUAGE: &str = "zh-CN";
pub const DEFAULT_SORT: &str = "popularity.desc";

#[async_trait]
pub trait TmdbApi: Send + Sync {
    async fn genres(&self) -> Result<GenreList, ClientError>;
    async fn discover(&self, params: &DiscoverParams) -> Result<MoviePage, ClientError>;
    async fn search(&self, params: &SearchParams) -> Result<MoviePage, ClientError>;
    async fn list(&self, category: MovieCategory, page: Option<u32>) -> Result<MoviePage, ClientError>;
    async fn reviews(&self, id: u64) -> Result<ReviewPage, ClientError>;
    async fn credits(&self, id: u64) -> Result<Credits, ClientError>;
    async fn similar(&self, id: u64) -> Result<MoviePage, ClientError>;
}

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    base_url: String,
}

/// The four fixed movie lists TMDB serves under `/movie/{category}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovieCategory {
    NowPlaying,
    Popular,
    TopRated,
    Upcoming,
}

impl MovieCategory {
    pub const ALL: [MovieCategory; 4] = [
        MovieCategory::NowPlaying,
        MovieCategory::Popular,
        MovieCategory::TopRated,
        MovieCategory::Upcoming,
    ];

    pub fn as_path(&self) -> &'static str {
        match self {
            MovieCategory::NowPlaying => "now_playing",
            MovieCategory::Popular => "popular",
            MovieCategory::TopRated => "top_rated",
            MovieCategory::Upcoming => "upcoming",
        }
    }
}

impl fmt::Display for MovieCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path())
    }
}

impl FromStr for MovieCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MovieCategory::ALL
            .into_iter()
            .find(|c| c.as_path() == s.trim())
            .ok_or_else(|| {
                format!("unknown category '{s}', expected one of now_playing, popular, top_rated, upcoming")
            })
    }
}

/// Filters for `/discover/movie`. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoverParams {
    pub primary_release_date_gte: Option<NaiveDate>,
    pub primary_release_date_lte: Option<NaiveDate>,
    pub vote_average_gte: Option<f64>,
    pub vote_average_lte: Option<f64>,
    pub vote_count_gte: Option<u32>,
    pub with_runtime_gte: Option<u32>,
    pub with_runtime_lte: Option<u32>,
    pub with_genres: Vec<u32>,
    pub with_original_language: Option<String>,
    /// Defaults to `popularity.desc`.
    pub sort_by: Option<String>,
    /// Defaults to 1.
    pub page: Option<u32>,
}

impl DiscoverParams {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut q = vec![("language", LANGUAGE.to_string())];
        let date = |d: &NaiveDate| d.format("%Y-%m-%d").to_string();

        if let Some(d) = &self.primary_release_date_gte {
            q.push(("primary_release_date.gte", date(d)));
        }
        if let Some(d) = &self.primary_release_date_lte {
            q.push(("primary_release_date.lte", date(d)));
        }
        if let Some(v) = self.vote_average_gte {
            q.push(("vote_average.gte", v.to_string()));
        }
        if let Some(v) = self.vote_average_lte {
            q.push(("vote_average.lte", v.to_string()));
        }
        if let Some(v) = self.vote_count_gte {
            q.push(("vote_count.gte", v.to_string()));
        }
        if let Some(v) = self.with_runtime_gte {
            q.push(("with_runtime.gte", v.to_string()));
        }
        if let Some(v) = self.with_runtime_lte {
            q.push(("with_runtime.lte", v.to_string()));
        }
        if !self.with_genres.is_empty() {
            let ids = self
                .with_genres
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(",");
            q.push(("with_genres", ids));
        }
        if let Some(lang) = non_blank(self.with_original_language.as_deref()) {
            q.push(("with_original_language", lang.to_string()));
        }
        let sort = non_blank(self.sort_by.as_deref()).unwrap_or(DEFAULT_SORT);
        q.push(("sort_by", sort.to_string()));
        q.push(("page", self.page.unwrap_or(1).to_string()));
        q
    }
}

/// Free-text search for `/search/movie`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchParams {
    pub query: String,
    pub page: Option<u32>,
    pub region: Option<String>,
    pub year: Option<String>,
}

impl SearchParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut q = vec![("query", self.query.clone())];
        if let Some(page) = self.page {
            q.push(("page", page.to_string()));
        }
        if let Some(region) = non_blank(self.region.as_deref()) {
            q.push(("region", region.to_string()));
        }
        if let Some(year) = non_blank(self.year.as_deref()) {
            q.push(("year", year.to_string()));
        }
        q.push(("language", LANGUAGE.to_string()));
        q
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl TmdbClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.tmdb_token))
            .context("TMDB token is not a valid header value")?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(config.http_timeout)
            .user_agent(format!("cinescope/{}", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .context("Failed to build TMDB HTTP client")?;
        Ok(Self {
            client,
            base_url: config.tmdb_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("{operation}: GET {url} {:?}", query);

        let res = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                warn!("{operation}: request failed: {e}");
                ClientError::transport(operation, e)
            })?;
        let status = res.status();
        let text = res.text().await.map_err(|e| {
            let e = e.without_url();
            warn!("{operation}: reading body failed: {e}");
            ClientError::transport(operation, e)
        })?;

        let failure = serde_json::from_str::<TmdbStatus>(&text).ok();
        if !status.is_success() {
            warn!("{operation}: HTTP {status}: {text}");
            return Err(match failure {
                Some(TmdbStatus {
                    status_code,
                    status_message: Some(message),
                    ..
                }) => ClientError::Http {
                    operation,
                    status,
                    code: status_code.map(|c| c.to_string()),
                    message,
                },
                _ => ClientError::Http {
                    operation,
                    status,
                    code: None,
                    message: text,
                },
            });
        }
        if let Some(TmdbStatus {
            success: Some(false),
            status_code,
            status_message,
        }) = failure
        {
            let message = status_message.unwrap_or_else(|| "request unsuccessful".to_string());
            warn!("{operation}: provider rejected request: {message}");
            return Err(ClientError::Rejected {
                operation,
                code: status_code.map(|c| c.to_string()).unwrap_or_default(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            warn!("{operation}: unexpected body: {e}");
            ClientError::decode(operation, e)
        })
    }
}

/// Status block TMDB attaches to failed requests.
#[derive(Debug, Deserialize)]
struct TmdbStatus {
    success: Option<bool>,
    status_code: Option<i64>,
    status_message: Option<String>,
}

fn language_only() -> Vec<(&'static str, String)> {
    vec![("language", LANGUAGE.to_string())]
}

#[async_trait]
impl TmdbApi for TmdbClient {
    async fn genres(&self) -> Result<GenreList, ClientError> {
        self.get_json("tmdb.genres", "/genre/movie/list", &language_only())
            .await
    }

    async fn discover(&self, params: &DiscoverParams) -> Result<MoviePage, ClientError> {
        self.get_json("tmdb.discover", "/discover/movie", &params.to_query())
            .await
    }

    async fn search(&self, params: &SearchParams) -> Result<MoviePage, ClientError> {
        self.get_json("tmdb.search", "/search/movie", &params.to_query())
            .await
    }

    async fn list(&self, category: MovieCategory, page: Option<u32>) -> Result<MoviePage, ClientError> {
        let path = format!("/movie/{}", category.as_path());
        let query = vec![
            ("language", LANGUAGE.to_string()),
            ("page", page.unwrap_or(1).to_string()),
        ];
        self.get_json("tmdb.list", &path, &query).await
    }

    async fn reviews(&self, id: u64) -> Result<ReviewPage, ClientError> {
        self.get_json("tmdb.reviews", &format!("/movie/{id}/reviews"), &[])
            .await
    }

    async fn credits(&self, id: u64) -> Result<Credits, ClientError> {
        self.get_json("tmdb.credits", &format!("/movie/{id}/credits"), &language_only())
            .await
    }

    async fn similar(&self, id: u64) -> Result<MoviePage, ClientError> {
        self.get_json("tmdb.similar", &format!("/movie/{id}/similar"), &language_only())
            .await
    }
}

pub fn parse_tmdb_id(input: &str) -> Option<u64> {
    let input = input.trim();
    if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
        return input.parse().ok();
    }
    None
}

pub fn poster_url(path: Option<&str>) -> Option<String> {
    path.filter(|p| !p.is_empty())
        .map(|p| format!("{POSTER_BASE}{p}"))
}

pub fn extract_year(date: &str) -> Option<String> {
    date.split('-')
        .next()
        .filter(|y| y.len() == 4)
        .map(|s| s.to_string())
}
