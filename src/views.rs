//! View modules behind the route table.
//!
//! Clients hand back provider payloads untouched; shaping them for display
//! happens here.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{info, warn};

use crate::amap::{Coordinate, DEFAULT_CITY_CODE};
use crate::app::AppState;
use crate::error::AppError;
use crate::models::{CinemaPoi, GenreList, MovieCredit, MoviePage, MovieReview, WeatherResponse};
use crate::routes::{self, Target, ViewKind};
use crate::tmdb::{self, DiscoverParams, MovieCategory, SearchParams};
use crate::utils::numeric_to_emoji_rating;

pub type Params = HashMap<String, String>;

const TOP_CAST: usize = 10;

#[async_trait]
pub trait View: Send + Sync {
    fn kind(&self) -> ViewKind;
    async fn render(&self, state: &AppState, params: &Params) -> Result<Value, AppError>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieCard {
    pub id: u64,
    pub title: String,
    pub original_title: String,
    pub release_date: String,
    pub year: Option<String>,
    pub vote_average: f64,
    pub vote_count: u64,
    pub badge: &'static str,
    pub poster: Option<String>,
    pub genres: Vec<String>,
}

pub fn movie_cards(page: &MoviePage, genres: Option<&GenreList>) -> Vec<MovieCard> {
    let names: HashMap<u32, &str> = genres
        .map(|g| g.genres.iter().map(|g| (g.id, g.name.as_str())).collect())
        .unwrap_or_default();

    page.results
        .iter()
        .map(|m| MovieCard {
            id: m.id,
            title: m.title.clone(),
            original_title: m.original_title.clone(),
            release_date: m.release_date.clone(),
            year: tmdb::extract_year(&m.release_date),
            vote_average: m.vote_average,
            vote_count: m.vote_count,
            badge: numeric_to_emoji_rating(m.vote_average),
            poster: tmdb::poster_url(m.poster_path.as_deref()),
            genres: m
                .genre_ids
                .iter()
                .filter_map(|id| names.get(id).map(|n| n.to_string()))
                .collect(),
        })
        .collect()
}

fn param<'a>(params: &'a Params, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|k| params.get(*k))
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

fn parse_param<T: FromStr>(params: &Params, keys: &[&str]) -> Result<Option<T>, AppError> {
    match param(params, keys) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("invalid value '{raw}' for '{}'", keys[0]))),
    }
}

fn parse_date(params: &Params, keys: &[&str]) -> Result<Option<NaiveDate>, AppError> {
    match param(params, keys) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                AppError::BadRequest(format!("'{}' must be a YYYY-MM-DD date, got '{raw}'", keys[0]))
            }),
    }
}

/// Genre names are decoration; a failed lookup leaves cards without them.
async fn load_genres(state: &AppState) -> Option<GenreList> {
    match state.tmdb.genres().await {
        Ok(g) => Some(g),
        Err(e) => {
            warn!("Continuing without genre names: {e}");
            None
        }
    }
}

pub struct HomeView;

#[async_trait]
impl View for HomeView {
    fn kind(&self) -> ViewKind {
        ViewKind::Home
    }

    async fn render(&self, state: &AppState, params: &Params) -> Result<Value, AppError> {
        let category = match param(params, &["category"]) {
            Some(raw) => raw.parse::<MovieCategory>().map_err(AppError::BadRequest)?,
            None => MovieCategory::Popular,
        };
        let page = parse_param::<u32>(params, &["page"])?;
        let movie_id = match param(params, &["movie"]) {
            Some(raw) => Some(
                tmdb::parse_tmdb_id(raw)
                    .ok_or_else(|| AppError::BadRequest(format!("invalid movie id '{raw}'")))?,
            ),
            None => None,
        };

        let genres = load_genres(state).await;
        let listing = state.tmdb.list(category, page).await?;
        info!(
            "Home: {} page {} ({} movies)",
            category,
            listing.page,
            listing.results.len()
        );

        let movie = match movie_id {
            Some(id) => {
                let reviews = state.tmdb.reviews(id).await?;
                let credits = state.tmdb.credits(id).await?;
                let similar = state.tmdb.similar(id).await?;
                Some(json!({
                    "id": id,
                    "reviews": reviews.results.iter().map(review_entry).collect::<Vec<_>>(),
                    "cast": credits.cast.iter().take(TOP_CAST).map(credit_entry).collect::<Vec<_>>(),
                    "similar": movie_cards(&similar, genres.as_ref()),
                }))
            }
            None => None,
        };
        let movies = movie_cards(&listing, genres.as_ref());

        Ok(json!({
            "view": ViewKind::Home,
            "category": category.as_path(),
            "page": listing.page,
            "total_pages": listing.total_pages,
            "dates": listing.dates,
            "genres": genres.map(|g| g.genres).unwrap_or_default(),
            "movies": movies,
            "movie": movie,
        }))
    }
}

fn review_entry(review: &MovieReview) -> Value {
    json!({
        "author": review.author,
        "created_at": review.created_at,
        "content": review.content,
        "url": review.url,
    })
}

fn credit_entry(credit: &MovieCredit) -> Value {
    json!({
        "id": credit.id,
        "name": credit.name,
        "original_name": credit.original_name,
        "character": credit.character,
        "profile": tmdb::poster_url(credit.profile_path.as_deref()),
    })
}

pub struct AboutView;

#[async_trait]
impl View for AboutView {
    fn kind(&self) -> ViewKind {
        ViewKind::About
    }

    async fn render(&self, state: &AppState, _params: &Params) -> Result<Value, AppError> {
        let routes: Vec<Value> = routes::table()
            .iter()
            .map(|r| match r.target {
                Target::View(kind) => json!({ "path": r.path, "view": kind }),
                Target::Redirect(to) => json!({ "path": r.path, "redirect": to }),
            })
            .collect();

        Ok(json!({
            "view": ViewKind::About,
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "description": env!("CARGO_PKG_DESCRIPTION"),
            "providers": [
                { "name": "AMap", "used_for": ["nearby cinemas", "weather forecasts"] },
                { "name": "TMDB", "used_for": ["movie listings", "search", "reviews", "credits"] },
            ],
            "routes": routes,
            "credentials": state.credentials,
        }))
    }
}

pub struct CinemaView;

#[async_trait]
impl View for CinemaView {
    fn kind(&self) -> ViewKind {
        ViewKind::Cinema
    }

    async fn render(&self, state: &AppState, params: &Params) -> Result<Value, AppError> {
        let around = match (
            param(params, &["location"]),
            parse_param::<f64>(params, &["lng"])?,
            parse_param::<f64>(params, &["lat"])?,
        ) {
            (Some(loc), _, _) => loc.parse::<Coordinate>().map_err(AppError::BadRequest)?,
            (None, Some(lng), Some(lat)) => format!("{lng},{lat}")
                .parse::<Coordinate>()
                .map_err(AppError::BadRequest)?,
            (None, None, None) => Coordinate::default(),
            _ => {
                return Err(AppError::BadRequest(
                    "'lng' and 'lat' must be given together".to_string(),
                ))
            }
        };
        let city = param(params, &["city"]).unwrap_or(DEFAULT_CITY_CODE);

        let pois = state.amap.search_nearby_cinemas(around).await?;
        info!("Cinema: {} cinemas around {}", pois.pois.len(), around);

        let (forecast, weather_error) = match state.amap.fetch_weather(city).await {
            Ok(weather) => (forecast_entry(&weather), None),
            Err(e) => {
                warn!("Cinema view without forecast: {e}");
                (None, Some(e.to_string()))
            }
        };

        Ok(json!({
            "view": ViewKind::Cinema,
            "location": around.to_string(),
            "cinemas": pois.pois.iter().map(cinema_entry).collect::<Vec<_>>(),
            "forecast": forecast,
            "weather_error": weather_error,
        }))
    }
}

fn cinema_entry(poi: &CinemaPoi) -> Value {
    let business = poi.business.clone().unwrap_or_default();
    json!({
        "id": poi.id,
        "name": poi.name,
        "address": poi.address,
        "district": format!("{}{}{}", poi.pname, poi.cityname, poi.adname),
        "location": poi.location,
        "tel": business.tel,
        "rating": business.rating,
        "cost": business.cost,
        "opentime_today": business.opentime_today,
        "business_area": business.business_area,
    })
}

fn forecast_entry(weather: &WeatherResponse) -> Option<Value> {
    weather.forecasts.first().map(|f| {
        json!({
            "city": f.city,
            "province": f.province,
            "adcode": f.adcode,
            "reporttime": f.reporttime,
            "casts": f.casts,
        })
    })
}

pub struct DiscoverView;

impl DiscoverView {
    pub fn params(params: &Params) -> Result<DiscoverParams, AppError> {
        let with_genres = match param(params, &["with_genres", "genres"]) {
            Some(raw) => raw
                .split([',', '|'])
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse::<u32>()
                        .map_err(|_| AppError::BadRequest(format!("invalid genre id '{s}'")))
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        Ok(DiscoverParams {
            primary_release_date_gte: parse_date(
                params,
                &["primary_release_date.gte", "primary_release_date_gte"],
            )?,
            primary_release_date_lte: parse_date(
                params,
                &["primary_release_date.lte", "primary_release_date_lte"],
            )?,
            vote_average_gte: parse_param(params, &["vote_average.gte", "vote_average_gte"])?,
            vote_average_lte: parse_param(params, &["vote_average.lte", "vote_average_lte"])?,
            vote_count_gte: parse_param(params, &["vote_count.gte", "vote_count_gte"])?,
            with_runtime_gte: parse_param(params, &["with_runtime.gte", "with_runtime_gte"])?,
            with_runtime_lte: parse_param(params, &["with_runtime.lte", "with_runtime_lte"])?,
            with_genres,
            with_original_language: param(params, &["with_original_language"]).map(str::to_string),
            sort_by: param(params, &["sort_by"]).map(str::to_string),
            page: parse_param(params, &["page"])?,
        })
    }
}

#[async_trait]
impl View for DiscoverView {
    fn kind(&self) -> ViewKind {
        ViewKind::Discover
    }

    async fn render(&self, state: &AppState, params: &Params) -> Result<Value, AppError> {
        let filters = Self::params(params)?;
        let genres = load_genres(state).await;
        let page = state.tmdb.discover(&filters).await?;
        info!(
            "Discover: page {} of {} ({} results)",
            page.page, page.total_pages, page.total_results
        );

        let movies = movie_cards(&page, genres.as_ref());

        Ok(json!({
            "view": ViewKind::Discover,
            "page": page.page,
            "total_pages": page.total_pages,
            "total_results": page.total_results,
            "movies": movies,
            "genres": genres.map(|g| g.genres).unwrap_or_default(),
        }))
    }
}

pub struct SearchView;

#[async_trait]
impl View for SearchView {
    fn kind(&self) -> ViewKind {
        ViewKind::Search
    }

    async fn render(&self, state: &AppState, params: &Params) -> Result<Value, AppError> {
        let query = param(params, &["query", "q"])
            .ok_or_else(|| AppError::BadRequest("'query' is required".to_string()))?;
        let search = SearchParams {
            query: query.to_string(),
            page: parse_param(params, &["page"])?,
            region: param(params, &["region"]).map(str::to_string),
            year: param(params, &["year"]).map(str::to_string),
        };

        let genres = load_genres(state).await;
        let page = state.tmdb.search(&search).await?;
        info!("Search '{}': {} results", search.query, page.total_results);

        Ok(json!({
            "view": ViewKind::Search,
            "query": search.query,
            "page": page.page,
            "total_pages": page.total_pages,
            "total_results": page.total_results,
            "movies": movie_cards(&page, genres.as_ref()),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Genre, MovieSummary};

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn discover_accepts_dotted_and_underscored_keys() {
        let p = DiscoverView::params(&params(&[
            ("primary_release_date.gte", "2010-01-01"),
            ("vote_average_lte", "9"),
            ("with_genres", "28|12"),
            ("page", "2"),
        ]))
        .unwrap();
        assert_eq!(p.primary_release_date_gte, NaiveDate::from_ymd_opt(2010, 1, 1));
        assert_eq!(p.vote_average_lte, Some(9.0));
        assert_eq!(p.with_genres, vec![28, 12]);
        assert_eq!(p.page, Some(2));
        assert_eq!(p.sort_by, None);
    }

    #[test]
    fn discover_rejects_malformed_values() {
        assert!(DiscoverView::params(&params(&[("primary_release_date.gte", "2010/01/01")])).is_err());
        assert!(DiscoverView::params(&params(&[("with_genres", "action")])).is_err());
        assert!(DiscoverView::params(&params(&[("page", "-1")])).is_err());
    }

    #[test]
    fn cards_resolve_genre_names_by_id() {
        let page = MoviePage {
            page: 1,
            results: vec![MovieSummary {
                id: 27205,
                title: "盗梦空间".to_string(),
                original_title: "Inception".to_string(),
                overview: String::new(),
                popularity: 80.0,
                release_date: "2010-07-15".to_string(),
                poster_path: Some("/inception.jpg".to_string()),
                backdrop_path: None,
                vote_average: 8.4,
                vote_count: 36000,
                genre_ids: vec![28, 878, 999],
                extra: Default::default(),
            }],
            total_pages: 1,
            total_results: 1,
            dates: None,
            extra: Default::default(),
        };
        let genres = GenreList {
            genres: vec![
                Genre { id: 28, name: "动作".to_string() },
                Genre { id: 878, name: "科幻".to_string() },
            ],
        };

        let cards = movie_cards(&page, Some(&genres));
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].genres, vec!["动作".to_string(), "科幻".to_string()]);
        assert_eq!(cards[0].year.as_deref(), Some("2010"));
        assert_eq!(
            cards[0].poster.as_deref(),
            Some("https://image.tmdb.org/t/p/original/inception.jpg")
        );
        assert_eq!(cards[0].badge, "🌕🌕🌕🌕");

        let bare = movie_cards(&page, None);
        assert!(bare[0].genres.is_empty());
    }
}
