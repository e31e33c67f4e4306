use crate::amap::{AmapApi, AmapClient};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::routes::{self, Target, ViewKind};
use crate::tmdb::{TmdbApi, TmdbClient};
use crate::views::Params;
use anyhow::{anyhow, Context, Result};
use axum::{
    body::Body,
    extract::{Query, RawQuery, State},
    http::{header, Request, StatusCode},
    response::Redirect,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;
const MAX_REDIRECTS: usize = 5;

#[derive(Clone)]
pub struct AppState {
    pub amap: Arc<dyn AmapApi>,
    pub tmdb: Arc<dyn TmdbApi>,
    pub credentials: CredentialStatus,
}

/// Which secrets are configured. Never carries the secrets themselves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CredentialStatus {
    pub amap_api_key: bool,
    pub tmdb_token: bool,
    pub amap_key: bool,
    pub amap_security_key: bool,
}

impl From<&AppConfig> for CredentialStatus {
    fn from(config: &AppConfig) -> Self {
        Self {
            amap_api_key: !config.amap_api_key.is_empty(),
            tmdb_token: !config.tmdb_token.is_empty(),
            amap_key: config.amap_key.is_some(),
            amap_security_key: config.amap_security_key.is_some(),
        }
    }
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let amap: Arc<dyn AmapApi> = Arc::new(AmapClient::new(config)?);
        let tmdb: Arc<dyn TmdbApi> = Arc::new(TmdbClient::new(config)?);
        Ok(Self {
            amap,
            tmdb,
            credentials: CredentialStatus::from(config),
        })
    }
}

/// Router with one GET route per entry of the route table.
pub fn build_router(state: AppState) -> Router {
    let mut router: Router<AppState> = Router::new();
    for route in routes::table() {
        router = match route.target {
            Target::View(kind) => router.route(
                route.path,
                get(
                    move |State(state): State<AppState>, Query(params): Query<Params>| async move {
                        render(kind, state, params).await
                    },
                ),
            ),
            Target::Redirect(to) => router.route(
                route.path,
                get(move |RawQuery(query): RawQuery| async move {
                    match query {
                        Some(q) if !q.is_empty() => Redirect::to(&format!("{to}?{q}")),
                        _ => Redirect::to(to),
                    }
                }),
            ),
        };
    }
    router
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn render(kind: ViewKind, state: AppState, params: Params) -> Result<Json<Value>, AppError> {
    debug!("Loading view {}", kind.name());
    let view = kind.load();
    let body = view.render(&state, &params).await?;
    Ok(Json(body))
}

/// Outcome of an in-process navigation.
#[derive(Debug, Clone, Serialize)]
pub struct Navigation {
    /// Path and query after following redirects.
    pub uri: String,
    pub view: Option<ViewKind>,
    #[serde(serialize_with = "serialize_status")]
    pub status: StatusCode,
    pub body: Value,
}

impl Navigation {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

fn serialize_status<S: serde::Serializer>(status: &StatusCode, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u16(status.as_u16())
}

/// Dispatch `uri` through `router` without binding a socket, following redirects.
pub async fn navigate(router: &Router, uri: &str) -> Result<Navigation> {
    let mut current = uri.to_string();
    for _ in 0..=MAX_REDIRECTS {
        let request = Request::get(current.as_str())
            .body(Body::empty())
            .with_context(|| format!("invalid navigation target '{current}'"))?;
        let response = router
            .clone()
            .oneshot(request)
            .await
            .context("router failed to respond")?;
        let status = response.status();

        if status.is_redirection() {
            let location = response
                .headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| anyhow!("redirect from '{current}' without a location"))?;
            info!("Redirect {} -> {}", current, location);
            current = location.to_string();
            continue;
        }

        let bytes = axum::body::to_bytes(response.into_body(), MAX_BODY_BYTES)
            .await
            .context("failed to read view body")?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        let path = current.split('?').next().unwrap_or_default();
        return Ok(Navigation {
            view: routes::resolve(path),
            uri: current,
            status,
            body,
        });
    }
    Err(anyhow!("too many redirects navigating to '{uri}'"))
}

/// Build a navigation URI from a path and key/value pairs.
pub fn navigation_uri(path: &str, params: &[(String, String)]) -> String {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    if params.is_empty() {
        return path;
    }
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    let sep = if path.contains('?') { '&' } else { '?' };
    format!("{path}{sep}{query}")
}
