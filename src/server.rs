//! HTTP surface: the generator page, the OG image endpoint and the JSON
//! preview API.
//!
//! | Route | Response |
//! |---|---|
//! | `GET /` | generator page, pre-filled from the query string |
//! | `GET /api/og?title=&bg=&fg=` | rendered image, `ETag` + `Cache-Control` |
//! | `GET /api/preview?<form>` | derived values and field errors as JSON |
//! | `GET /healthz` | `ok` |
//!
//! Handlers are stateless apart from the render cache. Rendering is CPU-bound
//! and runs on the blocking pool.

use crate::cache::{RenderCache, hash_params};
use crate::config::AppConfig;
use crate::form::FormState;
use crate::imaging::{OgImageParams, OgRenderer, RenderedImage};
use crate::metadata::{JsonLd, json_ld};
use crate::page::{PageOptions, render_page};
use crate::preview::{Derived, derive};
use crate::query::from_query;
use crate::types::MetaConfig;
use axum::{
    Json, Router,
    extract::{RawQuery, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{debug, error, info};

/// The image for a given URL never changes while the config stays the same.
const OG_CACHE_CONTROL: &str = "public, max-age=86400";

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid bind address {0:?}")]
    InvalidBind(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: AppConfig,
    pub renderer: Arc<dyn OgRenderer>,
    cache: Mutex<RenderCache>,
}

impl AppState {
    pub fn new(config: AppConfig, renderer: Arc<dyn OgRenderer>) -> Self {
        let cache = RenderCache::new(config.image.cache_entries);
        Self {
            config,
            renderer,
            cache: Mutex::new(cache),
        }
    }

    fn page_options(&self) -> PageOptions<'_> {
        PageOptions {
            base_url: &self.config.server.base_url,
            escaping: self.config.snippet.escaping(),
            debounce_ms: self.config.sync.debounce_ms,
        }
    }

    fn cached(&self, key: &str) -> Option<Arc<RenderedImage>> {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
    }

    fn remember(&self, key: String, image: Arc<RenderedImage>) {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key, image);
    }

    /// Human-readable cache counters, for the shutdown log.
    pub fn cache_summary(&self) -> String {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .stats()
            .to_string()
    }
}

pub async fn serve(state: SharedState) -> Result<(), ServerError> {
    let bind = &state.config.server.bind;
    let addr: SocketAddr = bind
        .parse()
        .map_err(|_| ServerError::InvalidBind(bind.clone()))?;
    let router = build_router(Arc::clone(&state));
    info!(
        %addr,
        base_url = %state.config.server.base_url,
        format = ?state.renderer.format(),
        "Binding HTTP listener"
    );
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!(images = %state.cache_summary(), "HTTP server exited");
    Ok(())
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = json!({ "error": self.message });
        (self.status, Json(payload)).into_response()
    }
}

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/api/og", get(og_image))
        .route("/api/preview", get(api_preview))
        .route("/healthz", get(health))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new())
                .on_response(DefaultOnResponse::new()),
        )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            let _ = stream.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn home(State(state): State<SharedState>, RawQuery(query): RawQuery) -> Html<String> {
    let values = from_query(query.as_deref().unwrap_or(""), &state.config.defaults);
    let form = FormState::new(values);
    Html(render_page(&form, state.page_options()).into_string())
}

async fn health() -> &'static str {
    "ok"
}

/// `true` when an `If-None-Match` header lists `etag` (or `*`).
fn etag_matches(headers: &HeaderMap, etag: &str) -> bool {
    headers
        .get_all(header::IF_NONE_MATCH)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|tag| tag.trim().trim_start_matches("W/"))
        .any(|tag| tag == etag || tag == "*")
}

async fn og_image(
    State(state): State<SharedState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let params = OgImageParams::from_query(query.as_deref().unwrap_or(""));
    let renderer = Arc::clone(&state.renderer);
    let key = hash_params(&params, &renderer.settings_key());
    let etag = format!("\"{key}\"");
    let etag_header =
        HeaderValue::from_str(&etag).map_err(|e| ApiError::internal(e.to_string()))?;
    let cache_control = HeaderValue::from_static(OG_CACHE_CONTROL);

    if etag_matches(&headers, &etag) {
        debug!(%etag, "OG image not modified");
        return Ok((
            StatusCode::NOT_MODIFIED,
            [(header::ETAG, etag_header), (header::CACHE_CONTROL, cache_control)],
        )
            .into_response());
    }

    let image = match state.cached(&key) {
        Some(image) => {
            debug!(%etag, "OG image cache hit");
            image
        }
        None => {
            let title = params.title.clone();
            let rendered = tokio::task::spawn_blocking(move || renderer.render(&params))
                .await
                .map_err(|e| ApiError::internal(format!("render task failed: {e}")))?
                .map_err(|e| {
                    error!(error = %e, %title, "OG image render failed");
                    ApiError::internal(format!("render failed: {e}"))
                })?;
            let image = Arc::new(rendered);
            state.remember(key, Arc::clone(&image));
            image
        }
    };

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static(image.format.content_type()),
            ),
            (header::ETAG, etag_header),
            (header::CACHE_CONTROL, cache_control),
        ],
        image.bytes.clone(),
    )
        .into_response())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PreviewResponse<'a> {
    values: &'a MetaConfig,
    /// Field key → message, only for invalid fields.
    errors: BTreeMap<&'static str, String>,
    #[serde(flatten)]
    derived: Derived,
    json_ld: JsonLd<'a>,
}

/// Apply a submitted form on top of the defaults and derive everything the
/// page shows. Unlike `/`, empty values are kept so their errors surface.
async fn api_preview(
    State(state): State<SharedState>,
    RawQuery(query): RawQuery,
) -> Json<serde_json::Value> {
    let mut form = FormState::new(state.config.defaults.clone());
    form.edit_from_query(query.as_deref().unwrap_or(""));
    let values = form.values();
    let options = state.page_options();
    let response = PreviewResponse {
        values,
        errors: form
            .errors()
            .iter()
            .map(|(field, err)| (field.key(), err.to_string()))
            .collect(),
        derived: derive(values, options.base_url, options.escaping),
        json_ld: json_ld(values),
    };
    Json(serde_json::to_value(&response).unwrap_or_else(|e| json!({ "error": e.to_string() })))
}
