use std::path::PathBuf;

use axum::extract::{Path as AxumPath, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use spool_app::{ApiError, AppError, AppState, RemainingSpool};
use spool_core::EnrichedUsage;
use tower_http::services::{ServeDir, ServeFile};

/// JSON error response carrying the [`ApiError`] body with its status code.
#[derive(Debug)]
struct HttpError {
    status: StatusCode,
    body: ApiError,
}

impl From<AppError> for HttpError {
    fn from(err: AppError) -> Self {
        let body = ApiError::from(err);
        let status =
            StatusCode::from_u16(body.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self { status, body }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[derive(Serialize)]
struct ConfigResponse {
    #[serde(rename = "spoolmanUrl")]
    spoolman_url: String,
    #[serde(rename = "flowCompensationValue")]
    flow_compensation_value: f64,
}

#[derive(Deserialize)]
struct ConfigPayload {
    #[serde(rename = "spoolmanUrl")]
    spoolman_url: Option<String>,
    #[serde(rename = "flowCompensationValue")]
    flow_compensation_value: Option<f64>,
}

#[derive(Serialize)]
struct ConfigUpdateResponse {
    success: bool,
    #[serde(rename = "spoolmanUrl")]
    spoolman_url: String,
}

#[derive(Deserialize)]
struct UsagePayload {
    spool_id: String,
    weight: f64,
    note: Option<String>,
}

#[derive(Serialize)]
struct UsageResponse {
    success: bool,
    #[serde(rename = "wasEmptied")]
    was_emptied: bool,
}

#[derive(Serialize)]
struct SpoolUsageEntry {
    date: String,
    weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

fn resolve_dist_dir() -> PathBuf {
    let env_override = std::env::var_os("SPOOL_TRACKER_DIST").map(PathBuf::from);
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|path| path.parent().map(PathBuf::from));
    resolve_dist_dir_with(env_override, exe_dir)
}

fn resolve_dist_dir_with(env_override: Option<PathBuf>, exe_dir: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = env_override {
        return dir;
    }
    if let Some(dir) = exe_dir {
        let candidate = dir.join("dist");
        if candidate.is_dir() {
            return candidate;
        }
    }
    PathBuf::from("web/dist")
}

fn resolve_app_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|path| path.parent().map(PathBuf::from))
}

fn resolve_db_path_with(app_dir: Option<PathBuf>) -> PathBuf {
    let base = app_dir.unwrap_or_else(|| PathBuf::from("."));
    base.join("spool-tracker.sqlite")
}

fn resolve_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(4000)
}

#[tokio::main]
async fn main() {
    let app_dir = resolve_app_dir().or_else(|| std::env::current_dir().ok());
    let db_path = resolve_db_path_with(app_dir);
    let state = AppState::new(db_path);
    if let Err(err) = state.initialize() {
        eprintln!("failed to initialize database: {}", err);
        std::process::exit(1);
    }
    let app = build_app(state);

    let port = resolve_port();
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .expect("bind server");
    eprintln!("spool tracker listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app).await.expect("serve");
}

fn build_app(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/info", get(info))
        .route("/api/config", get(config_get).post(config_set))
        .route("/api/spools", get(spools))
        .route("/api/remaining", get(remaining))
        .route("/api/usage", get(usage_all).post(usage_record))
        .route("/api/usage/:spool_id", get(usage_for_spool))
        .with_state(state);

    let dist_dir = resolve_dist_dir();
    let static_service =
        ServeDir::new(&dist_dir).fallback(ServeFile::new(dist_dir.join("index.html")));

    api.fallback_service(static_service)
}

async fn info(State(state): State<AppState>) -> Result<Json<Value>, HttpError> {
    Ok(Json(state.services.spools.info().await?))
}

async fn config_get(State(state): State<AppState>) -> Json<ConfigResponse> {
    let settings = state.services.config.snapshot();
    Json(ConfigResponse {
        spoolman_url: settings.spoolman_url,
        flow_compensation_value: settings.flow_compensation_g,
    })
}

async fn config_set(
    State(state): State<AppState>,
    Json(payload): Json<ConfigPayload>,
) -> Result<Json<ConfigUpdateResponse>, HttpError> {
    let settings = state.services.config.update(
        payload.spoolman_url.as_deref(),
        payload.flow_compensation_value,
    )?;
    Ok(Json(ConfigUpdateResponse {
        success: true,
        spoolman_url: settings.spoolman_url,
    }))
}

async fn spools(State(state): State<AppState>) -> Result<Json<Value>, HttpError> {
    Ok(Json(state.services.spools.list().await?))
}

async fn remaining(State(state): State<AppState>) -> Result<Json<Vec<RemainingSpool>>, HttpError> {
    Ok(Json(state.services.spools.remaining().await?))
}

async fn usage_record(
    State(state): State<AppState>,
    Json(payload): Json<UsagePayload>,
) -> Result<Json<UsageResponse>, HttpError> {
    let outcome = state
        .services
        .recorder
        .record(&payload.spool_id, payload.weight, payload.note.as_deref())
        .await?;
    Ok(Json(UsageResponse {
        success: true,
        was_emptied: outcome.was_emptied,
    }))
}

async fn usage_all(State(state): State<AppState>) -> Result<Json<Vec<EnrichedUsage>>, HttpError> {
    Ok(Json(state.services.usage.list_all().await?))
}

async fn usage_for_spool(
    State(state): State<AppState>,
    AxumPath(spool_id): AxumPath<String>,
) -> Result<Json<Vec<SpoolUsageEntry>>, HttpError> {
    let records = state.services.usage.list_for_spool(&spool_id)?;
    Ok(Json(
        records
            .into_iter()
            .map(|record| SpoolUsageEntry {
                date: record.used_at,
                weight: record.weight,
                note: record.note,
            })
            .collect(),
    ))
}
