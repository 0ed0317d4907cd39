use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;

use crate::channels::classify_channels;
use crate::config::ViewerConfig;
use crate::downloader::{export_file_name, to_csv};
use crate::error::{Result, ViewerError};
use crate::graph::FigureOptions;
use crate::loader::parse_scope_bytes;
use crate::pipeline::render_pipeline;
use crate::session::{self, ViewerAction, ViewerState};
use crate::table::SampleTable;

/// The most recently uploaded file.
pub struct Upload {
    pub id: u64,
    pub file_name: String,
    pub table: Arc<SampleTable>,
}

pub struct AppState {
    config: ViewerConfig,
    upload: RwLock<Option<Upload>>,
    next_id: AtomicU64,
}

impl AppState {
    pub fn new(config: ViewerConfig) -> Self {
        AppState {
            config,
            upload: RwLock::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    /// Snapshot of the table a request was made against.
    fn table_for(&self, upload_id: u64) -> Result<(Arc<SampleTable>, String)> {
        let guard = self
            .upload
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let upload = guard.as_ref().ok_or(ViewerError::NoUpload)?;
        if upload.id != upload_id {
            return Err(ViewerError::StaleUpload {
                requested: upload_id,
                current: upload.id,
            });
        }
        Ok((Arc::clone(&upload.table), upload.file_name.clone()))
    }

    /// Keeps `upload` unless a newer one has already been stored.
    fn store(&self, upload: Upload) -> bool {
        let mut guard = self
            .upload
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if guard.as_ref().is_some_and(|current| current.id > upload.id) {
            return false;
        }
        *guard = Some(upload);
        true
    }

    fn initial_state(&self) -> ViewerState {
        ViewerState {
            point_budget: self.config.default_points,
            layout: self.config.default_layout,
            ..ViewerState::default()
        }
    }
}

#[derive(Deserialize)]
struct ActionRequest {
    state: ViewerState,
    action: ViewerAction,
}

#[derive(Deserialize)]
struct ExportRequest {
    state: ViewerState,
}

#[derive(Serialize)]
struct StatusResponse {
    status: String,
    message: Option<String>,
}

/// Error wrapper that renders as the JSON status envelope.
pub struct ApiError(ViewerError);

impl From<ViewerError> for ApiError {
    fn from(err: ViewerError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ViewerError::InvalidArgument(_)
            | ViewerError::MissingTimeColumn
            | ViewerError::EmptyTable
            | ViewerError::Parse { .. }
            | ViewerError::Csv(_)
            | ViewerError::Utf8(_)
            | ViewerError::Json(_) => StatusCode::BAD_REQUEST,
            ViewerError::NoUpload => StatusCode::NOT_FOUND,
            ViewerError::StaleUpload { .. } => StatusCode::CONFLICT,
            ViewerError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        warn!("request failed ({}): {}", status, self.0);

        (
            status,
            Json(StatusResponse {
                status: "error".to_string(),
                message: Some(self.0.to_string()),
            }),
        )
            .into_response()
    }
}

/// Builds the application router around shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let max_upload = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(serve_viewer))
        .route("/api/upload", post(upload_file))
        .route("/api/action", post(apply_action))
        .route("/api/export", post(export_view))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload))
        .with_state(state)
}

pub async fn run(
    config: ViewerConfig,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let addr = config.bind_addr.clone();
    let layout = config.default_layout;
    let app = router(Arc::new(AppState::new(config)));

    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on http://{} ({} layout)", addr, layout);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn serve_viewer() -> Html<&'static str> {
    Html(include_str!("./static/index.html"))
}

async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> std::result::Result<Response, ApiError> {
    let mut file_data = Vec::new();
    let mut file_name = String::new();
    let mut previous: Option<ViewerState> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ViewerError::InvalidArgument(format!("bad multipart body: {}", e)))?
    {
        let field_name = field.name().unwrap_or("unknown").to_string();
        match field_name.as_str() {
            "file" => {
                file_name = field.file_name().unwrap_or("upload.csv").to_string();
                file_data = field
                    .bytes()
                    .await
                    .map_err(|e| ViewerError::InvalidArgument(format!("upload failed: {}", e)))?
                    .to_vec();
            }
            "state" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ViewerError::InvalidArgument(format!("bad state field: {}", e)))?;
                if !text.trim().is_empty() {
                    previous = Some(serde_json::from_str(&text).map_err(ViewerError::from)?);
                }
            }
            _ => {}
        }
    }

    if file_data.is_empty() {
        return Err(ViewerError::InvalidArgument("No file data received".to_string()).into());
    }

    let table = parse_scope_bytes(&file_data, state.config.header_lines)?;
    let id = state.next_id.fetch_add(1, Ordering::Relaxed);
    let uploaded_at = Utc::now();
    info!(
        "upload {} '{}': {} rows, channels {:?}",
        id,
        file_name,
        table.len(),
        classify_channels(&table.columns)
    );

    let prior = previous.unwrap_or_else(|| state.initial_state());
    let step = session::handle(
        &prior,
        &table,
        &ViewerAction::Loaded {
            upload_id: id,
            uploaded_at,
        },
        &FigureOptions::default(),
    )?;

    let stored = state.store(Upload {
        id,
        file_name,
        table: Arc::new(table),
    });
    if !stored {
        warn!("upload {} superseded by a newer upload", id);
    }

    Ok(Json(step).into_response())
}

async fn apply_action(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ActionRequest>,
) -> std::result::Result<Response, ApiError> {
    let (table, _) = state.table_for(payload.state.upload_id)?;
    let step = session::handle(
        &payload.state,
        &table,
        &payload.action,
        &FigureOptions::default(),
    )?;
    Ok(Json(step).into_response())
}

async fn export_view(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ExportRequest>,
) -> std::result::Result<Response, ApiError> {
    let (table, file_name) = state.table_for(payload.state.upload_id)?;
    let shown = render_pipeline(
        &table,
        payload.state.range.as_ref(),
        payload.state.point_budget,
    )?;
    let csv = to_csv(&shown)?;

    let disposition = format!("attachment; filename=\"{}\"", export_file_name(&file_name));
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}
