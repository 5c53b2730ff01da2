// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod bootstrap;
mod notify;
mod render;
mod session;

use axum::{
    Json, Router,
    extract::{Path, State as AxumState},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use carehome::{Clock, DocumentRenderer, NotificationSink, SystemClock};
use carehome_api::{
    ApiError, CreateRotaRequest, LockShiftLogResponse, LogEntryInfo, OpenShiftLogRequest,
    OpenShiftLogResponse, PublishRotaRequest, RejectRotaRequest, ResolveMissedShiftsRequest,
    ResolveMissedShiftsResponse, RotaDetailResponse, RotaResponse, RotaTransitionResponse,
    SaveShiftRequest, ScanMissedShiftsRequest, ScanMissedShiftsResponse, ShiftInfo,
    ShiftLogDocumentResponse, ShiftLogResponse, WriteEntryRequest, begin_manager_edit,
    create_rota, delete_shift, get_rota, get_shift_log, get_shift_log_document, lock_shift_log,
    open_shift_log, publish_rota, reject_rota, reopen_shift_log, resolve_missed_shifts,
    revise_rota, save_shift, scan_missed_shifts, submit_rota, write_entry,
};
use carehome_domain::SlotPolicy;
use carehome_persistence::{BootstrapManager, Persistence};
use chrono_tz::Tz;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::bootstrap::{BootstrapPlan, ServiceUserName, parse_service_user_name, run_bootstrap};
use crate::notify::TracingSink;
use crate::render::TextRenderer;
use crate::session::StaffSession;

/// Care home shift log and rota server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Address to bind the server to
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: IpAddr,

    /// Length of one shift log time slot, in minutes
    #[arg(long, default_value_t = 60)]
    slot_minutes: u16,

    /// Number of time slots in a shift
    #[arg(long, default_value_t = 12)]
    slots_per_shift: u16,

    /// Tracing filter directive. Defaults to `RUST_LOG`, then `info`.
    #[arg(long)]
    log_filter: Option<String>,

    /// Timezone used to decide the current calendar date
    #[arg(long, default_value = "UTC", value_parser = parse_timezone)]
    timezone: Tz,

    /// Login name of a manager to seed before serving. Existing rows are reused.
    #[arg(long)]
    bootstrap_manager: Option<String>,

    /// Care home the seeded manager is assigned to
    #[arg(long, default_value = "Main Care Home", requires = "bootstrap_manager")]
    bootstrap_carehome: String,

    /// Postcode of the seeded care home
    #[arg(long, default_value = "", requires = "bootstrap_manager")]
    bootstrap_postcode: String,

    /// First name of the seeded manager
    #[arg(long, default_value = "Admin", requires = "bootstrap_manager")]
    bootstrap_first_name: String,

    /// Last name of the seeded manager
    #[arg(long, default_value = "User", requires = "bootstrap_manager")]
    bootstrap_last_name: String,

    /// Service user to seed at the bootstrap care home, as "First Last". Repeatable.
    #[arg(
        long = "bootstrap-service-user",
        value_parser = parse_service_user_name,
        requires = "bootstrap_manager"
    )]
    bootstrap_service_users: Vec<ServiceUserName>,
}

impl Args {
    fn bootstrap_plan(&self) -> Option<BootstrapPlan> {
        let login_name: &String = self.bootstrap_manager.as_ref()?;
        Some(BootstrapPlan {
            manager: BootstrapManager {
                carehome_name: self.bootstrap_carehome.clone(),
                postcode: self.bootstrap_postcode.clone(),
                login_name: login_name.clone(),
                first_name: self.bootstrap_first_name.clone(),
                last_name: self.bootstrap_last_name.clone(),
            },
            service_users: self.bootstrap_service_users.clone(),
        })
    }
}

fn parse_timezone(value: &str) -> Result<Tz, String> {
    value
        .parse::<Tz>()
        .map_err(|e| format!("Unknown timezone '{value}': {e}"))
}

/// Application state shared across handlers.
///
/// The persistence layer is wrapped in a Mutex: every operation runs on the
/// one connection, one transaction at a time.
#[derive(Clone)]
struct AppState {
    /// The persistence layer.
    persistence: Arc<Mutex<Persistence>>,
    /// Produces the document stored when a shift log is locked.
    renderer: Arc<dyn DocumentRenderer>,
    /// Receives notifications after their transaction commits.
    sink: Arc<dyn NotificationSink>,
    /// Source of timestamps and the current date.
    clock: Arc<dyn Clock>,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct HealthResponse {
    status: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::DomainRuleViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

// ============================================================================
// Shift logs
// ============================================================================

/// Handler for POST `/shift-logs` endpoint.
///
/// Opens (or returns) the shift log for a service user, date and shift.
async fn handle_open_shift_log(
    AxumState(app_state): AxumState<AppState>,
    StaffSession(actor): StaffSession,
    Json(req): Json<OpenShiftLogRequest>,
) -> Result<Json<OpenShiftLogResponse>, HttpError> {
    info!(
        staff_id = actor.staff_id(),
        service_user_id = req.service_user_id,
        date = %req.date,
        shift = %req.shift,
        "Handling open_shift_log request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: OpenShiftLogResponse =
        open_shift_log(&mut persistence, &actor, &req, app_state.clock.as_ref())?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/shift-logs/{id}` endpoint.
async fn handle_get_shift_log(
    AxumState(app_state): AxumState<AppState>,
    StaffSession(actor): StaffSession,
    Path(shift_log_id): Path<i64>,
) -> Result<Json<ShiftLogResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ShiftLogResponse = get_shift_log(&mut persistence, &actor, shift_log_id)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for PUT `/shift-logs/{id}/entries` endpoint.
///
/// Writes the content of one time slot.
async fn handle_write_entry(
    AxumState(app_state): AxumState<AppState>,
    StaffSession(actor): StaffSession,
    Path(shift_log_id): Path<i64>,
    Json(req): Json<WriteEntryRequest>,
) -> Result<Json<LogEntryInfo>, HttpError> {
    info!(
        staff_id = actor.staff_id(),
        shift_log_id,
        time_slot = %req.time_slot,
        "Handling write_entry request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let entry: LogEntryInfo = write_entry(
        &mut persistence,
        &actor,
        shift_log_id,
        &req,
        app_state.clock.as_ref(),
    )?;
    drop(persistence);

    Ok(Json(entry))
}

/// Handler for POST `/shift-logs/{id}/lock` endpoint.
async fn handle_lock_shift_log(
    AxumState(app_state): AxumState<AppState>,
    StaffSession(actor): StaffSession,
    Path(shift_log_id): Path<i64>,
) -> Result<Json<LockShiftLogResponse>, HttpError> {
    info!(
        staff_id = actor.staff_id(),
        shift_log_id, "Handling lock_shift_log request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: LockShiftLogResponse = lock_shift_log(
        &mut persistence,
        &actor,
        shift_log_id,
        app_state.renderer.as_ref(),
        app_state.clock.as_ref(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/shift-logs/{id}/reopen` endpoint.
async fn handle_reopen_shift_log(
    AxumState(app_state): AxumState<AppState>,
    StaffSession(actor): StaffSession,
    Path(shift_log_id): Path<i64>,
) -> Result<Json<ShiftLogResponse>, HttpError> {
    info!(
        staff_id = actor.staff_id(),
        shift_log_id, "Handling reopen_shift_log request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: ShiftLogResponse = reopen_shift_log(
        &mut persistence,
        &actor,
        shift_log_id,
        app_state.clock.as_ref(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/shift-logs/{id}/document` endpoint.
///
/// Returns the stored document as an attachment.
async fn handle_get_shift_log_document(
    AxumState(app_state): AxumState<AppState>,
    StaffSession(actor): StaffSession,
    Path(shift_log_id): Path<i64>,
) -> Result<Response, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let document: ShiftLogDocumentResponse =
        get_shift_log_document(&mut persistence, &actor, shift_log_id)?;
    drop(persistence);

    let download_name: &str = document
        .file_name
        .rsplit('/')
        .next()
        .unwrap_or(document.file_name.as_str());
    let disposition: String = format!("attachment; filename=\"{download_name}\"");

    Ok((
        [
            (header::CONTENT_TYPE, document.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.content,
    )
        .into_response())
}

// ============================================================================
// Missed shifts
// ============================================================================

/// Handler for POST `/missed-shifts/scan` endpoint.
async fn handle_scan_missed_shifts(
    AxumState(app_state): AxumState<AppState>,
    StaffSession(actor): StaffSession,
    Json(req): Json<ScanMissedShiftsRequest>,
) -> Result<Json<ScanMissedShiftsResponse>, HttpError> {
    info!(
        staff_id = actor.staff_id(),
        carehome_id = req.carehome_id,
        "Handling scan_missed_shifts request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: ScanMissedShiftsResponse = scan_missed_shifts(
        &mut persistence,
        &actor,
        &req,
        app_state.clock.as_ref(),
        app_state.sink.as_ref(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/missed-shifts/resolve` endpoint.
async fn handle_resolve_missed_shifts(
    AxumState(app_state): AxumState<AppState>,
    StaffSession(actor): StaffSession,
    Json(req): Json<ResolveMissedShiftsRequest>,
) -> Result<Json<ResolveMissedShiftsResponse>, HttpError> {
    info!(
        staff_id = actor.staff_id(),
        carehome_id = req.carehome_id,
        service_user_id = req.service_user_id,
        "Handling resolve_missed_shifts request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: ResolveMissedShiftsResponse =
        resolve_missed_shifts(&mut persistence, &actor, &req, app_state.clock.as_ref())?;
    drop(persistence);

    Ok(Json(response))
}

// ============================================================================
// Rotas
// ============================================================================

/// Handler for POST `/rotas` endpoint.
async fn handle_create_rota(
    AxumState(app_state): AxumState<AppState>,
    StaffSession(actor): StaffSession,
    Json(req): Json<CreateRotaRequest>,
) -> Result<Json<RotaResponse>, HttpError> {
    info!(
        staff_id = actor.staff_id(),
        carehome_id = req.carehome_id,
        period_start = %req.period_start,
        "Handling create_rota request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: RotaResponse =
        create_rota(&mut persistence, &actor, &req, app_state.clock.as_ref())?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/rotas/{id}` endpoint.
async fn handle_get_rota(
    AxumState(app_state): AxumState<AppState>,
    StaffSession(actor): StaffSession,
    Path(rota_id): Path<i64>,
) -> Result<Json<RotaDetailResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: RotaDetailResponse = get_rota(&mut persistence, &actor, rota_id)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/rotas/{id}/shifts` endpoint.
///
/// Creates a shift, or updates one when `shift_id` is given.
async fn handle_save_shift(
    AxumState(app_state): AxumState<AppState>,
    StaffSession(actor): StaffSession,
    Path(rota_id): Path<i64>,
    Json(req): Json<SaveShiftRequest>,
) -> Result<Json<ShiftInfo>, HttpError> {
    info!(
        staff_id = actor.staff_id(),
        rota_id,
        shift_id = ?req.shift_id,
        "Handling save_shift request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let shift: ShiftInfo = save_shift(
        &mut persistence,
        &actor,
        rota_id,
        &req,
        app_state.clock.as_ref(),
    )?;
    drop(persistence);

    Ok(Json(shift))
}

/// Handler for DELETE `/rotas/{id}/shifts/{shift_id}` endpoint.
async fn handle_delete_shift(
    AxumState(app_state): AxumState<AppState>,
    StaffSession(actor): StaffSession,
    Path((rota_id, shift_id)): Path<(i64, i64)>,
) -> Result<StatusCode, HttpError> {
    info!(
        staff_id = actor.staff_id(),
        rota_id, shift_id, "Handling delete_shift request"
    );

    let mut persistence = app_state.persistence.lock().await;
    delete_shift(
        &mut persistence,
        &actor,
        rota_id,
        shift_id,
        app_state.clock.as_ref(),
    )?;
    drop(persistence);

    Ok(StatusCode::NO_CONTENT)
}

/// Handler for POST `/rotas/{id}/submit` endpoint.
async fn handle_submit_rota(
    AxumState(app_state): AxumState<AppState>,
    StaffSession(actor): StaffSession,
    Path(rota_id): Path<i64>,
) -> Result<Json<RotaTransitionResponse>, HttpError> {
    info!(
        staff_id = actor.staff_id(),
        rota_id, "Handling submit_rota request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: RotaTransitionResponse = submit_rota(
        &mut persistence,
        &actor,
        rota_id,
        app_state.clock.as_ref(),
        app_state.sink.as_ref(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/rotas/{id}/publish` endpoint.
async fn handle_publish_rota(
    AxumState(app_state): AxumState<AppState>,
    StaffSession(actor): StaffSession,
    Path(rota_id): Path<i64>,
    Json(req): Json<PublishRotaRequest>,
) -> Result<Json<RotaTransitionResponse>, HttpError> {
    info!(
        staff_id = actor.staff_id(),
        rota_id,
        notify = ?req.notify,
        "Handling publish_rota request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: RotaTransitionResponse = publish_rota(
        &mut persistence,
        &actor,
        rota_id,
        &req,
        app_state.clock.as_ref(),
        app_state.sink.as_ref(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/rotas/{id}/reject` endpoint.
async fn handle_reject_rota(
    AxumState(app_state): AxumState<AppState>,
    StaffSession(actor): StaffSession,
    Path(rota_id): Path<i64>,
    Json(req): Json<RejectRotaRequest>,
) -> Result<Json<RotaTransitionResponse>, HttpError> {
    info!(
        staff_id = actor.staff_id(),
        rota_id, "Handling reject_rota request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: RotaTransitionResponse = reject_rota(
        &mut persistence,
        &actor,
        rota_id,
        &req,
        app_state.clock.as_ref(),
        app_state.sink.as_ref(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/rotas/{id}/manager-draft` endpoint.
async fn handle_begin_manager_edit(
    AxumState(app_state): AxumState<AppState>,
    StaffSession(actor): StaffSession,
    Path(rota_id): Path<i64>,
) -> Result<Json<RotaTransitionResponse>, HttpError> {
    info!(
        staff_id = actor.staff_id(),
        rota_id, "Handling begin_manager_edit request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: RotaTransitionResponse = begin_manager_edit(
        &mut persistence,
        &actor,
        rota_id,
        app_state.clock.as_ref(),
        app_state.sink.as_ref(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/rotas/{id}/revise` endpoint.
///
/// Starts a new draft version of a published rota.
async fn handle_revise_rota(
    AxumState(app_state): AxumState<AppState>,
    StaffSession(actor): StaffSession,
    Path(rota_id): Path<i64>,
) -> Result<Json<RotaResponse>, HttpError> {
    info!(
        staff_id = actor.staff_id(),
        rota_id, "Handling revise_rota request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: RotaResponse =
        revise_rota(&mut persistence, &actor, rota_id, app_state.clock.as_ref())?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/health` endpoint.
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: String::from("ok"),
    })
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/shift-logs", post(handle_open_shift_log))
        .route("/shift-logs/{id}", get(handle_get_shift_log))
        .route("/shift-logs/{id}/entries", put(handle_write_entry))
        .route("/shift-logs/{id}/lock", post(handle_lock_shift_log))
        .route("/shift-logs/{id}/reopen", post(handle_reopen_shift_log))
        .route("/shift-logs/{id}/document", get(handle_get_shift_log_document))
        .route("/missed-shifts/scan", post(handle_scan_missed_shifts))
        .route("/missed-shifts/resolve", post(handle_resolve_missed_shifts))
        .route("/rotas", post(handle_create_rota))
        .route("/rotas/{id}", get(handle_get_rota))
        .route("/rotas/{id}/shifts", post(handle_save_shift))
        .route("/rotas/{id}/shifts/{shift_id}", delete(handle_delete_shift))
        .route("/rotas/{id}/submit", post(handle_submit_rota))
        .route("/rotas/{id}/publish", post(handle_publish_rota))
        .route("/rotas/{id}/reject", post(handle_reject_rota))
        .route("/rotas/{id}/manager-draft", post(handle_begin_manager_edit))
        .route("/rotas/{id}/revise", post(handle_revise_rota))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    let filter: EnvFilter = match &args.log_filter {
        Some(directive) => EnvFilter::try_new(directive)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Initializing care home server");

    let slot_policy: SlotPolicy = SlotPolicy::new(args.slot_minutes, args.slots_per_shift)?;

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };
    let mut persistence: Persistence = persistence.with_slot_policy(slot_policy);
    let clock: SystemClock = SystemClock::new(args.timezone);

    if let Some(plan) = args.bootstrap_plan() {
        run_bootstrap(&mut persistence, &plan, clock.now())?;
    }

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        renderer: Arc::new(TextRenderer),
        sink: Arc::new(TracingSink),
        clock: Arc::new(clock),
    };

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: SocketAddr = SocketAddr::new(args.bind, args.port);
    info!(
        timezone = %args.timezone,
        slot_minutes = args.slot_minutes,
        slots_per_shift = args.slots_per_shift,
        "Server listening on {}",
        addr
    );

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests;
