//! Schedule CRUD handlers. All of them sit behind the auth gate and act only
//! through the caller's [`OwnerScope`](crate::store::OwnerScope).

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::models::schedule_input::{NewSchedule, SchedulePatch};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, message, ok};

pub const DELETED_MESSAGE: &str = "Schedule deleted successfully";

fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::ValidationError(rejection.body_text()))
}

/// A path id that is not a UUID cannot name an owned schedule.
fn schedule_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::schedule_not_found())
}

/// GET /api/schedule
pub async fn list_schedules(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Response, AppError> {
    let schedules = state.store.list(user.scope()).await?;
    Ok(ok(schedules).into_response())
}

/// POST /api/schedule
///
/// The owner always comes from the caller; an `ownerId` in the body is ignored.
pub async fn create_schedule(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let body = json_body(payload)?;
    let entry = NewSchedule::from_json(&body).map_err(AppError::ValidationError)?;

    let schedule = state.store.insert(user.scope(), entry).await?;
    info!(schedule_id = %schedule.id, owner_id = %user.id, "Schedule created");

    Ok(created(schedule).into_response())
}

/// PUT /api/schedule/:id
pub async fn update_schedule(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let id = schedule_id(&id)?;
    let parsed = json_body(payload).and_then(|body| {
        SchedulePatch::from_json(&body).map_err(AppError::ValidationError)
    });
    let patch = match parsed {
        Ok(patch) => patch,
        Err(err) => {
            // Ownership is settled before the body so a foreign id always reads as missing.
            state
                .store
                .get(user.scope(), id)
                .await?
                .ok_or_else(AppError::schedule_not_found)?;
            return Err(err);
        }
    };

    let schedule = state
        .store
        .update(user.scope(), id, patch)
        .await?
        .ok_or_else(AppError::schedule_not_found)?;
    info!(schedule_id = %schedule.id, owner_id = %user.id, "Schedule updated");

    Ok(ok(schedule).into_response())
}

/// DELETE /api/schedule/:id
pub async fn delete_schedule(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = schedule_id(&id)?;

    let removed = state
        .store
        .delete(user.scope(), id)
        .await?
        .ok_or_else(AppError::schedule_not_found)?;
    info!(schedule_id = %removed.id, owner_id = %user.id, "Schedule deleted");

    Ok(message(StatusCode::OK, DELETED_MESSAGE).into_response())
}
