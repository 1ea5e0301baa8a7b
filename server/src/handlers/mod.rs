use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::utils::response::ok;

pub mod schedules;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn root_banner() -> &'static str {
    "EduTrack server running!"
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "edutrack-api",
    };

    ok(payload).into_response()
}
