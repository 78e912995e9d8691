use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Datelike;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::models::event::EventType;
use crate::services::{attendance, club_resolver};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MonthlyQuery {
    #[serde(rename = "clubId")]
    pub club_id: Uuid,
    #[serde(rename = "eventType")]
    pub event_type: String,
    pub year: Option<i32>,
}

pub async fn monthly(
    State(state): State<AppState>,
    user: axum::Extension<AuthUser>,
    Query(q): Query<MonthlyQuery>,
) -> AppResult<Json<Value>> {
    let event_type = EventType::parse(&q.event_type)
        .ok_or_else(|| AppError::Validation(vec!["eventType".to_string()]))?;

    club_resolver::require_member(&state.db, q.club_id, user.id).await?;

    let year = q.year.unwrap_or_else(|| chrono::Utc::now().year());
    let series = attendance::monthly_attendance(
        &state.db,
        &state.cache,
        q.club_id,
        event_type,
        year,
        state.config.attendance.cache_seconds,
    )
    .await?;

    Ok(Json(json!({
        "year": year,
        "eventType": event_type,
        "months": series,
    })))
}
