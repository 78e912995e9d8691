use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::models::event::*;
use crate::services::realtime::ChangeNotice;
use crate::services::{attendance, club_resolver, schedule};
use crate::AppState;

const EVENT_COLUMNS: &str = "id, club_id, title, description, event_date, start_time, end_time, \
     location, event_type_id, created_by, created_at, updated_at";

#[derive(Debug, Deserialize)]
pub struct ListEventsQuery {
    #[serde(rename = "clubId")]
    pub club_id: Uuid,
    /// "upcoming" or "past"; omitted means the full list.
    pub scope: Option<String>,
    /// The viewer's local calendar day; defaults to the server's UTC day.
    pub today: Option<NaiveDate>,
}

pub async fn list_events(
    State(state): State<AppState>,
    user: axum::Extension<AuthUser>,
    Query(q): Query<ListEventsQuery>,
) -> AppResult<Json<Value>> {
    club_resolver::require_member(&state.db, q.club_id, user.id).await?;

    let rows: Vec<EventRow> = sqlx::query_as(&format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE club_id = $1 ORDER BY event_date ASC, start_time ASC",
    ))
    .bind(q.club_id)
    .fetch_all(&state.db)
    .await?;

    let events: Vec<EventRecord> = rows.into_iter().map(EventRecord::from).collect();

    let events = match q.scope.as_deref() {
        None => events,
        Some(scope) => {
            let today = q.today.unwrap_or_else(|| chrono::Utc::now().date_naive());
            let (upcoming, past) = schedule::partition_upcoming(events, today);
            match scope {
                "upcoming" => upcoming,
                "past" => past,
                _ => {
                    return Err(AppError::BadRequest(
                        "scope must be 'upcoming' or 'past'".into(),
                    ))
                }
            }
        }
    };

    Ok(Json(json!({ "events": events })))
}

pub async fn get_event(
    State(state): State<AppState>,
    user: axum::Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<EventRecord>> {
    let row: EventRow = sqlx::query_as(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".into()))?;

    club_resolver::require_member(&state.db, row.club_id, user.id).await?;

    Ok(Json(EventRecord::from(row)))
}

pub async fn create_event(
    State(state): State<AppState>,
    user: axum::Extension<AuthUser>,
    Json(body): Json<CreateEventRequest>,
) -> AppResult<Json<EventRecord>> {
    let new_event = schedule::validate_create(&body).map_err(AppError::Validation)?;

    club_resolver::require_coach(&state.db, body.club_id, user.id).await?;

    let row: EventRow = sqlx::query_as(&format!(
        r#"INSERT INTO events
            (id, club_id, title, description, event_date, start_time, end_time,
             location, event_type_id, created_by, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW(), NOW())
        RETURNING {EVENT_COLUMNS}"#,
    ))
    .bind(Uuid::new_v4())
    .bind(body.club_id)
    .bind(&new_event.title)
    .bind(&new_event.description)
    .bind(new_event.date)
    .bind(new_event.start_time)
    .bind(new_event.end_time)
    .bind(&new_event.location)
    .bind(new_event.event_type.id())
    .bind(user.id)
    .fetch_one(&state.db)
    .await?;

    state
        .realtime
        .notify(body.club_id, ChangeNotice::new("events", "created", row.id))
        .await;

    Ok(Json(EventRecord::from(row)))
}

pub async fn update_event(
    State(state): State<AppState>,
    user: axum::Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateEventRequest>,
) -> AppResult<Json<EventRecord>> {
    let changes = schedule::validate_update(&body).map_err(AppError::Validation)?;

    let club_id: Uuid = sqlx::query_scalar("SELECT club_id FROM events WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".into()))?;

    club_resolver::require_coach(&state.db, club_id, user.id).await?;

    // Last-write-wins; racing coach edits carry no concurrency token.
    let row: EventRow = sqlx::query_as(&format!(
        r#"UPDATE events SET
            title = COALESCE($2, title),
            description = COALESCE($3, description),
            event_date = COALESCE($4, event_date),
            start_time = COALESCE($5, start_time),
            end_time = COALESCE($6, end_time),
            location = COALESCE($7, location),
            event_type_id = COALESCE($8, event_type_id),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {EVENT_COLUMNS}"#,
    ))
    .bind(id)
    .bind(&changes.title)
    .bind(&changes.description)
    .bind(changes.date)
    .bind(changes.start_time)
    .bind(changes.end_time)
    .bind(&changes.location)
    .bind(changes.event_type_id)
    .fetch_one(&state.db)
    .await?;

    state
        .realtime
        .notify(club_id, ChangeNotice::new("events", "updated", id))
        .await;

    Ok(Json(EventRecord::from(row)))
}

pub async fn delete_event(
    State(state): State<AppState>,
    user: axum::Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    let (club_id, event_type_id, event_date): (Uuid, i16, NaiveDate) =
        sqlx::query_as("SELECT club_id, event_type_id, event_date FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".into()))?;

    club_resolver::require_coach(&state.db, club_id, user.id).await?;

    // RSVPs go with the event (FK ON DELETE CASCADE)
    sqlx::query("DELETE FROM events WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    attendance::invalidate(
        &state.cache,
        club_id,
        EventType::from_id(event_type_id),
        event_date.year(),
    )
    .await;

    state
        .realtime
        .notify(club_id, ChangeNotice::new("events", "deleted", id))
        .await;

    Ok(Json(json!({"success": true})))
}
