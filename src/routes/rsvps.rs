use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Datelike;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::models::event::EventType;
use crate::models::rsvp::*;
use crate::services::realtime::ChangeNotice;
use crate::services::{attendance, club_resolver};
use crate::AppState;

/// Submits the caller's RSVP for an event. One row per (event, profile):
/// repeat submissions overwrite status and note in a single atomic upsert,
/// so a concurrent double-submit still leaves exactly one row.
pub async fn submit_rsvp(
    State(state): State<AppState>,
    user: axum::Extension<AuthUser>,
    Path(event_id): Path<Uuid>,
    Json(body): Json<SubmitRsvpRequest>,
) -> AppResult<Json<RsvpRecord>> {
    let status = RsvpStatus::parse(&body.status)
        .ok_or_else(|| AppError::Validation(vec!["status".to_string()]))?;

    if body.note.as_deref().is_some_and(|n| n.len() > 500) {
        return Err(AppError::BadRequest(
            "Note must be at most 500 characters".into(),
        ));
    }

    let (club_id, event_type_id, event_date): (Uuid, i16, chrono::NaiveDate) =
        sqlx::query_as("SELECT club_id, event_type_id, event_date FROM events WHERE id = $1")
            .bind(event_id)
            .fetch_optional(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".into()))?;

    // Members only, and only on their own behalf
    club_resolver::require_member(&state.db, club_id, user.id).await?;

    let row: RsvpRow = sqlx::query_as(
        r#"INSERT INTO rsvps (event_id, profile_id, status, note, created_at, updated_at)
        VALUES ($1, $2, $3, $4, NOW(), NOW())
        ON CONFLICT (event_id, profile_id) DO UPDATE SET
            status = EXCLUDED.status, note = EXCLUDED.note, updated_at = NOW()
        RETURNING event_id, profile_id, status, note, created_at, updated_at"#,
    )
    .bind(event_id)
    .bind(user.id)
    .bind(status.as_str())
    .bind(&body.note)
    .fetch_one(&state.db)
    .await?;

    let record = RsvpRecord::try_from(row).map_err(AppError::Internal)?;

    attendance::invalidate(
        &state.cache,
        club_id,
        EventType::from_id(event_type_id),
        event_date.year(),
    )
    .await;

    state
        .realtime
        .notify(club_id, ChangeNotice::new("rsvps", "updated", event_id))
        .await;

    Ok(Json(record))
}

/// The attendance roster for one event, grouped by status. Notes stay
/// private to coaches; player viewers get the grouping without them.
pub async fn event_rsvps(
    State(state): State<AppState>,
    user: axum::Extension<AuthUser>,
    Path(event_id): Path<Uuid>,
) -> AppResult<Json<Roster>> {
    let club_id: Uuid = sqlx::query_scalar("SELECT club_id FROM events WHERE id = $1")
        .bind(event_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".into()))?;

    let viewer_role = club_resolver::require_member(&state.db, club_id, user.id).await?;

    let rows: Vec<(
        Uuid,
        String,
        String,
        String,
        Option<String>,
        chrono::DateTime<chrono::Utc>,
    )> = sqlx::query_as(
        r#"SELECT r.profile_id, p.name, p.role, r.status, r.note, r.updated_at
        FROM rsvps r JOIN profiles p ON p.id = r.profile_id
        WHERE r.event_id = $1
        ORDER BY p.name ASC"#,
    )
    .bind(event_id)
    .fetch_all(&state.db)
    .await?;

    let mut entries = Vec::with_capacity(rows.len());
    for (profile_id, name, role, status, note, responded_at) in rows {
        let Some(status) = RsvpStatus::parse(&status) else {
            tracing::warn!("Skipping RSVP with invalid status for event {event_id}");
            continue;
        };
        entries.push((
            status,
            RosterEntry {
                profile_id,
                name,
                role,
                note: if viewer_role.is_coach() { note } else { None },
                responded_at,
            },
        ));
    }

    Ok(Json(Roster::from_entries(entries)))
}

#[derive(Debug, Deserialize)]
pub struct MyRsvpsQuery {
    #[serde(rename = "clubId")]
    pub club_id: Option<Uuid>,
}

/// The caller's own RSVPs as a map of event id to {status, note}, so the
/// client can overlay the event list without per-event round trips.
pub async fn my_rsvps(
    State(state): State<AppState>,
    user: axum::Extension<AuthUser>,
    Query(q): Query<MyRsvpsQuery>,
) -> AppResult<Json<Value>> {
    let rows: Vec<(Uuid, String, Option<String>)> = match q.club_id {
        Some(club_id) => {
            club_resolver::require_member(&state.db, club_id, user.id).await?;
            sqlx::query_as(
                r#"SELECT r.event_id, r.status, r.note
                FROM rsvps r JOIN events e ON e.id = r.event_id
                WHERE r.profile_id = $1 AND e.club_id = $2"#,
            )
            .bind(user.id)
            .bind(club_id)
            .fetch_all(&state.db)
            .await?
        }
        None => {
            sqlx::query_as("SELECT event_id, status, note FROM rsvps WHERE profile_id = $1")
                .bind(user.id)
                .fetch_all(&state.db)
                .await?
        }
    };

    let mut map = serde_json::Map::with_capacity(rows.len());
    for (event_id, status, note) in rows {
        map.insert(
            event_id.to_string(),
            json!({"status": status, "note": note}),
        );
    }

    Ok(Json(json!({ "rsvps": map })))
}
