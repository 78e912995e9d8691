use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    Json,
};
use futures::Stream;
use serde_json::{json, Value};
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::models::club::*;
use crate::services::club_resolver;
use crate::services::realtime::ChangeNotice;
use crate::AppState;

pub async fn create_club(
    State(state): State<AppState>,
    user: axum::Extension<AuthUser>,
    Json(body): Json<CreateClubRequest>,
) -> AppResult<Json<Value>> {
    let name = body.name.trim().to_string();
    let slug = slugify(&name);
    if name.is_empty() || slug.is_empty() {
        return Err(AppError::Validation(vec!["name".to_string()]));
    }

    // Name and slug are both globally unique
    let taken: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM clubs WHERE slug = $1 OR name = $2)")
            .bind(&slug)
            .bind(&name)
            .fetch_one(&state.db)
            .await?;
    if taken {
        return Err(AppError::Conflict("Club name already taken".into()));
    }

    let club_id = Uuid::new_v4();
    let mut tx = state.db.begin().await?;

    let club: Club = sqlx::query_as(
        r#"INSERT INTO clubs (id, slug, name, logo_url, created_by, created_at)
        VALUES ($1, $2, $3, $4, $5, NOW())
        RETURNING id, slug, name, logo_url, created_by, created_at"#,
    )
    .bind(club_id)
    .bind(&slug)
    .bind(&name)
    .bind(&body.logo_url)
    .bind(user.id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO members (club_id, profile_id, joined_at) VALUES ($1, $2, NOW())",
    )
    .bind(club_id)
    .bind(user.id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(Json(json!(club)))
}

pub async fn list_my_clubs(
    State(state): State<AppState>,
    user: axum::Extension<AuthUser>,
) -> AppResult<Json<Value>> {
    let rows: Vec<(Uuid, String, String, Option<String>, chrono::DateTime<chrono::Utc>)> =
        sqlx::query_as(
            r#"SELECT c.id, c.name, c.slug, c.logo_url, m.joined_at
            FROM clubs c JOIN members m ON m.club_id = c.id
            WHERE m.profile_id = $1
            ORDER BY m.joined_at"#,
        )
        .bind(user.id)
        .fetch_all(&state.db)
        .await?;

    let clubs: Vec<Value> = rows
        .iter()
        .map(|(id, name, slug, logo, joined)| {
            json!({"id": id, "name": name, "slug": slug, "logoUrl": logo, "joinedAt": joined})
        })
        .collect();

    Ok(Json(json!({ "clubs": clubs })))
}

pub async fn get_club(
    State(state): State<AppState>,
    user: axum::Extension<AuthUser>,
    Path(slug): Path<String>,
) -> AppResult<Json<Value>> {
    let club = club_resolver::resolve_slug(&state.db, &slug, user.id).await?;

    let member_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*)::bigint FROM members WHERE club_id = $1")
            .bind(club.id)
            .fetch_one(&state.db)
            .await?;

    Ok(Json(json!({
        "id": club.id, "name": club.name, "slug": club.slug, "logoUrl": club.logo_url,
        "memberCount": member_count, "role": club.role,
    })))
}

pub async fn update_club(
    State(state): State<AppState>,
    user: axum::Extension<AuthUser>,
    Path(slug): Path<String>,
    Json(body): Json<UpdateClubRequest>,
) -> AppResult<Json<Value>> {
    let club = club_resolver::resolve_slug(&state.db, &slug, user.id).await?;
    if !club.role.is_coach() {
        return Err(AppError::Forbidden("Coach role required".into()));
    }

    // Renaming regenerates the slug; both stay collision-checked.
    let renamed = match body.name.as_deref().map(str::trim) {
        None => None,
        Some("") => return Err(AppError::Validation(vec!["name".to_string()])),
        Some(name) => {
            let new_slug = slugify(name);
            if new_slug.is_empty() {
                return Err(AppError::Validation(vec!["name".to_string()]));
            }
            let taken: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM clubs WHERE (slug = $1 OR name = $2) AND id <> $3)",
            )
            .bind(&new_slug)
            .bind(name)
            .bind(club.id)
            .fetch_one(&state.db)
            .await?;
            if taken {
                return Err(AppError::Conflict("Club name already taken".into()));
            }
            Some((name.to_string(), new_slug))
        }
    };

    let (new_name, new_slug) = match &renamed {
        Some((n, s)) => (Some(n.as_str()), Some(s.as_str())),
        None => (None, None),
    };

    let row: (Uuid, String, String, Option<String>) = sqlx::query_as(
        r#"UPDATE clubs SET
            name = COALESCE($2, name),
            slug = COALESCE($3, slug),
            logo_url = COALESCE($4, logo_url)
        WHERE id = $1
        RETURNING id, name, slug, logo_url"#,
    )
    .bind(club.id)
    .bind(new_name)
    .bind(new_slug)
    .bind(&body.logo_url)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(json!({
        "id": row.0, "name": row.1, "slug": row.2, "logoUrl": row.3,
    })))
}

pub async fn add_member(
    State(state): State<AppState>,
    user: axum::Extension<AuthUser>,
    Path(slug): Path<String>,
    Json(body): Json<AddMemberRequest>,
) -> AppResult<Json<Value>> {
    let club = club_resolver::resolve_slug(&state.db, &slug, user.id).await?;
    if !club.role.is_coach() {
        return Err(AppError::Forbidden("Coach role required".into()));
    }

    let profile_id: Uuid = sqlx::query_scalar("SELECT id FROM profiles WHERE email = $1")
        .bind(body.email.trim().to_lowercase())
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("No profile with that email".into()))?;

    sqlx::query(
        "INSERT INTO members (club_id, profile_id, joined_at) VALUES ($1, $2, NOW()) ON CONFLICT DO NOTHING",
    )
    .bind(club.id)
    .bind(profile_id)
    .execute(&state.db)
    .await?;

    state
        .realtime
        .notify(club.id, ChangeNotice::new("members", "created", profile_id))
        .await;

    Ok(Json(json!({"success": true})))
}

pub async fn remove_member(
    State(state): State<AppState>,
    user: axum::Extension<AuthUser>,
    Path((slug, profile_id)): Path<(String, Uuid)>,
) -> AppResult<Json<Value>> {
    let club = club_resolver::resolve_slug(&state.db, &slug, user.id).await?;
    if !club.role.is_coach() && profile_id != user.id {
        return Err(AppError::Forbidden("Coach role required".into()));
    }

    // Removes the membership only; the profile itself is never touched.
    let result = sqlx::query("DELETE FROM members WHERE club_id = $1 AND profile_id = $2")
        .bind(club.id)
        .bind(profile_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Membership not found".into()));
    }

    state
        .realtime
        .notify(club.id, ChangeNotice::new("members", "deleted", profile_id))
        .await;

    Ok(Json(json!({"success": true})))
}

/// SSE feed of change notices for one club. The subscription lives as long
/// as the response stream; client disconnect drops the receiver, which is
/// the unsubscribe.
pub async fn stream_club(
    State(state): State<AppState>,
    user: axum::Extension<AuthUser>,
    Path(slug): Path<String>,
) -> AppResult<Sse<impl Stream<Item = Result<SseEvent, Infallible>>>> {
    let club = club_resolver::resolve_slug(&state.db, &slug, user.id).await?;
    let rx = state.realtime.subscribe(club.id).await;

    let stream = futures::stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(notice) => match SseEvent::default().event(notice.table).json_data(&notice) {
                    Ok(ev) => return Some((Ok::<_, Infallible>(ev), rx)),
                    Err(e) => {
                        tracing::warn!("Failed to encode change notice: {e}");
                        continue;
                    }
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("SSE subscriber lagged, skipped {skipped} notices");
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
