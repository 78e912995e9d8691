use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::profile::Role;

/// A club resolved for a specific caller: identity-checked membership plus
/// the caller's role within it.
#[derive(Debug, Clone)]
pub struct ResolvedClub {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub logo_url: Option<String>,
    pub role: Role,
}

/// Resolves a club slug for the given caller. `NotFound` if no club carries
/// the slug, `Forbidden` if the club exists but the caller holds no
/// membership. The check always runs against the caller's own identity.
pub async fn resolve_slug(db: &PgPool, slug: &str, profile_id: Uuid) -> AppResult<ResolvedClub> {
    let club: Option<(Uuid, String, Option<String>)> =
        sqlx::query_as("SELECT id, name, logo_url FROM clubs WHERE slug = $1")
            .bind(slug)
            .fetch_optional(db)
            .await?;

    let (id, name, logo_url) =
        club.ok_or_else(|| AppError::NotFound("Club not found".into()))?;

    let role = membership_role(db, id, profile_id)
        .await?
        .ok_or_else(|| AppError::Forbidden("Not a member of this club".into()))?;

    Ok(ResolvedClub {
        id,
        name,
        slug: slug.to_string(),
        logo_url,
        role,
    })
}

async fn membership_role(
    db: &PgPool,
    club_id: Uuid,
    profile_id: Uuid,
) -> AppResult<Option<Role>> {
    let role: Option<String> = sqlx::query_scalar(
        r#"SELECT p.role FROM members m
        JOIN profiles p ON p.id = m.profile_id
        WHERE m.club_id = $1 AND m.profile_id = $2"#,
    )
    .bind(club_id)
    .bind(profile_id)
    .fetch_optional(db)
    .await?;

    match role {
        None => Ok(None),
        Some(r) => Role::parse(&r)
            .map(Some)
            .ok_or_else(|| AppError::Internal(format!("unknown role in storage: {r}"))),
    }
}

/// Verifies club membership by id. Distinguishes a missing club (404) from
/// a non-member caller (403).
pub async fn require_member(db: &PgPool, club_id: Uuid, profile_id: Uuid) -> AppResult<Role> {
    if let Some(role) = membership_role(db, club_id, profile_id).await? {
        return Ok(role);
    }

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM clubs WHERE id = $1)")
        .bind(club_id)
        .fetch_one(db)
        .await?;

    if exists {
        Err(AppError::Forbidden("Not a member of this club".into()))
    } else {
        Err(AppError::NotFound("Club not found".into()))
    }
}

/// Membership plus the coach role. Event mutations go through this gate.
pub async fn require_coach(db: &PgPool, club_id: Uuid, profile_id: Uuid) -> AppResult<()> {
    let role = require_member(db, club_id, profile_id).await?;
    if role.is_coach() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Coach role required".into()))
    }
}
