use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::cache::Cache;
use crate::error::AppResult;
use crate::models::event::EventType;

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyAttendance {
    pub month: String,
    pub count: i64,
}

/// Expands sparse (month, count) rows into a full Jan..Dec series. Months
/// without events or RSVPs stay at zero; out-of-range months are dropped.
pub fn zero_filled_series(rows: &[(i32, i64)]) -> Vec<MonthlyAttendance> {
    let mut series: Vec<MonthlyAttendance> = MONTH_LABELS
        .iter()
        .map(|m| MonthlyAttendance {
            month: m.to_string(),
            count: 0,
        })
        .collect();
    for &(month, count) in rows {
        if (1..=12).contains(&month) {
            series[(month - 1) as usize].count = count;
        }
    }
    series
}

/// "Going" RSVP counts per calendar month for one club, event type and
/// year. Read-only; a club with zero events yields an all-zero series.
pub async fn monthly_attendance(
    db: &PgPool,
    cache: &Cache,
    club_id: Uuid,
    event_type: EventType,
    year: i32,
    cache_ttl: u64,
) -> AppResult<Vec<MonthlyAttendance>> {
    let cache_key = format!("attendance:{}:{}:{}", club_id, event_type.as_str(), year);
    if let Some(hit) = cache.get_json::<Vec<MonthlyAttendance>>(&cache_key).await {
        return Ok(hit);
    }

    let rows: Vec<(i32, i64)> = sqlx::query_as(
        r#"SELECT EXTRACT(MONTH FROM e.event_date)::int, COUNT(*)::bigint
        FROM events e JOIN rsvps r ON r.event_id = e.id
        WHERE e.club_id = $1 AND e.event_type_id = $2
          AND EXTRACT(YEAR FROM e.event_date)::int = $3
          AND r.status = 'going'
        GROUP BY 1"#,
    )
    .bind(club_id)
    .bind(event_type.id())
    .bind(year)
    .fetch_all(db)
    .await?;

    let series = zero_filled_series(&rows);
    cache.set_json(&cache_key, &series, cache_ttl).await;
    Ok(series)
}

/// Drops the cached series for one (club, type, year) bucket after a write
/// that changes it; readers fall back to the database on the next request.
pub async fn invalidate(cache: &Cache, club_id: Uuid, event_type: EventType, year: i32) {
    let cache_key = format!("attendance:{}:{}:{}", club_id, event_type.as_str(), year);
    cache.del(&cache_key).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_rows_gives_twelve_zero_months() {
        let series = zero_filled_series(&[]);
        assert_eq!(series.len(), 12);
        assert_eq!(series[0].month, "Jan");
        assert_eq!(series[11].month, "Dec");
        assert!(series.iter().all(|m| m.count == 0));
    }

    #[test]
    fn sparse_rows_land_in_their_months() {
        let series = zero_filled_series(&[(3, 7), (10, 2)]);
        assert_eq!(series[2], MonthlyAttendance { month: "Mar".to_string(), count: 7 });
        assert_eq!(series[9], MonthlyAttendance { month: "Oct".to_string(), count: 2 });
        assert_eq!(series.iter().map(|m| m.count).sum::<i64>(), 9);
    }

    #[test]
    fn out_of_range_months_are_ignored() {
        let series = zero_filled_series(&[(0, 5), (13, 5)]);
        assert!(series.iter().all(|m| m.count == 0));
    }
}
