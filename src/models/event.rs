use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Semantic event category. Stored as a numeric code (`event_type_id`);
/// unmapped codes degrade to `Other` on read instead of failing the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Training,
    Game,
    Analysis,
    Other,
}

impl EventType {
    pub fn from_id(id: i16) -> Self {
        match id {
            1 => EventType::Training,
            2 => EventType::Game,
            3 => EventType::Analysis,
            _ => EventType::Other,
        }
    }

    pub fn id(self) -> i16 {
        match self {
            EventType::Training => 1,
            EventType::Game => 2,
            EventType::Analysis => 3,
            EventType::Other => 4,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "training" => Some(EventType::Training),
            "game" => Some(EventType::Game),
            "analysis" => Some(EventType::Analysis),
            "other" => Some(EventType::Other),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Training => "training",
            EventType::Game => "game",
            EventType::Analysis => "analysis",
            EventType::Other => "other",
        }
    }
}

/// Raw storage shape of a calendar event.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRow {
    pub id: Uuid,
    pub club_id: Uuid,
    pub title: String,
    pub description: String,
    pub event_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub location: String,
    pub event_type_id: i16,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: Uuid,
    pub club_id: Uuid,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub location: String,
    pub event_type: EventType,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EventRow> for EventRecord {
    fn from(r: EventRow) -> Self {
        Self {
            id: r.id,
            club_id: r.club_id,
            title: r.title,
            description: r.description,
            date: r.event_date,
            start_time: r.start_time,
            end_time: r.end_time,
            location: r.location,
            event_type: EventType::from_id(r.event_type_id),
            created_by: r.created_by,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    #[serde(rename = "clubId")]
    pub club_id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    #[serde(rename = "startTime")]
    pub start_time: Option<String>,
    #[serde(rename = "endTime")]
    pub end_time: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "eventType")]
    pub event_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    #[serde(rename = "startTime")]
    pub start_time: Option<String>,
    #[serde(rename = "endTime")]
    pub end_time: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "eventType")]
    pub event_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::EventType;

    #[test]
    fn type_codes_round_trip() {
        for ty in [
            EventType::Training,
            EventType::Game,
            EventType::Analysis,
            EventType::Other,
        ] {
            assert_eq!(EventType::from_id(ty.id()), ty);
            assert_eq!(EventType::parse(ty.as_str()), Some(ty));
        }
    }

    #[test]
    fn unmapped_codes_degrade_to_other() {
        assert_eq!(EventType::from_id(0), EventType::Other);
        assert_eq!(EventType::from_id(99), EventType::Other);
        assert_eq!(EventType::from_id(-1), EventType::Other);
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert_eq!(EventType::parse("match"), None);
        assert_eq!(EventType::parse(""), None);
    }
}
