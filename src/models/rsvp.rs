use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsvpStatus {
    Going,
    NotGoing,
    Maybe,
}

impl RsvpStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RsvpStatus::Going => "going",
            RsvpStatus::NotGoing => "not_going",
            RsvpStatus::Maybe => "maybe",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "going" => Some(RsvpStatus::Going),
            "not_going" => Some(RsvpStatus::NotGoing),
            "maybe" => Some(RsvpStatus::Maybe),
            _ => None,
        }
    }
}

/// At most one row per (event_id, profile_id); the pair is the table's
/// primary key and the upsert conflict target.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RsvpRow {
    pub event_id: Uuid,
    pub profile_id: Uuid,
    pub status: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpRecord {
    pub event_id: Uuid,
    pub profile_id: Uuid,
    pub status: RsvpStatus,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<RsvpRow> for RsvpRecord {
    type Error = String;

    fn try_from(r: RsvpRow) -> Result<Self, Self::Error> {
        let status = RsvpStatus::parse(&r.status)
            .ok_or_else(|| format!("invalid rsvp status in storage: {}", r.status))?;
        Ok(Self {
            event_id: r.event_id,
            profile_id: r.profile_id,
            status,
            note: r.note,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmitRsvpRequest {
    pub status: String,
    pub note: Option<String>,
}

/// One roster line: responder identity plus their answer. The note is only
/// populated for coach viewers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub profile_id: Uuid,
    pub name: String,
    pub role: String,
    pub note: Option<String>,
    pub responded_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Roster {
    pub going: Vec<RosterEntry>,
    pub not_going: Vec<RosterEntry>,
    pub maybe: Vec<RosterEntry>,
}

impl Roster {
    pub fn from_entries(entries: Vec<(RsvpStatus, RosterEntry)>) -> Self {
        let mut roster = Roster::default();
        for (status, entry) in entries {
            match status {
                RsvpStatus::Going => roster.going.push(entry),
                RsvpStatus::NotGoing => roster.not_going.push(entry),
                RsvpStatus::Maybe => roster.maybe.push(entry),
            }
        }
        roster
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> RosterEntry {
        RosterEntry {
            profile_id: Uuid::new_v4(),
            name: name.to_string(),
            role: "player".to_string(),
            note: None,
            responded_at: Utc::now(),
        }
    }

    #[test]
    fn status_strings_round_trip() {
        for s in [RsvpStatus::Going, RsvpStatus::NotGoing, RsvpStatus::Maybe] {
            assert_eq!(RsvpStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(RsvpStatus::parse("attending"), None);
    }

    #[test]
    fn roster_partitions_by_status() {
        let roster = Roster::from_entries(vec![
            (RsvpStatus::Going, entry("a")),
            (RsvpStatus::Maybe, entry("b")),
            (RsvpStatus::Going, entry("c")),
            (RsvpStatus::NotGoing, entry("d")),
        ]);
        assert_eq!(roster.going.len(), 2);
        assert_eq!(roster.not_going.len(), 1);
        assert_eq!(roster.maybe.len(), 1);
        assert_eq!(roster.going[0].name, "a");
        assert_eq!(roster.going[1].name, "c");
    }
}
