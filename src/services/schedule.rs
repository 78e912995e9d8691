//! Pure scheduling rules shared by the event handlers: payload validation,
//! chronological ordering, and the upcoming/past partition.

use chrono::{NaiveDate, NaiveTime};

use crate::models::event::{CreateEventRequest, EventRecord, EventType, UpdateEventRequest};

/// A fully validated event payload, ready to insert.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub location: String,
    pub event_type: EventType,
}

/// Validated partial update. `None` means "leave unchanged".
#[derive(Debug, Clone, Default)]
pub struct EventChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub event_type_id: Option<i16>,
}

/// Accepts "18:00" and "18:00:00".
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .ok()
        .or_else(|| NaiveTime::parse_from_str(s, "%H:%M:%S").ok())
}

fn required_text(value: &Option<String>, field: &str, missing: &mut Vec<String>) -> String {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => {
            missing.push(field.to_string());
            String::new()
        }
    }
}

/// Validates a creation payload, collecting every missing or invalid field
/// so the client gets the full list in one round trip.
pub fn validate_create(req: &CreateEventRequest) -> Result<NewEvent, Vec<String>> {
    let mut missing = Vec::new();

    let title = required_text(&req.title, "title", &mut missing);
    let description = required_text(&req.description, "description", &mut missing);
    let location = required_text(&req.location, "location", &mut missing);

    let date = req.date.unwrap_or_else(|| {
        missing.push("date".to_string());
        NaiveDate::default()
    });

    let start_time = req
        .start_time
        .as_deref()
        .and_then(parse_time)
        .unwrap_or_else(|| {
            missing.push("startTime".to_string());
            NaiveTime::default()
        });

    let end_time = match req.end_time.as_deref() {
        None => None,
        Some(s) => match parse_time(s) {
            Some(t) => Some(t),
            None => {
                missing.push("endTime".to_string());
                None
            }
        },
    };

    let event_type = req
        .event_type
        .as_deref()
        .and_then(EventType::parse)
        .unwrap_or_else(|| {
            missing.push("eventType".to_string());
            EventType::Other
        });

    if !missing.is_empty() {
        return Err(missing);
    }

    Ok(NewEvent {
        title,
        description,
        date,
        start_time,
        end_time,
        location,
        event_type,
    })
}

/// Validates a partial update. Present fields must be well-formed; required
/// text fields may not be blanked out.
pub fn validate_update(req: &UpdateEventRequest) -> Result<EventChanges, Vec<String>> {
    let mut invalid = Vec::new();
    let mut changes = EventChanges {
        date: req.date,
        ..EventChanges::default()
    };

    for (value, field, slot) in [
        (&req.title, "title", &mut changes.title),
        (&req.description, "description", &mut changes.description),
        (&req.location, "location", &mut changes.location),
    ] {
        if let Some(v) = value.as_deref().map(str::trim) {
            if v.is_empty() {
                invalid.push(field.to_string());
            } else {
                *slot = Some(v.to_string());
            }
        }
    }

    if let Some(s) = req.start_time.as_deref() {
        match parse_time(s) {
            Some(t) => changes.start_time = Some(t),
            None => invalid.push("startTime".to_string()),
        }
    }
    if let Some(s) = req.end_time.as_deref() {
        match parse_time(s) {
            Some(t) => changes.end_time = Some(t),
            None => invalid.push("endTime".to_string()),
        }
    }
    if let Some(s) = req.event_type.as_deref() {
        match EventType::parse(s) {
            Some(t) => changes.event_type_id = Some(t.id()),
            None => invalid.push("eventType".to_string()),
        }
    }

    if !invalid.is_empty() {
        return Err(invalid);
    }
    Ok(changes)
}

/// Chronological sort key order: (date, start_time) ascending.
pub fn chronological(a: &EventRecord, b: &EventRecord) -> std::cmp::Ordering {
    (a.date, a.start_time).cmp(&(b.date, b.start_time))
}

/// Splits an ordered event list into (upcoming, past). Today counts as
/// upcoming. Stateless; re-evaluated per request against the viewer's day.
pub fn partition_upcoming(
    events: Vec<EventRecord>,
    today: NaiveDate,
) -> (Vec<EventRecord>, Vec<EventRecord>) {
    events.into_iter().partition(|e| e.date >= today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn record(date: &str, time: &str) -> EventRecord {
        let ts = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        EventRecord {
            id: Uuid::new_v4(),
            club_id: Uuid::new_v4(),
            title: "Team training".to_string(),
            description: "Weekly session".to_string(),
            date: date.parse().unwrap(),
            start_time: parse_time(time).unwrap(),
            end_time: None,
            location: "Main pitch".to_string(),
            event_type: EventType::Training,
            created_by: Uuid::new_v4(),
            created_at: ts,
            updated_at: ts,
        }
    }

    fn create_request() -> CreateEventRequest {
        CreateEventRequest {
            club_id: Uuid::new_v4(),
            title: Some("Team training".to_string()),
            description: Some("Weekly session".to_string()),
            date: Some("2025-10-18".parse().unwrap()),
            start_time: Some("18:00".to_string()),
            end_time: None,
            location: Some("Main pitch".to_string()),
            event_type: Some("training".to_string()),
        }
    }

    #[test]
    fn parse_time_accepts_both_formats() {
        assert_eq!(parse_time("18:00"), parse_time("18:00:00"));
        assert!(parse_time("6pm").is_none());
        assert!(parse_time("25:00").is_none());
    }

    #[test]
    fn valid_payload_passes() {
        let ev = validate_create(&create_request()).unwrap();
        assert_eq!(ev.title, "Team training");
        assert_eq!(ev.event_type, EventType::Training);
        assert_eq!(ev.start_time, parse_time("18:00").unwrap());
    }

    #[test]
    fn empty_payload_lists_every_missing_field() {
        let req = CreateEventRequest {
            club_id: Uuid::new_v4(),
            title: None,
            description: None,
            date: None,
            start_time: None,
            end_time: None,
            location: None,
            event_type: None,
        };
        let fields = validate_create(&req).unwrap_err();
        assert_eq!(
            fields,
            vec!["title", "description", "location", "date", "startTime", "eventType"]
        );
    }

    #[test]
    fn unknown_event_type_is_flagged() {
        let req = CreateEventRequest {
            event_type: Some("derby".to_string()),
            ..create_request()
        };
        assert_eq!(validate_create(&req).unwrap_err(), vec!["eventType"]);
    }

    #[test]
    fn blank_title_update_is_rejected() {
        let req = UpdateEventRequest {
            title: Some("   ".to_string()),
            ..UpdateEventRequest::default()
        };
        assert_eq!(validate_update(&req).unwrap_err(), vec!["title"]);
    }

    #[test]
    fn update_parses_times_and_type() {
        let req = UpdateEventRequest {
            start_time: Some("12:30".to_string()),
            event_type: Some("game".to_string()),
            ..UpdateEventRequest::default()
        };
        let changes = validate_update(&req).unwrap();
        assert_eq!(changes.start_time, parse_time("12:30"));
        assert_eq!(changes.event_type_id, Some(EventType::Game.id()));
    }

    #[test]
    fn same_day_events_order_by_start_time() {
        let noon = record("2025-10-18", "12:00");
        let evening = record("2025-10-18", "18:00");
        let mut events = vec![evening.clone(), noon.clone()];
        events.sort_by(chronological);
        assert_eq!(events[0].start_time, noon.start_time);
        assert_eq!(events[1].start_time, evening.start_time);
    }

    #[test]
    fn today_is_upcoming() {
        let today: NaiveDate = "2025-10-18".parse().unwrap();
        let events = vec![
            record("2025-10-17", "18:00"),
            record("2025-10-18", "09:00"),
            record("2025-10-19", "09:00"),
        ];
        let (upcoming, past) = partition_upcoming(events, today);
        assert_eq!(upcoming.len(), 2);
        assert_eq!(past.len(), 1);
        assert_eq!(past[0].date, "2025-10-17".parse::<NaiveDate>().unwrap());
    }
}
