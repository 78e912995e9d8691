use chrono::{NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use matchday_api::models::event::{CreateEventRequest, EventRecord, EventType};
use matchday_api::models::rsvp::{Roster, RosterEntry, RsvpStatus};
use matchday_api::services::attendance::zero_filled_series;
use matchday_api::services::schedule::{
    chronological, parse_time, partition_upcoming, validate_create,
};

fn event(date: &str, time: &str, ty: EventType) -> EventRecord {
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
        event_type: ty,
        created_by: Uuid::new_v4(),
        created_at: ts,
        updated_at: ts,
    }
}

#[test]
fn reverse_insertion_still_lists_noon_first() {
    // Two events on the same day, inserted in reverse order
    let mut events = vec![
        event("2025-10-18", "18:00", EventType::Training),
        event("2025-10-18", "12:00", EventType::Training),
    ];
    events.sort_by(chronological);
    assert_eq!(events[0].start_time, parse_time("12:00").unwrap());
    assert_eq!(events[1].start_time, parse_time("18:00").unwrap());
}

#[test]
fn ordering_is_non_decreasing_across_dates() {
    let mut events = vec![
        event("2025-11-01", "09:00", EventType::Game),
        event("2025-10-18", "18:00", EventType::Training),
        event("2025-10-18", "12:00", EventType::Other),
        event("2025-10-02", "20:00", EventType::Analysis),
    ];
    events.sort_by(chronological);
    for pair in events.windows(2) {
        assert!((pair[0].date, pair[0].start_time) <= (pair[1].date, pair[1].start_time));
    }
}

#[test]
fn partition_treats_today_as_upcoming() {
    let today: NaiveDate = "2025-10-18".parse().unwrap();
    let events = vec![
        event("2025-10-01", "10:00", EventType::Training),
        event("2025-10-18", "10:00", EventType::Training),
        event("2025-12-24", "10:00", EventType::Game),
    ];
    let (upcoming, past) = partition_upcoming(events, today);
    assert_eq!(upcoming.len(), 2);
    assert_eq!(past.len(), 1);
    // Relative order within each half is preserved
    assert!(upcoming[0].date <= upcoming[1].date);
}

#[test]
fn create_payload_missing_fields_are_all_reported() {
    let req = CreateEventRequest {
        club_id: Uuid::new_v4(),
        title: Some("Team training".to_string()),
        description: None,
        date: Some("2025-10-18".parse().unwrap()),
        start_time: Some("not-a-time".to_string()),
        end_time: None,
        location: None,
        event_type: Some("training".to_string()),
    };
    let fields = validate_create(&req).unwrap_err();
    assert!(fields.contains(&"description".to_string()));
    assert!(fields.contains(&"location".to_string()));
    assert!(fields.contains(&"startTime".to_string()));
    assert!(!fields.contains(&"title".to_string()));
}

#[test]
fn roster_groups_a_single_going_player() {
    let player_id = Uuid::new_v4();
    let roster = Roster::from_entries(vec![(
        RsvpStatus::Going,
        RosterEntry {
            profile_id: player_id,
            name: "Mari Maasikas".to_string(),
            role: "player".to_string(),
            note: None,
            responded_at: Utc::now(),
        },
    )]);
    assert_eq!(roster.going.len(), 1);
    assert_eq!(roster.going[0].profile_id, player_id);
    assert!(roster.not_going.is_empty());
    assert!(roster.maybe.is_empty());
}

#[test]
fn attendance_series_for_empty_club_is_twelve_zeros() {
    let series = zero_filled_series(&[]);
    assert_eq!(series.len(), 12);
    assert!(series.iter().all(|m| m.count == 0));
}

#[test]
fn unmapped_event_type_codes_degrade_in_listings() {
    assert_eq!(EventType::from_id(7), EventType::Other);
    assert_eq!(EventType::from_id(2), EventType::Game);
}
