pub mod attendance;
pub mod club_resolver;
pub mod realtime;
pub mod schedule;
