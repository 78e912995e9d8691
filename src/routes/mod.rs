pub mod attendance;
pub mod auth;
pub mod clubs;
pub mod events;
pub mod health;
pub mod rsvps;
