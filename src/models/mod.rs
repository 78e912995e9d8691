pub mod club;
pub mod event;
pub mod profile;
pub mod rsvp;

pub use club::*;
pub use event::*;
pub use profile::*;
pub use rsvp::*;
