pub mod event;
pub mod sanitize;
pub mod schedule;
pub mod store;

pub use event::{Event, EventType, NamedRef, RawEvent, Role};
pub use sanitize::{sanitize_events, sanitize_schedule, Sanitized};
pub use schedule::{RawScheduleItem, ScheduleItem};
pub use store::{Directory, Document, Store};
