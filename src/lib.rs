//! Academic calendar layouts: month, week, grouped list and day timeline
//! views over school events and weekly class schedules.
//!
//! [`layout`] is the pure core. [`calendar`] holds the data model and the
//! [`calendar::Directory`] seam it reads from. The remaining modules make
//! up the terminal viewer built on top of them.

pub mod app;
pub mod calendar;
pub mod components;
pub mod config;
pub mod error;
pub mod event;
pub mod layout;
pub mod theme;
pub mod tui;

pub use error::{DataWarning, LayoutError, LayoutResult, RecordKind};
