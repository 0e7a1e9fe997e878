pub mod list_view;
pub mod month_view;
pub mod status_bar;
pub mod timeline_view;
pub mod week_view;

pub use list_view::ListView;
pub use month_view::MonthView;
pub use status_bar::StatusBar;
pub use timeline_view::TimelineView;
pub use week_view::WeekView;
