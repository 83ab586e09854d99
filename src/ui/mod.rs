//! User interface for the Quip assistant
//!
//! Single-screen egui app: quick-command buttons, a text field, the response
//! area and the activity log.

pub mod app;
pub mod theme;

pub use app::QuipApp;
pub use theme::Theme;
