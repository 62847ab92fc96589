//! Reusable UI widgets

mod log_view;
mod menu_list;
mod progress;
mod spinner;

pub use log_view::LogView;
pub use menu_list::MenuList;
pub use progress::ProgressSteps;
pub use spinner::Spinner;
