//! Screen rendering modules

pub mod main_menu;
pub mod task;
