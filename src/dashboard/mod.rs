mod components;
mod create_dashboard;
pub mod state;
pub mod table;
pub mod time_range;

pub use components::DashboardPage;
