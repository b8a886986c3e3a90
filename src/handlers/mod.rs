pub mod admin;
pub mod auth_handler;
pub mod backend_health_handler;
pub mod history_handler;
pub mod match_handler;
pub mod profile;
pub mod registration_handler;
pub mod team_handler;
pub mod users_handler;
