pub mod match_handler;
pub mod team_handler;
pub mod user_handler;
