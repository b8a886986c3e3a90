pub mod auth;
pub mod common;
pub mod history;
pub mod live_update;
pub mod match_state;
pub mod team;
pub mod user;
