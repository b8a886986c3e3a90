//! Logical locations of the replicated records.

use uuid::Uuid;

use crate::store::StorePath;

pub const USERS: &str = "users";
pub const CREDENTIALS: &str = "credentials";
pub const EMAIL_INDEX: &str = "email-index";
pub const TEAM_ASSIGNMENT: &str = "team-assignment";
pub const CURRENT_MATCH: &str = "current-match";
pub const HISTORY: &str = "history";
pub const HISTORY_INDEX: &str = "history-index";

fn top(name: &str) -> StorePath {
    StorePath::root().child(name)
}

pub fn users() -> StorePath {
    top(USERS)
}

pub fn user(user_id: Uuid) -> StorePath {
    users().child(user_id)
}

pub fn user_role(user_id: Uuid) -> StorePath {
    user(user_id).child("role")
}

pub fn credentials(user_id: Uuid) -> StorePath {
    top(CREDENTIALS).child(user_id)
}

pub fn email_index(email_key: &str) -> StorePath {
    top(EMAIL_INDEX).child(email_key)
}

pub fn team_assignment() -> StorePath {
    top(TEAM_ASSIGNMENT)
}

pub fn current_match() -> StorePath {
    top(CURRENT_MATCH)
}

pub fn current_match_field(field: &str) -> StorePath {
    current_match().child(field)
}

pub fn current_match_event(event_id: Uuid) -> StorePath {
    current_match().child("events").child(event_id)
}

pub fn history() -> StorePath {
    top(HISTORY)
}

pub fn history_entry(entry_id: &str) -> StorePath {
    history().child(entry_id)
}

pub fn history_index(match_id: Uuid) -> StorePath {
    top(HISTORY_INDEX).child(match_id)
}
