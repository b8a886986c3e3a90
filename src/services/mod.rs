pub mod access;
pub mod countdown;
pub mod event_ledger;
pub mod history_archive;
pub mod identity_service;
pub mod match_lifecycle;
pub mod photo_store;
pub mod redis_fanout;
pub mod team_drawer;

pub use access::Actor;
pub use countdown::CountdownScheduler;
pub use event_ledger::EventLedger;
pub use history_archive::HistoryArchive;
pub use identity_service::IdentityDirectory;
pub use match_lifecycle::MatchLifecycle;
pub use photo_store::{InMemoryPhotoStore, PhotoStore};
pub use redis_fanout::RedisFanout;
pub use team_drawer::TeamDrawer;
