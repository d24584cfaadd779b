//! One function per event type. Each opens exactly one unit of work, commits it
//! when it writes, and lets it roll back on every other path.

pub mod posts;
pub mod users;
