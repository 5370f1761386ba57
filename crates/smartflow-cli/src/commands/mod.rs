pub mod add;
pub mod cache;
pub mod delete;
pub mod edit;
pub mod export;
pub mod list;
pub mod sync;
pub mod toggle;
pub mod watch;
