//! Session persistence: the store trait and the per-chat dispatch locks.

pub mod locks;
pub mod store;

pub use locks::ChatLocks;
pub use store::SessionStore;
