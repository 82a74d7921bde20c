//! The conversation state machine.
//!
//! `render` builds keyboards and message texts (pure), `transition` is the
//! hand-authored (state, event) table, and `dispatcher` wraps one full
//! dispatch cycle: lock, load, transition, save.

pub mod dispatcher;
pub mod render;
pub mod transition;

pub use dispatcher::Dispatcher;
pub use transition::transition;
