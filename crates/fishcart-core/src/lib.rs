//! Business logic for the fishcart shop bot.
//!
//! Defines the traits at the system's seams -- [`session::SessionStore`],
//! [`commerce::CommerceBackend`], [`gateway::MessagingGateway`] -- and the
//! conversation state machine that drives the shopping flow. Concrete
//! implementations live in `fishcart-infra`.

pub mod commerce;
pub mod gateway;
pub mod machine;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;
