//! AMQP endpoint boundary.
//!
//! The protocol engine (frame codec, link state machines) lives outside this
//! workspace. The gates only need to read a few remote fields, set an error
//! condition, and close an endpoint; those capabilities are expressed here as
//! traits the engine implements.

pub mod condition;
pub mod endpoint;
pub mod terminus;

pub use condition::{Denial, ErrorCondition, RESOURCE_LIMIT_EXCEEDED};
pub use endpoint::{ConnectionEndpoint, Endpoint, LinkEndpoint, SessionEndpoint};
pub use terminus::Terminus;
