//! Traits implemented by the AMQP engine for connections, sessions and links.

use super::{ErrorCondition, Terminus};

/// Anything that can be refused: set a local condition, then close.
pub trait Endpoint {
    fn set_condition(&mut self, condition: ErrorCondition);
    fn close(&mut self);

    /// Signal `condition` to the peer and close the endpoint.
    fn deny(&mut self, condition: ErrorCondition) {
        self.set_condition(condition);
        self.close();
    }
}

/// Connection-level view of the engine (transport limits + open).
pub trait ConnectionEndpoint: Endpoint {
    /// `hostname` field of the remote Open; used as the application name.
    fn remote_hostname(&self) -> Option<&str>;
    fn set_max_frame(&mut self, size: u32);
    fn set_channel_max(&mut self, channel_max: u16);
    /// True once the local side has sent its Open.
    fn is_locally_open(&self) -> bool;
    fn open(&mut self);
}

pub trait SessionEndpoint: Endpoint {
    fn set_incoming_capacity(&mut self, bytes: usize);
}

pub trait LinkEndpoint: Endpoint {
    fn remote_source(&self) -> Option<&Terminus>;
    fn remote_target(&self) -> Option<&Terminus>;
}
