//! Error conditions signaled to a peer when policy refuses an endpoint.

/// Condition name carried by every policy denial.
pub const RESOURCE_LIMIT_EXCEEDED: &str = "amqp:resource-limit-exceeded";

/// AMQP error condition (name + human readable description).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCondition {
    pub name: &'static str,
    pub description: &'static str,
}

/// Which protocol entity was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    Connection,
    Session,
    Link,
}

impl Denial {
    pub fn description(self) -> &'static str {
        match self {
            Denial::Connection => "connection disallowed by local policy",
            Denial::Session => "session disallowed by local policy",
            Denial::Link => "link disallowed by local policy",
        }
    }

    /// The condition set on the endpoint before it is closed.
    pub fn condition(self) -> ErrorCondition {
        ErrorCondition {
            name: RESOURCE_LIMIT_EXCEEDED,
            description: self.description(),
        }
    }
}
