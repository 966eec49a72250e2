/// Remote source or target of a link, as proposed in Attach.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Terminus {
    pub address: Option<String>,
    pub dynamic: bool,
}

impl Terminus {
    pub fn with_address(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            dynamic: false,
        }
    }

    /// Terminus asking the router to generate the address.
    pub fn dynamic() -> Self {
        Self {
            address: None,
            dynamic: true,
        }
    }

    /// Address if one was proposed and is non-empty.
    pub fn proposed_address(&self) -> Option<&str> {
        self.address.as_deref().filter(|a| !a.is_empty())
    }
}
