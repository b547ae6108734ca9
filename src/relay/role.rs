//! Per-cycle dispatch on the focused application's identity

use std::time::Duration;

use crate::constants::polling;

/// Behaviour selected for one poll cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Nothing could be resolved as focused
    NoFocus,
    /// The image editor: read its selection and publish the human encoding
    Producer,
    /// The cooperating application: translate human -> structured
    DesignatedConsumer,
    /// Anything else: translate structured -> human
    AnyOther,
}

impl Role {
    /// Delay before the next cycle
    pub fn poll_delay(self) -> Duration {
        match self {
            Role::NoFocus => polling::NO_FOCUS_DELAY,
            Role::Producer => polling::PRODUCER_DELAY,
            Role::DesignatedConsumer => polling::CONSUMER_DELAY,
            Role::AnyOther => polling::OTHER_DELAY,
        }
    }
}

/// Executable names of the producer and the designated consumer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identities {
    pub producer: String,
    pub consumer: String,
}

/// Executable names compare case-insensitively, as on Windows
pub fn classify_role(application_name: Option<&str>, identities: &Identities) -> Role {
    match application_name {
        None => Role::NoFocus,
        Some(name) if name.eq_ignore_ascii_case(&identities.producer) => Role::Producer,
        Some(name) if name.eq_ignore_ascii_case(&identities.consumer) => Role::DesignatedConsumer,
        Some(_) => Role::AnyOther,
    }
}
