use serde::{Deserialize, Serialize};

/// Body of every counter call. The server increments and reports the new tally.
#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct CounterRequest {
    pub version: u32,
}

impl CounterRequest {
    pub fn current() -> Self {
        Self {
            version: crate::constants::COUNTER_PROTOCOL_VERSION,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct CounterResponse {
    #[serde(default)]
    pub count: u64, // Missing field means zero
}
