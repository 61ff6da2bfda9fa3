//! Time of the event that triggered a distribution run.
//!
//! The trigger's timestamp is carried as text and echoed back unmodified in
//! the success message, so no parsing or reformatting happens here.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// The triggering event's timestamp, kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventTime(String);

impl EventTime {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Current system time as Unix epoch seconds, for manual invocations.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self(secs.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
