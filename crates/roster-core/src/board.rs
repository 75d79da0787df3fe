//! Message board records.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::{DomainError, DomainResult};

/// One entry on the message board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardMessage {
    /// Wall-clock time of posting, `HH:MM`.
    pub time: String,

    pub text: String,
}

impl BoardMessage {
    /// Creates a message stamped with the current local time.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MissingField` if `text` is absent or empty.
    pub fn post(text: Option<&str>) -> DomainResult<Self> {
        Self::post_at(text, Local::now())
    }

    /// Creates a message stamped with `at`.
    pub fn post_at(text: Option<&str>, at: DateTime<Local>) -> DomainResult<Self> {
        let text = match text {
            Some(t) if !t.is_empty() => t,
            _ => {
                return Err(DomainError::MissingField {
                    field: "text".to_string(),
                })
            }
        };

        Ok(Self {
            time: at.format("%H:%M").to_string(),
            text: text.to_string(),
        })
    }
}
