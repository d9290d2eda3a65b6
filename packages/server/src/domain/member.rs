//! Registry members and their value objects.

use std::{fmt, sync::Arc};

use super::{ConnectionHandle, ConnectionId};

/// Display name collected during the handshake.
///
/// Kept verbatim: no trimming and no validation, an empty name is legal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for DisplayName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unix timestamp in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// A registered connection plus its metadata.
#[derive(Clone)]
pub struct Member {
    pub id: ConnectionId,
    /// `None` when the deployment has no handshake step
    pub name: Option<DisplayName>,
    pub joined_at: Timestamp,
    pub handle: Arc<dyn ConnectionHandle>,
}

impl Member {
    pub fn new(
        id: ConnectionId,
        name: Option<DisplayName>,
        joined_at: Timestamp,
        handle: Arc<dyn ConnectionHandle>,
    ) -> Self {
        Self {
            id,
            name,
            joined_at,
            handle,
        }
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("joined_at", &self.joined_at)
            .finish_non_exhaustive()
    }
}
