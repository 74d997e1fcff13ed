//! User-facing sync status.

use std::fmt;

pub const CONNECTED: &str = "Connected & Synced";

/// Status shown to the user, with a human-readable message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncStatus {
    Online(String),
    Syncing(String),
    Recording(String),
    Offline(String),
}

impl SyncStatus {
    pub fn connected() -> Self {
        Self::Online(CONNECTED.to_string())
    }

    pub fn signed_out() -> Self {
        Self::Offline("Signed out".to_string())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Online(_) => "online",
            Self::Syncing(_) => "syncing",
            Self::Recording(_) => "recording",
            Self::Offline(_) => "offline",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Online(m) | Self::Syncing(m) | Self::Recording(m) | Self::Offline(m) => m,
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind(), self.message())
    }
}
