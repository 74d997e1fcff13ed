//! Router lifecycle states.

use std::fmt;

/// Lifecycle of one router instance, bound to one cache generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerState {
    /// Created, nothing cached yet.
    Parsed,
    Installing,
    /// Manifest fully cached; waiting for activation.
    Installed,
    Activating,
    /// Old generations evicted; requests are intercepted.
    Activated,
    /// Install failed. This instance never activates.
    Redundant,
}

impl WorkerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parsed => "parsed",
            Self::Installing => "installing",
            Self::Installed => "installed",
            Self::Activating => "activating",
            Self::Activated => "activated",
            Self::Redundant => "redundant",
        }
    }

    /// Whether requests are intercepted in this state.
    pub fn controls_clients(&self) -> bool {
        matches!(self, Self::Activated)
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
