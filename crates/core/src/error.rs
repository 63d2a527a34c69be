use thiserror::Error;

/// Top-level error type shared by every powerbar crate.
#[derive(Debug, Error)]
pub enum PowerBarError {
    /// The host has no usable power-supply interface.
    #[error("power-supply capability unavailable: {0}")]
    CapabilityUnavailable(String),

    /// `mount` while mounted, or `unmount` while not mounted.
    #[error("misordered lifecycle call: {0}")]
    MisorderedLifecycleCall(&'static str),

    #[error("config error: {0}")]
    Config(String),

    #[error("stylesheet error: {0}")]
    Stylesheet(String),
}

impl PowerBarError {
    /// `true` for errors that only mean "no battery to show".
    #[must_use]
    pub fn is_capability_unavailable(&self) -> bool {
        matches!(self, Self::CapabilityUnavailable(_))
    }
}

pub type Result<T, E = PowerBarError> = std::result::Result<T, E>;
