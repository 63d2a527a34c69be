/// Change notifications a power-supply capability can emit.
///
/// Sources:
/// - sysfs poller        → any variant, derived from successive readings
/// - simulated battery   → any variant, on `set_state` / `emit`
///
/// Only `LevelChange` and `DischargingTimeChange` trigger a re-render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerEvent {
    /// Charge fraction changed.
    LevelChange,
    /// Estimated time until empty changed.
    DischargingTimeChange,
    /// Supply started or stopped charging.
    ChargingChange,
    /// Estimated time until full changed.
    ChargingTimeChange,
}

impl PowerEvent {
    /// Host-facing event name, e.g. `"levelchange"`.
    pub fn name(self) -> &'static str {
        match self {
            Self::LevelChange           => "levelchange",
            Self::DischargingTimeChange => "dischargingtimechange",
            Self::ChargingChange        => "chargingchange",
            Self::ChargingTimeChange    => "chargingtimechange",
        }
    }

    /// Whether the battery widget re-renders on this event.
    pub fn triggers_render(self) -> bool {
        matches!(self, Self::LevelChange | Self::DischargingTimeChange)
    }
}

impl std::fmt::Display for PowerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
