use crate::event::PowerEvent;

/// A point-in-time reading of the host's power supply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryState {
    /// Charge fraction in `[0, 1]`.
    pub level: f64,
    pub charging: bool,
    /// Seconds until full; `None` when unknown or not charging.
    pub charging_time: Option<f64>,
    /// Seconds until empty; `None` when unknown or charging.
    pub discharging_time: Option<f64>,
}

impl BatteryState {
    /// Charge as a percentage (`level × 100`, unrounded).
    #[must_use]
    pub fn percentage(&self) -> f64 {
        self.level * 100.0
    }

    /// The time estimate that matters for the current charging direction.
    #[must_use]
    pub fn active_time(&self) -> Option<f64> {
        if self.charging {
            self.charging_time
        } else {
            self.discharging_time
        }
    }

    /// `" until full"` while charging, `" until empty"` otherwise.
    #[must_use]
    pub fn charging_suffix(&self) -> &'static str {
        if self.charging {
            " until full"
        } else {
            " until empty"
        }
    }

    /// Notifications implied by moving from `previous` to `self`.
    #[must_use]
    pub fn changes_from(&self, previous: &Self) -> Vec<PowerEvent> {
        let mut events = Vec::new();
        if self.level != previous.level {
            events.push(PowerEvent::LevelChange);
        }
        if self.charging != previous.charging {
            events.push(PowerEvent::ChargingChange);
        }
        if self.charging_time != previous.charging_time {
            events.push(PowerEvent::ChargingTimeChange);
        }
        if self.discharging_time != previous.discharging_time {
            events.push(PowerEvent::DischargingTimeChange);
        }
        events
    }
}

impl Default for BatteryState {
    fn default() -> Self {
        Self {
            level: 1.0,
            charging: true,
            charging_time: Some(0.0),
            discharging_time: None,
        }
    }
}

/// Everything the renderer needs for one update, derived fresh per cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedSummary {
    /// Raw percentage (0 – 100).
    pub level: f64,
    /// Percentage to three significant digits, e.g. `"55.0"`.
    pub percentage_text: String,
    /// Time remaining, e.g. `"2.0 hours"`.
    pub time_text: String,
    /// `" until full"` or `" until empty"`.
    pub charging_suffix: &'static str,
    pub state_tag: StateTag,
}

/// Discrete classification of the charge percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateTag {
    Full,
    Charged,
    LowPower,
    Critical,
}

/// Ascending `(threshold, tag)` pairs.
const THRESHOLDS: [(f64, StateTag); 4] = [
    (0.0,  StateTag::Critical),
    (15.0, StateTag::LowPower),
    (40.0, StateTag::Charged),
    (95.0, StateTag::Full),
];

impl StateTag {
    pub const ALL: [Self; 4] = [Self::Full, Self::Charged, Self::LowPower, Self::Critical];

    /// Tag of the largest threshold that is `<=` `percentage`.
    ///
    /// A value sitting exactly on a threshold takes that threshold's tag.
    /// Inputs outside `0..=100` never fail: negatives (and NaN) are
    /// `Critical`, anything above 100 is `Full`.
    pub fn classify(percentage: f64) -> Self {
        THRESHOLDS
            .iter()
            .rev()
            .find(|(threshold, _)| percentage >= *threshold)
            .map_or(Self::Critical, |&(_, tag)| tag)
    }

    /// Style class name, e.g. `"low-power"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full     => "full",
            Self::Charged  => "charged",
            Self::LowPower => "low-power",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for StateTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_threshold_boundaries() {
        assert_eq!(StateTag::classify(95.0), StateTag::Full);
        assert_eq!(StateTag::classify(94.9), StateTag::Charged);
        assert_eq!(StateTag::classify(40.0), StateTag::Charged);
        assert_eq!(StateTag::classify(39.9), StateTag::LowPower);
        assert_eq!(StateTag::classify(15.0), StateTag::LowPower);
        assert_eq!(StateTag::classify(14.9), StateTag::Critical);
        assert_eq!(StateTag::classify(0.0), StateTag::Critical);
    }

    #[test]
    fn classify_out_of_range() {
        assert_eq!(StateTag::classify(-5.0), StateTag::Critical);
        assert_eq!(StateTag::classify(150.0), StateTag::Full);
        assert_eq!(StateTag::classify(f64::NAN), StateTag::Critical);
    }

    #[test]
    fn active_time_follows_charging_flag() {
        let mut state = BatteryState {
            level: 0.5,
            charging: false,
            charging_time: Some(100.0),
            discharging_time: Some(200.0),
        };
        assert_eq!(state.active_time(), Some(200.0));
        assert_eq!(state.charging_suffix(), " until empty");

        state.charging = true;
        assert_eq!(state.active_time(), Some(100.0));
        assert_eq!(state.charging_suffix(), " until full");
    }

    #[test]
    fn changes_from_lists_each_changed_field() {
        let before = BatteryState {
            level: 0.5,
            charging: false,
            charging_time: None,
            discharging_time: Some(3600.0),
        };
        assert!(before.changes_from(&before).is_empty());

        let after = BatteryState {
            level: 0.4,
            discharging_time: Some(3000.0),
            ..before
        };
        assert_eq!(
            after.changes_from(&before),
            [PowerEvent::LevelChange, PowerEvent::DischargingTimeChange]
        );

        let plugged = BatteryState {
            charging: true,
            charging_time: Some(600.0),
            discharging_time: None,
            ..before
        };
        assert_eq!(
            plugged.changes_from(&before),
            [
                PowerEvent::ChargingChange,
                PowerEvent::ChargingTimeChange,
                PowerEvent::DischargingTimeChange,
            ]
        );
    }

    #[test]
    fn state_tag_class_names() {
        let names: Vec<_> = StateTag::ALL.iter().map(|t| t.as_str()).collect();
        assert_eq!(names, ["full", "charged", "low-power", "critical"]);
    }
}
