//! Device status and the status indicator pattern.

/// Top-level device mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceStatus {
    /// No link, no playback.
    #[default]
    Idle,
    /// Link established.
    Connected,
    /// Receiving a macro document.
    Transferring,
    /// A macro is loaded and stopped.
    Ready,
    /// Replaying a macro.
    Playing,
    /// Pausing between loop passes.
    Waiting,
    /// The last transfer could not be parsed.
    Error,
}

impl DeviceStatus {
    /// Statuses kept when the link drops, so offline playback continues.
    #[inline]
    #[must_use]
    pub const fn survives_link_loss(self) -> bool {
        matches!(self, Self::Ready | Self::Playing | Self::Waiting)
    }

    /// Statuses from which the button may start playback.
    #[inline]
    #[must_use]
    pub const fn can_start_playback(self) -> bool {
        matches!(self, Self::Idle | Self::Connected | Self::Ready)
    }

    /// Playing or pausing between passes.
    #[inline]
    #[must_use]
    pub const fn is_playback(self) -> bool {
        matches!(self, Self::Playing | Self::Waiting)
    }

    /// LED pattern shown for this status.
    #[must_use]
    pub const fn indicator(self) -> Indicator {
        match self {
            Self::Idle => Indicator::Blink {
                on_ms: 100,
                off_ms: 1900,
            },
            Self::Connected => Indicator::Blink {
                on_ms: 1000,
                off_ms: 1000,
            },
            Self::Transferring => Indicator::Blink {
                on_ms: 50,
                off_ms: 50,
            },
            Self::Ready => Indicator::Solid,
            Self::Playing => Indicator::Blink {
                on_ms: 250,
                off_ms: 250,
            },
            Self::Waiting => Indicator::Blink {
                on_ms: 100,
                off_ms: 900,
            },
            Self::Error => Indicator::Blink {
                on_ms: 900,
                off_ms: 100,
            },
        }
    }
}

/// Single-LED output pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Indicator {
    Off,
    Solid,
    Blink { on_ms: u32, off_ms: u32 },
}

impl Indicator {
    /// LED level `elapsed_ms` after the pattern started.
    #[must_use]
    pub const fn level_at(self, elapsed_ms: u32) -> bool {
        match self {
            Self::Off => false,
            Self::Solid => true,
            Self::Blink { on_ms, off_ms } => {
                let period = on_ms.saturating_add(off_ms);
                period != 0 && elapsed_ms % period < on_ms
            }
        }
    }
}

/// Current status plus a change flag consumed once by the indicator.
#[derive(Debug)]
pub struct StatusCell {
    current: DeviceStatus,
    changed: bool,
}

impl StatusCell {
    /// Start in [`DeviceStatus::Idle`] with the flag raised so the indicator
    /// picks up the initial status.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: DeviceStatus::Idle,
            changed: true,
        }
    }

    #[inline]
    #[must_use]
    pub const fn get(&self) -> DeviceStatus {
        self.current
    }

    /// Move to `next`. Returns `true` if the status actually changed.
    pub fn set(&mut self, next: DeviceStatus) -> bool {
        if self.current == next {
            return false;
        }
        info!("Status {} -> {}", self.current, next);
        self.current = next;
        self.changed = true;
        true
    }

    /// Return the status if it changed since the last call.
    pub fn take_change(&mut self) -> Option<DeviceStatus> {
        if core::mem::take(&mut self.changed) {
            Some(self.current)
        } else {
            None
        }
    }
}

impl Default for StatusCell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_flag_consumed_once() {
        let mut cell = StatusCell::new();
        assert_eq!(cell.take_change(), Some(DeviceStatus::Idle));
        assert_eq!(cell.take_change(), None);

        assert!(cell.set(DeviceStatus::Connected));
        assert_eq!(cell.take_change(), Some(DeviceStatus::Connected));
        assert_eq!(cell.take_change(), None);
    }

    #[test]
    fn test_setting_same_status_is_not_a_change() {
        let mut cell = StatusCell::new();
        let _ = cell.take_change();
        assert!(!cell.set(DeviceStatus::Idle));
        assert_eq!(cell.take_change(), None);
    }

    #[test]
    fn test_latest_status_wins_between_reads() {
        let mut cell = StatusCell::new();
        cell.set(DeviceStatus::Transferring);
        cell.set(DeviceStatus::Ready);
        assert_eq!(cell.take_change(), Some(DeviceStatus::Ready));
    }

    #[test]
    fn test_link_loss_policy() {
        assert!(DeviceStatus::Playing.survives_link_loss());
        assert!(DeviceStatus::Waiting.survives_link_loss());
        assert!(DeviceStatus::Ready.survives_link_loss());
        assert!(!DeviceStatus::Transferring.survives_link_loss());
        assert!(!DeviceStatus::Error.survives_link_loss());
        assert!(!DeviceStatus::Connected.survives_link_loss());
    }

    #[test]
    fn test_indicator_levels() {
        let blink = Indicator::Blink {
            on_ms: 100,
            off_ms: 300,
        };
        assert!(blink.level_at(0));
        assert!(blink.level_at(99));
        assert!(!blink.level_at(100));
        assert!(!blink.level_at(399));
        assert!(blink.level_at(400));
        assert!(Indicator::Solid.level_at(12345));
        assert!(!Indicator::Off.level_at(0));
        assert!(!Indicator::Blink { on_ms: 0, off_ms: 0 }.level_at(5));
    }

    #[test]
    fn test_every_status_has_a_distinct_pattern() {
        let all = [
            DeviceStatus::Idle,
            DeviceStatus::Connected,
            DeviceStatus::Transferring,
            DeviceStatus::Ready,
            DeviceStatus::Playing,
            DeviceStatus::Waiting,
            DeviceStatus::Error,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.indicator(), b.indicator());
            }
        }
    }
}
