//! Macro playback state machine.
//!
//! The player never sleeps. Each [`tick`](MacroPlayer::tick) compares the time
//! elapsed since the pass started with the next event's timestamp and sends
//! at most one report. A failed send leaves the event in place so the same
//! event is retried on the next tick: events go out in order and none is
//! dropped because the host was briefly not polling.
//!
//! Timestamps are relative to the start of each pass and are expected to be
//! non-decreasing. They are not sorted: an event whose timestamp is earlier
//! than its predecessor's fires on the tick that reaches it.

use switch_proto::{InputFrame, LoopSettings, Macro};

use crate::encoder::HidEncoder;
use crate::output::HidOutput;

/// Playback position. Reset on every [`MacroPlayer::start`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlayerState {
    /// Next event to send.
    pub event_index: usize,
    /// Time the current pass started.
    pub start_ms: u32,
    /// Time the pause between passes started.
    pub wait_start_ms: u32,
    /// Passes left including the current one; `None` loops forever.
    pub remaining_loops: Option<u32>,
}

/// Outcome of one [`MacroPlayer::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    /// Next event is not due yet.
    Pending,
    /// The event at this index was sent.
    Sent(usize),
    /// The transport refused the report; the same report goes out next tick.
    Retry,
    /// Pass complete, next pass started immediately.
    Restarted,
    /// Pass complete, pausing before the next one.
    Waiting,
    /// Last pass complete.
    Finished,
}

/// Walks a macro's events against the clock and applies its loop policy.
#[derive(Debug, Default)]
pub struct MacroPlayer {
    state: PlayerState,
    settings: LoopSettings,
}

impl MacroPlayer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: PlayerState {
                event_index: 0,
                start_ms: 0,
                wait_start_ms: 0,
                remaining_loops: Some(0),
            },
            settings: LoopSettings {
                enabled: false,
                count: 0,
                interval_secs: 0,
            },
        }
    }

    /// Take the loop policy from a macro. Without a macro nothing changes.
    pub fn load_settings(&mut self, loaded: Option<&Macro>) {
        if let Some(m) = loaded {
            self.settings = m.loop_settings;
        }
    }

    /// Begin the first pass at `now_ms`.
    pub fn start(&mut self, now_ms: u32) {
        self.state = PlayerState {
            event_index: 0,
            start_ms: now_ms,
            wait_start_ms: now_ms,
            remaining_loops: self.initial_loops(),
        };
        match self.state.remaining_loops {
            Some(passes) => debug!("Playback start, passes {}", passes),
            None => debug!("Playback start, looping"),
        }
    }

    fn initial_loops(&self) -> Option<u32> {
        match self.settings {
            LoopSettings { enabled: false, .. } => Some(1),
            LoopSettings { count: 0, .. } => None,
            LoopSettings { count, .. } => Some(count),
        }
    }

    /// Advance playback by at most one report.
    pub async fn tick<H: HidOutput>(
        &mut self,
        now_ms: u32,
        events: &[InputFrame],
        encoder: &mut HidEncoder<H>,
    ) -> Step {
        let index = self.state.event_index;

        let Some(event) = events.get(index) else {
            if let Err(e) = encoder.send_neutral().await {
                warn!("Neutral report not sent: {}", e);
                return Step::Retry;
            }
            return self.finish_pass(now_ms);
        };

        let elapsed = now_ms.wrapping_sub(self.state.start_ms);
        if elapsed < event.timestamp_ms {
            return Step::Pending;
        }

        encoder.apply_frame(event);
        match encoder.send().await {
            Ok(()) => {
                trace!("Event {} sent at {} ms", index, elapsed);
                self.state.event_index = index + 1;
                Step::Sent(index)
            }
            Err(e) => {
                trace!("Event {} deferred: {}", index, e);
                Step::Retry
            }
        }
    }

    fn finish_pass(&mut self, now_ms: u32) -> Step {
        if let Some(left) = self.state.remaining_loops.as_mut() {
            *left = left.saturating_sub(1);
            if *left == 0 {
                return Step::Finished;
            }
        }
        if self.settings.interval_secs > 0 {
            self.state.wait_start_ms = now_ms;
            Step::Waiting
        } else {
            self.restart(now_ms);
            Step::Restarted
        }
    }

    /// While waiting between passes: start the next pass once the interval
    /// has elapsed. Returns `true` if playback resumed.
    pub fn resume_if_due(&mut self, now_ms: u32) -> bool {
        let waited = now_ms.wrapping_sub(self.state.wait_start_ms);
        if waited < self.settings.interval_ms() {
            return false;
        }
        self.restart(now_ms);
        true
    }

    fn restart(&mut self, now_ms: u32) {
        self.state.event_index = 0;
        self.state.start_ms = now_ms;
    }

    /// Release everything immediately. The position is left as is; the next
    /// playback goes through [`start`](Self::start) again.
    pub async fn stop<H: HidOutput>(&mut self, encoder: &mut HidEncoder<H>) {
        if let Err(e) = encoder.send_neutral().await {
            warn!("Neutral report on stop not sent: {}", e);
        }
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &LoopSettings {
        &self.settings
    }
}
