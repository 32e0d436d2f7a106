//! Polled push-button debouncer.
//!
//! The control loop samples the pin every iteration; a new level is accepted
//! only after it has been stable for the debounce time.

/// Default settle time.
pub const DEBOUNCE_MS: u32 = 30;

/// A debounced level change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEdge {
    Pressed,
    Released,
}

#[derive(Debug)]
pub struct Debouncer {
    debounce_ms: u32,
    stable: bool,
    candidate: bool,
    candidate_since_ms: u32,
}

impl Debouncer {
    /// `pressed` is the level at boot; no edge is reported for it.
    #[must_use]
    pub const fn new(pressed: bool, debounce_ms: u32) -> Self {
        Self {
            debounce_ms,
            stable: pressed,
            candidate: pressed,
            candidate_since_ms: 0,
        }
    }

    /// Feed one sample. `pressed` is the logical level (active-low pins are
    /// inverted by the caller).
    pub fn update(&mut self, pressed: bool, now_ms: u32) -> Option<ButtonEdge> {
        if pressed != self.candidate {
            self.candidate = pressed;
            self.candidate_since_ms = now_ms;
            return None;
        }
        if self.candidate == self.stable
            || now_ms.wrapping_sub(self.candidate_since_ms) < self.debounce_ms
        {
            return None;
        }
        self.stable = self.candidate;
        Some(if self.stable {
            ButtonEdge::Pressed
        } else {
            ButtonEdge::Released
        })
    }

    #[inline]
    #[must_use]
    pub const fn is_pressed(&self) -> bool {
        self.stable
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(false, DEBOUNCE_MS)
    }
}
