//! HID report encoder: an in-memory report bound to its transport.

use switch_proto::{Buttons, Hat, InputFrame, LiveFrame, Stick, SwitchReport};

use crate::output::{HidOutput, OutputError};

/// Owns the current [`SwitchReport`] and the [`HidOutput`] it is sent on.
///
/// Setters only touch the in-memory report; nothing reaches the host until
/// [`send`](Self::send) succeeds.
pub struct HidEncoder<H> {
    report: SwitchReport,
    output: H,
}

impl<H: HidOutput> HidEncoder<H> {
    /// Create an encoder with a neutral report.
    pub fn new(output: H) -> Self {
        Self {
            report: SwitchReport::neutral(),
            output,
        }
    }

    pub fn set_buttons(&mut self, buttons: Buttons) {
        self.report.set_buttons(buttons);
    }

    pub fn press(&mut self, buttons: Buttons) {
        self.report.press(buttons);
    }

    pub fn release(&mut self, buttons: Buttons) {
        self.report.release(buttons);
    }

    pub fn set_hat(&mut self, hat: Hat) {
        self.report.set_hat(hat);
    }

    pub fn set_stick(&mut self, stick: Stick, x: f32, y: f32) {
        self.report.set_stick(stick, x, y);
    }

    pub fn set_stick_delta(&mut self, stick: Stick, x: i8, y: i8) {
        self.report.set_stick_delta(stick, x, y);
    }

    /// Reset the report to neutral.
    pub fn release_all(&mut self) {
        self.report.release_all();
    }

    /// Load a recorded macro event into the report.
    pub fn apply_frame(&mut self, frame: &InputFrame) {
        frame.apply(&mut self.report);
    }

    /// Load a live frame into the report.
    pub fn apply_live(&mut self, frame: &LiveFrame) {
        frame.apply(&mut self.report);
    }

    /// Transmit the current report.
    ///
    /// Fails with [`OutputError::NotReady`] without touching the transport if
    /// it is not ready. The report is kept either way so the caller can retry.
    pub async fn send(&mut self) -> Result<(), OutputError> {
        if !self.output.is_ready() {
            return Err(OutputError::NotReady);
        }
        self.output.send(&self.report).await
    }

    /// Reset to neutral and transmit.
    pub async fn send_neutral(&mut self) -> Result<(), OutputError> {
        self.release_all();
        self.send().await
    }

    #[inline]
    #[must_use]
    pub fn report(&self) -> &SwitchReport {
        &self.report
    }

    /// Get a reference to the transport.
    pub fn output(&self) -> &H {
        &self.output
    }

    /// Get a mutable reference to the transport.
    pub fn output_mut(&mut self) -> &mut H {
        &mut self.output
    }
}
