//! HID output trait and error types.

use core::future::Future;
use switch_proto::SwitchReport;

/// Error type for HID output operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputError {
    /// Device not ready (e.g., USB not enumerated).
    NotReady,
    /// Endpoint did not accept the report in time.
    Busy,
    /// USB/communication I/O error.
    Io,
}

impl core::fmt::Display for OutputError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotReady => write!(f, "transport not ready"),
            Self::Busy => write!(f, "endpoint busy"),
            Self::Io => write!(f, "i/o error"),
        }
    }
}

/// Async trait for the HID report transport.
///
/// Implementations must not wait indefinitely: a report the host is not
/// taking yet is an [`OutputError`], and the caller decides whether to retry.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait HidOutput {
    /// Send one report to the host.
    fn send(&mut self, report: &SwitchReport) -> impl Future<Output = Result<(), OutputError>>;

    /// Check if the transport is ready to accept reports.
    fn is_ready(&self) -> bool;
}
