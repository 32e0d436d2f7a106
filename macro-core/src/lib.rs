//! Platform-agnostic macro player.
//!
//! Everything between the wireless link and the USB report, with the
//! hardware left behind two traits:
//!
//! - [`output`]: HID report transport ([`HidOutput`])
//! - [`storage`]: persisted macro blob ([`MacroStore`])
//! - [`encoder`]: current report plus its transport ([`HidEncoder`])
//! - [`ingest`]: link message classification and the transfer buffer
//! - [`player`]: timed playback with loop policy ([`MacroPlayer`])
//! - [`status`]: device status and indicator patterns ([`DeviceStatus`])
//! - [`button`]: start/stop button debouncing ([`Debouncer`])
//! - [`controller`]: owns all of the above and dispatches [`DeviceEvent`]s
//!
//! # Example
//!
//! ```ignore
//! let mut controller = Controller::new(usb_output, flash_store);
//! controller.restore();
//! loop {
//!     while let Some(event) = next_event() {
//!         controller.handle(event, now_ms()).await;
//!     }
//!     controller.poll(now_ms()).await;
//! }
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting and logging (for embedded targets)

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

// must come first so the logging macros are visible to every module
mod fmt;

pub mod button;
pub mod controller;
pub mod encoder;
pub mod ingest;
pub mod output;
pub mod player;
pub mod status;
pub mod storage;

#[cfg(test)]
mod testing;

pub use button::{ButtonEdge, Debouncer, DEBOUNCE_MS};
pub use controller::{Controller, DeviceEvent};
pub use encoder::HidEncoder;
pub use ingest::{Message, TransferBuffer};
pub use output::{HidOutput, OutputError};
pub use player::{MacroPlayer, PlayerState, Step};
pub use status::{DeviceStatus, Indicator, StatusCell};
pub use storage::{MacroStore, StorageError};
