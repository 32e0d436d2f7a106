//! Host-side mocks shared by the unit tests.

extern crate std;

use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};
use std::vec::Vec;

use switch_proto::SwitchReport;

use crate::output::{HidOutput, OutputError};
use crate::storage::{MacroStore, StorageError};

/// Records every report it accepts; can refuse a number of sends first.
pub struct MockHid {
    pub sent: Vec<[u8; SwitchReport::SIZE]>,
    pub ready: bool,
    pub fail_next: usize,
}

impl MockHid {
    pub fn new() -> Self {
        Self {
            sent: Vec::new(),
            ready: true,
            fail_next: 0,
        }
    }

    pub fn last(&self) -> Option<[u8; SwitchReport::SIZE]> {
        self.sent.last().copied()
    }
}

impl HidOutput for MockHid {
    fn send(&mut self, report: &SwitchReport) -> impl Future<Output = Result<(), OutputError>> {
        let result = if self.fail_next > 0 {
            self.fail_next -= 1;
            Err(OutputError::Busy)
        } else {
            self.sent.push(*report.as_bytes());
            Ok(())
        };
        core::future::ready(result)
    }

    fn is_ready(&self) -> bool {
        self.ready
    }
}

/// In-memory blob store that counts writes.
pub struct MockStore {
    pub blob: Option<Vec<u8>>,
    pub saves: usize,
    pub fail_save: bool,
    pub fail_load: bool,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            blob: None,
            saves: 0,
            fail_save: false,
            fail_load: false,
        }
    }

    pub fn with_blob(blob: &[u8]) -> Self {
        let mut store = Self::new();
        store.blob = Some(blob.to_vec());
        store
    }
}

impl MacroStore for MockStore {
    fn exists(&mut self) -> bool {
        self.blob.is_some()
    }

    fn load(&mut self, buf: &mut [u8]) -> Result<usize, StorageError> {
        if self.fail_load {
            return Err(StorageError::Io);
        }
        let blob = self.blob.as_ref().ok_or(StorageError::NotFound)?;
        let dest = buf.get_mut(..blob.len()).ok_or(StorageError::TooLarge)?;
        dest.copy_from_slice(blob);
        Ok(blob.len())
    }

    fn save(&mut self, document: &[u8]) -> Result<(), StorageError> {
        if self.fail_save {
            return Err(StorageError::Io);
        }
        self.saves += 1;
        self.blob = Some(document.to_vec());
        Ok(())
    }
}

// Helper to run a future to completion (simple blocking executor)
pub fn block_on<F: Future>(mut f: F) -> F::Output {
    fn noop_raw_waker() -> RawWaker {
        fn noop(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            noop_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, noop, noop, noop);
        RawWaker::new(core::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(noop_raw_waker()) };
    let mut cx = Context::from_waker(&waker);

    // SAFETY: We don't move f after pinning
    let mut f = unsafe { Pin::new_unchecked(&mut f) };

    loop {
        match f.as_mut().poll(&mut cx) {
            Poll::Ready(result) => return result,
            Poll::Pending => {
                panic!("Mock future returned Pending unexpectedly");
            }
        }
    }
}
