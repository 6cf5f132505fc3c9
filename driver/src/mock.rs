//! Recording transport and delay for tests.
use crate::hd44780::{ENABLE, REGISTER_SELECT};
use crate::{Transport, TransportError};
use embedded_hal::delay::DelayNs;
use std::cell::{Cell, RefCell};
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Event {
    Write(u8),
    /// Nanoseconds.
    Delay(u64),
}

/// Shared log of everything the driver did, in order.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Rc<RefCell<Vec<Event>>>,
    attempts: Rc<Cell<usize>>,
    fail_at: Rc<Cell<Option<usize>>>,
}

impl Recorder {
    pub fn transport(&self) -> MockTransport {
        MockTransport { recorder: self.clone() }
    }

    pub fn delay(&self) -> MockDelay {
        MockDelay { recorder: self.clone() }
    }

    /// Makes the write attempt with the given zero-based index fail.
    pub fn fail_write(&self, index: usize) {
        self.fail_at.set(Some(index));
    }

    pub fn attempts(&self) -> usize {
        self.attempts.get()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn writes(&self) -> Vec<u8> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Event::Write(byte) => Some(*byte),
                Event::Delay(_) => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

pub struct MockTransport {
    recorder: Recorder,
}

impl Debug for MockTransport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "MockTransport")
    }
}

impl Transport for MockTransport {
    fn write(&mut self, byte: u8) -> Result<(), TransportError> {
        let index = self.recorder.attempts.get();
        self.recorder.attempts.set(index + 1);
        if self.recorder.fail_at.get() == Some(index) {
            return Err(TransportError::NoAcknowledge);
        }
        self.recorder.events.borrow_mut().push(Event::Write(byte));
        Ok(())
    }
}

pub struct MockDelay {
    recorder: Recorder,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.recorder.events.borrow_mut().push(Event::Delay(ns as u64));
    }
}

/// Reassembles `(rs, byte)` pairs from a stream of nibble transfers.
///
/// Each nibble is three writes: setup, enable high, enable low. Panics if the stream doesn't
/// follow that pattern, or if the two halves of a byte disagree on RS.
pub fn decode_bytes(writes: &[u8]) -> Vec<(bool, u8)> {
    assert_eq!(writes.len() % 6, 0, "incomplete byte in {:02x?}", writes);
    writes
        .chunks(6)
        .map(|chunk| {
            let high = decode_nibble(&chunk[0..3]);
            let low = decode_nibble(&chunk[3..6]);
            let rs = high & REGISTER_SELECT != 0;
            assert_eq!(rs, low & REGISTER_SELECT != 0, "RS changed mid-byte in {:02x?}", chunk);
            (rs, (high & 0xF0) | (low >> 4))
        })
        .collect()
}

/// Checks one setup/strobe-high/strobe-low triple and returns the setup byte.
pub fn decode_nibble(writes: &[u8]) -> u8 {
    let [setup, high, low] = writes else {
        panic!("expected three writes, got {:02x?}", writes);
    };
    assert_eq!(setup & ENABLE, 0, "enable set during setup: {:02x?}", writes);
    assert_eq!(*high, setup | ENABLE, "bad strobe-high: {:02x?}", writes);
    assert_eq!(low, setup, "bad strobe-low: {:02x?}", writes);
    *setup
}
