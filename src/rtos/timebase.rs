//! Monotonic millisecond/microsecond counters
//!
//! Both counters are 16 bit and wrap every 65 536 units. Consumers must never
//! compare raw readings; use [`elapsed`] which is correct across the wrap as
//! long as the measured interval itself is shorter than one full period.

use core::cell::Cell;

use critical_section::Mutex;

/// Wrap-safe difference `t2 - t1` of two counter readings.
#[inline]
pub fn elapsed(t2: u16, t1: u16) -> u16 {
    t2.wrapping_sub(t1)
}

#[derive(Clone, Copy)]
struct Counters {
    ms: u16,
    us: u16,
    // Microseconds accumulated towards the next millisecond
    partial_us: u16,
}

impl Counters {
    const ZERO: Self = Self {
        ms: 0,
        us: 0,
        partial_us: 0,
    };
}

pub struct TimeBase {
    counters: Mutex<Cell<Counters>>,
}

impl TimeBase {
    pub const fn new() -> Self {
        Self {
            counters: Mutex::new(Cell::new(Counters::ZERO)),
        }
    }

    pub fn reset(&self) {
        critical_section::with(|cs| self.counters.borrow(cs).set(Counters::ZERO));
    }

    /// Advance both counters by one timer period. Called from the timer ISR.
    pub fn tick(&self, period_us: u16) {
        critical_section::with(|cs| {
            let cell = self.counters.borrow(cs);
            let mut c = cell.get();
            c.us = c.us.wrapping_add(period_us);
            c.partial_us += period_us;
            while c.partial_us >= 1000 {
                c.partial_us -= 1000;
                c.ms = c.ms.wrapping_add(1);
            }
            cell.set(c);
        });
    }

    #[inline]
    pub fn msec(&self) -> u16 {
        critical_section::with(|cs| self.counters.borrow(cs).get().ms)
    }

    #[inline]
    pub fn usec(&self) -> u16 {
        critical_section::with(|cs| self.counters.borrow(cs).get().us)
    }
}

impl Default for TimeBase {
    fn default() -> Self {
        Self::new()
    }
}
