use avr_device::atmega32u4::TC0;

use crate::config::{CPU_FREQ_HZ, TICK_US};

#[derive(Clone, Copy)]
pub enum Prescaler {
    Stop = 0,
    Direct = 1,
    Div8 = 2,
    Div64 = 3,
    Div256 = 4,
    Div1024 = 5,
}

impl Prescaler {
    const fn divisor(self) -> u32 {
        match self {
            Prescaler::Stop => 0,
            Prescaler::Direct => 1,
            Prescaler::Div8 => 8,
            Prescaler::Div64 => 64,
            Prescaler::Div256 => 256,
            Prescaler::Div1024 => 1024,
        }
    }
}

const PRESCALER: Prescaler = Prescaler::Div64;

/// Compare value for one tick: 16 MHz / 64 = 250 kHz, 50 counts = 200 us.
const TICK_COMPARE: u8 =
    (CPU_FREQ_HZ / PRESCALER.divisor() * TICK_US as u32 / 1_000_000 - 1) as u8;

// TCCR0A
const WGM01: u8 = 1 << 1;
// TIMSK0
const OCIE0A: u8 = 1 << 1;

/// Timer0 in CTC mode raising TIMER0_COMPA every `TICK_US`.
pub struct TickTimer {
    tc0: TC0,
}

impl TickTimer {
    pub fn new(tc0: TC0) -> Self {
        unsafe {
            tc0.tccr0b.write(|w| w.bits(Prescaler::Stop as u8));
            tc0.tcnt0.write(|w| w.bits(0));
            tc0.tccr0a.write(|w| w.bits(WGM01));
            tc0.ocr0a.write(|w| w.bits(TICK_COMPARE));
        }
        Self { tc0 }
    }

    /// Start counting and enable the compare match interrupt.
    pub fn start(&mut self) {
        unsafe {
            self.tc0.timsk0.write(|w| w.bits(OCIE0A));
            self.tc0.tccr0b.write(|w| w.bits(PRESCALER as u8));
        }
    }
}
