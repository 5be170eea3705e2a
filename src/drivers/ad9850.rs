//! AD9850 direct digital synthesizer, serial load mode
//!
//! The 40-bit control word is shifted in LSB first on W_CLK: 32 bits of
//! tuning word followed by 8 zero bits (no phase offset, power up), then
//! latched with a pulse on FQ_UD.

use embedded_hal::digital::v2::{OutputPin, PinState};

use crate::config::DDS_CLOCK_HZ;
use crate::sweep::Synthesizer;

/// Tuning word for `hz` against the 125 MHz reference clock.
pub const fn tuning_word(hz: u32) -> u32 {
    (hz as u64 * u32::MAX as u64 / DDS_CLOCK_HZ as u64) as u32
}

pub struct Ad9850<DATA, WCLK, FQUD, RESET> {
    data: DATA,
    w_clk: WCLK,
    fq_ud: FQUD,
    reset: RESET,
}

impl<DATA, WCLK, FQUD, RESET, E> Ad9850<DATA, WCLK, FQUD, RESET>
where
    DATA: OutputPin<Error = E>,
    WCLK: OutputPin<Error = E>,
    FQUD: OutputPin<Error = E>,
    RESET: OutputPin<Error = E>,
{
    /// Take ownership of the control pins and drive them all low.
    pub fn new(mut data: DATA, mut w_clk: WCLK, mut fq_ud: FQUD, mut reset: RESET) -> Result<Self, E> {
        data.set_low()?;
        w_clk.set_low()?;
        fq_ud.set_low()?;
        reset.set_low()?;
        Ok(Self {
            data,
            w_clk,
            fq_ud,
            reset,
        })
    }

    pub fn release(self) -> (DATA, WCLK, FQUD, RESET) {
        (self.data, self.w_clk, self.fq_ud, self.reset)
    }

    fn clock(&mut self) -> Result<(), E> {
        self.w_clk.set_high()?;
        self.w_clk.set_low()
    }
}

impl<DATA, WCLK, FQUD, RESET, E> Synthesizer for Ad9850<DATA, WCLK, FQUD, RESET>
where
    DATA: OutputPin<Error = E>,
    WCLK: OutputPin<Error = E>,
    FQUD: OutputPin<Error = E>,
    RESET: OutputPin<Error = E>,
{
    type Error = E;

    /// Pulse RESET. The minimum width of 5 reference clocks is far shorter
    /// than one CPU instruction.
    fn reset(&mut self) -> Result<(), E> {
        self.reset.set_high()?;
        self.reset.set_low()
    }

    fn set_freq(&mut self, hz: u32) -> Result<(), E> {
        let mut word = tuning_word(hz);
        for _ in 0..32 {
            self.data.set_state(PinState::from(word & 1 != 0))?;
            self.clock()?;
            word >>= 1;
        }

        // Control, power-down and phase bits
        self.data.set_low()?;
        for _ in 0..8 {
            self.clock()?;
        }

        self.fq_ud.set_high()?;
        self.fq_ud.set_low()
    }
}
