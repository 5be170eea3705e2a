use avr_device::atmega32u4::ADC;
use core::convert::Infallible;

use crate::drivers::AdcHardware;

// ADMUX
const REFS_AVCC: u8 = 1 << 6;
const MUX_MASK: u8 = 0x1f;

// ADCSRA
const ADEN: u8 = 1 << 7;
const ADSC: u8 = 1 << 6;
const ADIE: u8 = 1 << 3;
/// 16 MHz / 128 = 125 kHz conversion clock
const ADPS_DIV128: u8 = 0b111;

/// Single-ended conversions against AVCC, one channel at a time.
pub struct Adc {
    _adc: ADC,
}

impl Adc {
    pub fn new(adc: ADC) -> Self {
        unsafe {
            adc.adcsra.write(|w| w.bits(ADEN | ADPS_DIV128));
            adc.admux.write(|w| w.bits(REFS_AVCC));
        }
        Self { _adc: adc }
    }

    fn regs(&self) -> &avr_device::atmega32u4::adc::RegisterBlock {
        unsafe { &*ADC::ptr() }
    }
}

impl AdcHardware for Adc {
    fn start(&mut self, channel: u8) {
        let regs = self.regs();
        unsafe {
            regs.admux.write(|w| w.bits(REFS_AVCC | (channel & MUX_MASK)));
            regs.adcsra.modify(|r, w| w.bits(r.bits() | ADSC | ADIE));
        }
    }

    fn read(&mut self) -> nb::Result<u16, Infallible> {
        let regs = self.regs();
        if regs.adcsra.read().bits() & ADSC != 0 {
            return Err(nb::Error::WouldBlock);
        }
        // The 16-bit read takes ADCL before ADCH
        Ok(regs.adc.read().bits())
    }
}
