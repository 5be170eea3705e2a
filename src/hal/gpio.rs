use avr_device::atmega32u4::{PORTB, PORTC, PORTD, PORTF};
use core::convert::Infallible;
use core::marker::PhantomData;

use embedded_hal::digital::v2::{InputPin, OutputPin};

pub trait PinMode {}
pub struct Input;
pub struct Output;
impl PinMode for Input {}
impl PinMode for Output {}

/// Pin `PIN` of `PORT` in `MODE`. Zero-sized; all state is in the port
/// registers.
#[derive(Debug)]
pub struct Pin<PORT, const PIN: u8, MODE> {
    _port: PhantomData<PORT>,
    _mode: PhantomData<MODE>,
}

macro_rules! impl_port {
    ($PORT:ident, $pin:ident, $ddr:ident, $port:ident) => {
        impl<const P: u8, MODE: PinMode> Pin<$PORT, P, MODE> {
            pub fn into_output(self) -> Pin<$PORT, P, Output> {
                unsafe {
                    (*$PORT::ptr()).$ddr.modify(|r, w| w.bits(r.bits() | (1 << P)));
                }
                Pin {
                    _port: PhantomData,
                    _mode: PhantomData,
                }
            }

            /// Input without pull-up; the buttons and bridge have their own.
            pub fn into_input(self) -> Pin<$PORT, P, Input> {
                unsafe {
                    (*$PORT::ptr()).$ddr.modify(|r, w| w.bits(r.bits() & !(1 << P)));
                    (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() & !(1 << P)));
                }
                Pin {
                    _port: PhantomData,
                    _mode: PhantomData,
                }
            }
        }

        impl<const P: u8> OutputPin for Pin<$PORT, P, Output> {
            type Error = Infallible;

            #[inline]
            fn set_high(&mut self) -> Result<(), Infallible> {
                avr_device::interrupt::free(|_| unsafe {
                    (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() | (1 << P)));
                });
                Ok(())
            }

            #[inline]
            fn set_low(&mut self) -> Result<(), Infallible> {
                avr_device::interrupt::free(|_| unsafe {
                    (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() & !(1 << P)));
                });
                Ok(())
            }
        }

        impl<const P: u8> InputPin for Pin<$PORT, P, Input> {
            type Error = Infallible;

            #[inline]
            fn is_high(&self) -> Result<bool, Infallible> {
                Ok(unsafe { (*$PORT::ptr()).$pin.read().bits() & (1 << P) != 0 })
            }

            #[inline]
            fn is_low(&self) -> Result<bool, Infallible> {
                self.is_high().map(|high| !high)
            }
        }
    };
}

impl_port!(PORTB, pinb, ddrb, portb);
impl_port!(PORTC, pinc, ddrc, portc);
impl_port!(PORTD, pind, ddrd, portd);
impl_port!(PORTF, pinf, ddrf, portf);

const fn input<PORT, const P: u8>() -> Pin<PORT, P, Input> {
    Pin {
        _port: PhantomData,
        _mode: PhantomData,
    }
}

/// Every pin the board uses, in its reset state (input, no pull-up).
pub struct Pins {
    pub pb0: Pin<PORTB, 0, Input>,
    pub pb1: Pin<PORTB, 1, Input>,
    pub pb2: Pin<PORTB, 2, Input>,
    pub pb3: Pin<PORTB, 3, Input>,
    pub pb4: Pin<PORTB, 4, Input>,
    pub pb5: Pin<PORTB, 5, Input>,
    pub pb6: Pin<PORTB, 6, Input>,
    pub pc6: Pin<PORTC, 6, Input>,
    pub pd0: Pin<PORTD, 0, Input>,
    pub pd1: Pin<PORTD, 1, Input>,
    pub pd4: Pin<PORTD, 4, Input>,
    pub pd5: Pin<PORTD, 5, Input>,
    pub pf4: Pin<PORTF, 4, Input>,
    pub pf5: Pin<PORTF, 5, Input>,
    pub pf6: Pin<PORTF, 6, Input>,
    pub pf7: Pin<PORTF, 7, Input>,
}

impl Pins {
    /// Consume the port peripherals so no other code touches them.
    pub fn new(_portb: PORTB, _portc: PORTC, _portd: PORTD, _portf: PORTF) -> Self {
        Self {
            pb0: input(),
            pb1: input(),
            pb2: input(),
            pb3: input(),
            pb4: input(),
            pb5: input(),
            pb6: input(),
            pc6: input(),
            pd0: input(),
            pd1: input(),
            pd4: input(),
            pd5: input(),
            pf4: input(),
            pf5: input(),
            pf6: input(),
            pf7: input(),
        }
    }
}

/// Pro Micro wiring of the analyzer board.
pub mod board {
    use super::*;

    // AD9850
    pub type DdsData = Pin<PORTD, 0, Output>;
    pub type DdsReset = Pin<PORTD, 1, Output>;
    pub type DdsFqUd = Pin<PORTD, 4, Output>;
    pub type DdsWClk = Pin<PORTC, 6, Output>;

    // HD44780
    pub type LcdD4 = Pin<PORTB, 1, Output>;
    pub type LcdD6 = Pin<PORTB, 2, Output>;
    pub type LcdD5 = Pin<PORTB, 3, Output>;
    pub type LcdRs = Pin<PORTB, 4, Output>;
    pub type LcdE = Pin<PORTB, 5, Output>;
    pub type LcdD7 = Pin<PORTB, 6, Output>;

    // Active-low push buttons
    pub type ModeButton = Pin<PORTF, 5, Input>;
    pub type BandButton = Pin<PORTF, 4, Input>;

    // On-board RX/TX LEDs, lit when low
    pub type RxLed = Pin<PORTB, 0, Output>;
    pub type TxLed = Pin<PORTD, 5, Output>;

    // Bridge detector inputs, ADC6 and ADC7
    pub type ForwardIn = Pin<PORTF, 6, Input>;
    pub type ReverseIn = Pin<PORTF, 7, Input>;
}
