//! ATmega32U4 peripherals used by the analyzer

pub mod adc;
pub mod gpio;
pub mod timer;
pub mod uart;

pub use adc::Adc;
pub use gpio::{board, Input, Output, Pin, Pins};
pub use timer::{Prescaler, TickTimer};
pub use uart::Uart;
