use avr_device::atmega32u4::USART1;
use core::convert::Infallible;

use crate::config::{CPU_FREQ_HZ, UART_BAUD};

/// (16_000_000 / (16 * 9600)) - 1 = 103
const UBRR: u16 = (CPU_FREQ_HZ / (16 * UART_BAUD) - 1) as u16;

// UCSR1A
const UDRE1: u8 = 1 << 5;
const TXC1: u8 = 1 << 6;
// UCSR1B
const TXEN1: u8 = 1 << 3;
// UCSR1C: 8 data bits, no parity, 1 stop bit
const UCSZ_8N1: u8 = 0b11 << 1;

/// Transmit-only USART1 on PD3, polled.
pub struct Uart {
    usart: USART1,
}

impl Uart {
    pub fn new(usart: USART1) -> Self {
        unsafe {
            usart.ubrr1.write(|w| w.bits(UBRR));
            usart.ucsr1c.write(|w| w.bits(UCSZ_8N1));
            usart.ucsr1b.write(|w| w.bits(TXEN1));
        }
        Self { usart }
    }
}

impl embedded_hal::serial::Write<u8> for Uart {
    type Error = Infallible;

    fn write(&mut self, byte: u8) -> nb::Result<(), Infallible> {
        if self.usart.ucsr1a.read().bits() & UDRE1 == 0 {
            return Err(nb::Error::WouldBlock);
        }
        // Clear TXC so flush waits for this byte
        unsafe {
            self.usart
                .ucsr1a
                .modify(|r, w| w.bits(r.bits() | TXC1));
            self.usart.udr1.write(|w| w.bits(byte));
        }
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Infallible> {
        let status = self.usart.ucsr1a.read().bits();
        if status & UDRE1 != 0 && status & TXC1 != 0 {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }
}
