use embedded_hal::serial::Write;

use crate::logger::Level;

/// Line-oriented text output over a blocking serial port.
pub struct SerialConsole<TX> {
    tx: TX,
}

impl<TX, E> SerialConsole<TX>
where
    TX: Write<u8, Error = E>,
{
    pub fn new(tx: TX) -> Self {
        Self { tx }
    }

    pub fn release(self) -> TX {
        self.tx
    }

    pub fn write_byte(&mut self, byte: u8) -> Result<(), E> {
        nb::block!(self.tx.write(byte))
    }

    pub fn write_str(&mut self, s: &str) -> Result<(), E> {
        s.bytes().try_for_each(|b| self.write_byte(b))
    }

    pub fn write_line(&mut self, s: &str) -> Result<(), E> {
        self.write_str(s)?;
        self.write_str("\r\n")
    }

    /// One log record: level tag, message and line ending, then flush.
    pub fn log(&mut self, level: Level, line: &str) -> Result<(), E> {
        self.write_str(level.tag())?;
        self.write_line(line)?;
        nb::block!(self.tx.flush())
    }
}

impl<TX, E> ufmt::uWrite for SerialConsole<TX>
where
    TX: Write<u8, Error = E>,
{
    type Error = E;

    fn write_str(&mut self, s: &str) -> Result<(), E> {
        SerialConsole::write_str(self, s)
    }
}
