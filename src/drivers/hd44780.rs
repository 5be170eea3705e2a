//! HD44780 character LCD in 4-bit write-only mode
//!
//! Every controller delay is spent in [`Kernel::yield_usec`], so the other
//! tasks keep running while the LCD is busy.

use embedded_hal::digital::v2::{OutputPin, PinState};

use crate::display::CharacterDisplay;
use crate::rtos::Kernel;

/// DDRAM columns per row; the cursor wraps to the next row after this.
const DDRAM_COLUMNS: usize = 40;

/// Command execution time of everything but clear and home.
const CMD_US: u16 = 37;
/// Execution time of clear display and return home.
const SLOW_CMD_US: u16 = 1520;

const CLEAR_DISPLAY: u8 = 0b0000_0001;
const RETURN_HOME: u8 = 0b0000_0010;
/// Increment the cursor after each write, no display shift
const ENTRY_MODE: u8 = 0b0000_0110;
/// Display on, cursor off, no blink
const DISPLAY_ON: u8 = 0b0000_1100;
const CURSOR_RIGHT: u8 = 0b0001_0100;
/// 4-bit bus, 2 lines, 5x8 font
const FUNCTION_SET: u8 = 0b0010_1000;
const SET_DDRAM_ADDR: u8 = 0b1000_0000;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Register {
    Instruction,
    Data,
}

pub struct Hd44780<'k, RS, EN, D4, D5, D6, D7> {
    kernel: &'k Kernel,
    rs: RS,
    en: EN,
    d4: D4,
    d5: D5,
    d6: D6,
    d7: D7,
}

impl<'k, RS, EN, D4, D5, D6, D7, E> Hd44780<'k, RS, EN, D4, D5, D6, D7>
where
    RS: OutputPin<Error = E>,
    EN: OutputPin<Error = E>,
    D4: OutputPin<Error = E>,
    D5: OutputPin<Error = E>,
    D6: OutputPin<Error = E>,
    D7: OutputPin<Error = E>,
{
    pub fn new(kernel: &'k Kernel, rs: RS, en: EN, d4: D4, d5: D5, d6: D6, d7: D7) -> Self {
        Self {
            kernel,
            rs,
            en,
            d4,
            d5,
            d6,
            d7,
        }
    }

    /// Power-up initialization by instruction followed by clear and home.
    /// Must run at least once before anything else is written.
    pub async fn init(&mut self) -> Result<(), E> {
        self.rs.set_low()?;
        self.en.set_low()?;
        self.write_nibble(0)?;

        self.kernel.yield_usec(10_000).await;

        // Three times 8-bit mode, then switch to 4-bit
        self.pulse_nibble(0b0011).await?;
        self.kernel.yield_usec(4100).await;
        self.pulse_nibble(0b0011).await?;
        self.kernel.yield_usec(100).await;
        self.pulse_nibble(0b0011).await?;
        self.kernel.yield_usec(CMD_US).await;
        self.pulse_nibble(0b0010).await?;
        self.kernel.yield_usec(CMD_US).await;

        for cmd in [FUNCTION_SET, DISPLAY_ON, ENTRY_MODE] {
            self.command(cmd).await?;
            self.kernel.yield_usec(CMD_US).await;
        }

        self.clear_display().await?;
        self.home().await
    }

    pub async fn clear_display(&mut self) -> Result<(), E> {
        self.command(CLEAR_DISPLAY).await?;
        self.kernel.yield_usec(SLOW_CMD_US).await;
        Ok(())
    }

    pub async fn home(&mut self) -> Result<(), E> {
        self.command(RETURN_HOME).await?;
        self.kernel.yield_usec(SLOW_CMD_US).await;
        Ok(())
    }

    pub async fn put_char(&mut self, c: u8) -> Result<(), E> {
        self.send(Register::Data, c).await?;
        self.kernel.yield_usec(CMD_US).await;
        Ok(())
    }

    async fn command(&mut self, cmd: u8) -> Result<(), E> {
        self.send(Register::Instruction, cmd).await
    }

    async fn send(&mut self, register: Register, byte: u8) -> Result<(), E> {
        self.rs.set_state(PinState::from(register == Register::Data))?;
        self.pulse_nibble(byte >> 4).await?;
        self.kernel.yield_usec(CMD_US).await;
        self.pulse_nibble(byte & 0x0f).await?;
        self.kernel.yield_usec(CMD_US).await;
        Ok(())
    }

    /// Put `nibble` on D4..D7 and latch it on the falling edge of E.
    async fn pulse_nibble(&mut self, nibble: u8) -> Result<(), E> {
        self.write_nibble(nibble)?;
        self.en.set_low()?;
        self.kernel.yield_usec(1).await;
        self.en.set_high()?;
        self.kernel.yield_usec(1).await;
        self.en.set_low()
    }

    fn write_nibble(&mut self, nibble: u8) -> Result<(), E> {
        let bit = |n: u8| PinState::from(nibble & (1 << n) != 0);
        self.d4.set_state(bit(0))?;
        self.d5.set_state(bit(1))?;
        self.d6.set_state(bit(2))?;
        self.d7.set_state(bit(3))
    }
}

impl<'k, RS, EN, D4, D5, D6, D7, E> CharacterDisplay for Hd44780<'k, RS, EN, D4, D5, D6, D7>
where
    RS: OutputPin<Error = E>,
    EN: OutputPin<Error = E>,
    D4: OutputPin<Error = E>,
    D5: OutputPin<Error = E>,
    D6: OutputPin<Error = E>,
    D7: OutputPin<Error = E>,
{
    type Error = E;

    async fn init(&mut self) -> Result<(), E> {
        Hd44780::init(self).await
    }

    async fn clear(&mut self) -> Result<(), E> {
        self.clear_display().await
    }

    async fn set_line(&mut self, row: u8) -> Result<(), E> {
        // Two-line controller: row 1 and beyond map to the second line
        let addr = match row {
            0 => 0x00,
            _ => 0x40,
        };
        self.command(SET_DDRAM_ADDR | addr).await?;
        self.kernel.yield_usec(CMD_US).await;
        Ok(())
    }

    async fn put_str(&mut self, text: &[u8]) -> Result<(), E> {
        for &c in text.iter().take(DDRAM_COLUMNS) {
            self.put_char(c).await?;
        }
        // Move over the rest of the row so stale text is not left visible
        for _ in text.len()..DDRAM_COLUMNS {
            self.command(CURSOR_RIGHT).await?;
            self.kernel.yield_usec(CMD_US).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::Screen;
    use crate::sweep::{Mode, BANDS};
    use crate::testing::{block_on, LogPin};
    use rstest::rstest;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::vec::Vec;

    type PinLog = Rc<RefCell<Vec<(&'static str, bool)>>>;
    type TestLcd<'k> = Hd44780<'k, LogPin, LogPin, LogPin, LogPin, LogPin, LogPin>;

    fn lcd<'k>(kernel: &'k Kernel, log: &PinLog) -> TestLcd<'k> {
        Hd44780::new(
            kernel,
            LogPin::new("rs", log),
            LogPin::new("e", log),
            LogPin::new("d4", log),
            LogPin::new("d5", log),
            LogPin::new("d6", log),
            LogPin::new("d7", log),
        )
    }

    /// Replay the pin log and return `(rs, nibble)` for every falling edge
    /// of E.
    fn latched(log: &PinLog) -> Vec<(bool, u8)> {
        let mut rs = false;
        let mut en = false;
        let mut data = 0u8;
        let mut out = Vec::new();
        for &(pin, level) in log.borrow().iter() {
            let bit = match pin {
                "d4" => 0,
                "d5" => 1,
                "d6" => 2,
                "d7" => 3,
                "rs" => {
                    rs = level;
                    continue;
                }
                _ => {
                    if en && !level {
                        out.push((rs, data));
                    }
                    en = level;
                    continue;
                }
            };
            if level {
                data |= 1 << bit;
            } else {
                data &= !(1 << bit);
            }
        }
        out
    }

    /// Pair nibbles after the 4-bit switch into bytes.
    fn bytes(nibbles: &[(bool, u8)]) -> Vec<(bool, u8)> {
        nibbles
            .chunks(2)
            .map(|pair| (pair[0].0, pair[0].1 << 4 | pair[1].1))
            .collect()
    }

    #[test]
    fn init_sequence_switches_to_four_bits_and_configures() {
        let kernel = Kernel::new();
        let log = PinLog::default();
        let mut lcd = lcd(&kernel, &log);
        block_on(&kernel, lcd.init()).unwrap();

        let nibbles = latched(&log);
        assert_eq!(
            nibbles[..4],
            [(false, 0b0011), (false, 0b0011), (false, 0b0011), (false, 0b0010)]
        );
        assert_eq!(
            bytes(&nibbles[4..]),
            [
                (false, FUNCTION_SET),
                (false, DISPLAY_ON),
                (false, ENTRY_MODE),
                (false, CLEAR_DISPLAY),
                (false, RETURN_HOME),
            ]
        );
        // Power-up wait alone is 10 ms
        assert!(kernel.msec() >= 10 + 4);
    }

    #[test]
    fn put_str_pads_the_ddram_row() {
        let kernel = Kernel::new();
        let log = PinLog::default();
        let mut lcd = lcd(&kernel, &log);
        block_on(&kernel, async {
            lcd.set_line(1).await?;
            lcd.put_str(b"Hi").await
        })
        .unwrap();

        let sent = bytes(&latched(&log));
        assert_eq!(sent.len(), 1 + DDRAM_COLUMNS);
        assert_eq!(sent[0], (false, 0xc0));
        assert_eq!(sent[1..3], [(true, b'H'), (true, b'i')]);
        assert!(sent[3..].iter().all(|&b| b == (false, CURSOR_RIGHT)));
    }

    #[rstest]
    #[case(0, 0x80)]
    #[case(1, 0xc0)]
    #[case(4, 0xc0)]
    #[case(255, 0xc0)]
    fn set_line_addresses_one_of_two_rows(#[case] row: u8, #[case] command: u8) {
        let kernel = Kernel::new();
        let log = PinLog::default();
        let mut lcd = lcd(&kernel, &log);
        block_on(&kernel, lcd.set_line(row)).unwrap();

        assert_eq!(bytes(&latched(&log)), [(false, command)]);
    }

    #[test]
    fn show_writes_both_rows() {
        let kernel = Kernel::new();
        let log = PinLog::default();
        let mut lcd = lcd(&kernel, &log);
        let screen = Screen::selection(Mode::BandEdge, &BANDS[0]);
        block_on(&kernel, lcd.show(&screen)).unwrap();

        let sent = bytes(&latched(&log));
        let text: Vec<u8> = sent.iter().filter(|b| b.0).map(|b| b.1).collect();
        assert_eq!(text, b"Mode: band edgeBand: 160m");
        assert_eq!(sent[0], (false, CLEAR_DISPLAY));
        assert_eq!(sent[1], (false, SET_DDRAM_ADDR));
        assert_eq!(sent[2 + DDRAM_COLUMNS], (false, SET_DDRAM_ADDR | 0x40));
    }
}
