//! Two-line text screens rendered for a 16x2 character LCD

use core::convert::Infallible;

use ufmt::{uDisplay, uWrite, uwrite, Formatter};

use crate::sweep::{Band, EdgeProfile, Mode, SweepResult};

/// Visible characters per LCD row.
pub const LINE_WIDTH: usize = 16;

/// One row of text. Writes past the visible width are dropped.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Line {
    buf: [u8; LINE_WIDTH],
    len: u8,
}

impl Line {
    pub const fn empty() -> Self {
        Self {
            buf: [b' '; LINE_WIDTH],
            len: 0,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len as usize]
    }

    pub fn as_str(&self) -> &str {
        core::str::from_utf8(self.as_bytes()).unwrap_or("")
    }
}

impl Default for Line {
    fn default() -> Self {
        Self::empty()
    }
}

impl uWrite for Line {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
        for &b in s.as_bytes() {
            if self.len as usize == LINE_WIDTH {
                break;
            }
            self.buf[self.len as usize] = b;
            self.len += 1;
        }
        Ok(())
    }
}

impl core::fmt::Debug for Line {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(self.as_str(), f)
    }
}

/// Unsigned integer right-aligned in a fixed-width field.
pub struct Padded {
    value: u32,
    width: u8,
    fill: u8,
}

impl Padded {
    /// Like `%{width}d`
    pub fn spaces(value: u32, width: u8) -> Self {
        Self {
            value,
            width,
            fill: b' ',
        }
    }

    /// Like `%0{width}d`
    pub fn zeros(value: u32, width: u8) -> Self {
        Self {
            value,
            width,
            fill: b'0',
        }
    }
}

impl uDisplay for Padded {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        // u32::MAX has 10 digits
        let mut digits = [0u8; 10];
        let mut n = 0;
        let mut v = self.value;
        loop {
            digits[n] = b'0' + (v % 10) as u8;
            n += 1;
            v /= 10;
            if v == 0 {
                break;
            }
        }

        let mut out = [self.fill; LINE_WIDTH];
        let width = (self.width as usize).clamp(n, LINE_WIDTH);
        for (slot, &d) in out[width - n..width].iter_mut().zip(digits[..n].iter().rev()) {
            *slot = d;
        }
        f.write_str(core::str::from_utf8(&out[..width]).unwrap_or(""))
    }
}

/// Contents of both LCD rows.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Screen {
    pub lines: [Line; 2],
}

impl Screen {
    pub const fn blank() -> Self {
        Self {
            lines: [Line::empty(), Line::empty()],
        }
    }

    /// `Freq: MM.HHHHHH` / `SWR: II.TTT`
    pub fn result(result: SweepResult) -> Self {
        let mut screen = Self::blank();
        let [freq, swr] = &mut screen.lines;
        let _ = uwrite!(
            freq,
            "Freq: {}.{}",
            Padded::spaces(result.hz / 1_000_000, 2),
            Padded::zeros(result.hz % 1_000_000, 6)
        );
        let _ = uwrite!(
            swr,
            "SWR: {}.{}",
            Padded::spaces(u32::from(result.vswr / 1000), 2),
            Padded::zeros(u32::from(result.vswr % 1000), 3)
        );
        screen
    }

    /// Three columns (band start, middle, stop) in hundredths.
    pub fn edges(profile: EdgeProfile) -> Self {
        let mut screen = Self::blank();
        let [header, values] = &mut screen.lines;
        let _ = uwrite!(header, "A     B     C");
        let [a, b, c] = [profile.low, profile.mid, profile.high].map(|v| {
            let v = u32::from(v);
            (Padded::spaces(v / 1000, 1), Padded::zeros((v % 1000) / 10, 2))
        });
        let _ = uwrite!(values, "{}.{}  {}.{}  {}.{}", a.0, a.1, b.0, b.1, c.0, c.1);
        screen
    }

    /// Mode/band selection shown while buttons are being pressed.
    pub fn selection(mode: Mode, band: &Band) -> Self {
        let mut screen = Self::blank();
        let [top, bottom] = &mut screen.lines;
        let _ = uwrite!(top, "Mode: {}", mode.name());
        let _ = uwrite!(bottom, "Band: {}", band.name);
        screen
    }
}

/// Character LCD addressed by row. Implementations may yield to other tasks
/// while waiting on the controller.
#[allow(async_fn_in_trait)]
pub trait CharacterDisplay {
    type Error;

    /// Bring the controller up after power on.
    async fn init(&mut self) -> Result<(), Self::Error>;

    async fn clear(&mut self) -> Result<(), Self::Error>;

    /// Move the cursor to the start of `row`. Rows past the bottom select
    /// the bottom row.
    async fn set_line(&mut self, row: u8) -> Result<(), Self::Error>;

    /// Write `text` at the cursor and blank the rest of the row.
    async fn put_str(&mut self, text: &[u8]) -> Result<(), Self::Error>;

    /// Clear the display and write both rows of `screen`.
    async fn show(&mut self, screen: &Screen) -> Result<(), Self::Error> {
        self.clear().await?;
        for (row, line) in (0u8..).zip(screen.lines.iter()) {
            self.set_line(row).await?;
            self.put_str(line.as_bytes()).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sweep::BANDS;
    use rstest::rstest;

    fn render(p: Padded) -> std::string::String {
        let mut line = Line::empty();
        uwrite!(line, "{}", p).unwrap();
        line.as_str().into()
    }

    #[rstest]
    #[case(Padded::spaces(7, 2), " 7")]
    #[case(Padded::spaces(14, 2), "14")]
    #[case(Padded::spaces(123, 2), "123")]
    #[case(Padded::zeros(150_000, 6), "150000")]
    #[case(Padded::zeros(5, 3), "005")]
    #[case(Padded::zeros(0, 2), "00")]
    fn padded_matches_printf(#[case] p: Padded, #[case] expected: &str) {
        assert_eq!(render(p), expected);
    }

    #[test]
    fn result_screen_layout() {
        let screen = Screen::result(SweepResult {
            hz: 7_150_000,
            vswr: 1523,
        });
        assert_eq!(screen.lines[0].as_str(), "Freq:  7.150000");
        assert_eq!(screen.lines[1].as_str(), "SWR:  1.523");

        let screen = Screen::result(SweepResult {
            hz: 28_000_001,
            vswr: u16::MAX,
        });
        assert_eq!(screen.lines[0].as_str(), "Freq: 28.000001");
        assert_eq!(screen.lines[1].as_str(), "SWR: 65.535");
    }

    #[test]
    fn edge_screen_layout() {
        let screen = Screen::edges(EdgeProfile {
            low: 1500,
            mid: 1050,
            high: 9999,
        });
        assert_eq!(screen.lines[0].as_str(), "A     B     C");
        assert_eq!(screen.lines[1].as_str(), "1.50  1.05  9.99");
    }

    #[test]
    fn selection_screen_and_truncation() {
        let screen = Screen::selection(Mode::BandStart, &BANDS[3]);
        assert_eq!(screen.lines[0].as_str(), "Mode: band start");
        assert_eq!(screen.lines[1].as_str(), "Band: 40m");

        let mut line = Line::empty();
        uwrite!(line, "{}", "0123456789abcdefXYZ").unwrap();
        assert_eq!(line.as_str(), "0123456789abcdef");
    }
}
