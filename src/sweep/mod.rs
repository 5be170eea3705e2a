//! VSWR measurement and minimum search
//!
//! All frequencies are integer Hz and all VSWR values are integers scaled by
//! 1000. The engine drives a frequency synthesizer and a two-channel power
//! detector through the [`Synthesizer`] and [`PowerSensor`] seams and sleeps
//! on the scheduler during every settle interval.

use ufmt::{uDisplay, uWrite, uwrite, Formatter};

use crate::display::{Padded, Screen};

mod band;
mod engine;
mod vswr;

pub use band::{Band, Mode, Selection, BANDS};
pub use engine::SweepEngine;
pub use vswr::{round_step_size, vswr};

/// Frequency source programmed before every measurement.
pub trait Synthesizer {
    type Error;

    fn reset(&mut self) -> Result<(), Self::Error>;

    fn set_freq(&mut self, hz: u32) -> Result<(), Self::Error>;
}

/// ADC input of the directional bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Port {
    /// Forward power, ADC6
    Forward = 6,
    /// Reverse power, ADC7
    Reverse = 7,
}

/// Source of raw detector readings. `sample` may suspend the calling task
/// until the conversion completes.
#[allow(async_fn_in_trait)]
pub trait PowerSensor {
    async fn sample(&mut self, port: Port) -> u16;
}

/// Frequency and VSWR of a single measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepResult {
    pub hz: u32,
    pub vswr: u16,
}

/// Averaged VSWR at band start, middle and stop, clamped for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeProfile {
    pub low: u16,
    pub mid: u16,
    pub high: u16,
}

/// Outcome of one pass for the selected mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measurement {
    Single(SweepResult),
    Edges(EdgeProfile),
}

impl Measurement {
    pub fn screen(&self) -> Screen {
        match *self {
            Measurement::Single(result) => Screen::result(result),
            Measurement::Edges(profile) => Screen::edges(profile),
        }
    }
}

struct Ratio(u16);

impl uDisplay for Ratio {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        uwrite!(f, "{}.{}", self.0 / 1000, Padded::zeros(u32::from(self.0 % 1000), 3))
    }
}

/// Console form, e.g. `14200000 Hz vswr 1.000`.
impl uDisplay for Measurement {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        match *self {
            Measurement::Single(r) => uwrite!(f, "{} Hz vswr {}", r.hz, Ratio(r.vswr)),
            Measurement::Edges(p) => uwrite!(
                f,
                "vswr {} {} {}",
                Ratio(p.low),
                Ratio(p.mid),
                Ratio(p.high)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::LogLine;

    fn render(m: Measurement) -> std::string::String {
        let mut line = LogLine::new();
        uwrite!(line, "{}", m).unwrap();
        line.as_str().into()
    }

    #[test]
    fn measurements_render_for_the_console() {
        let single = Measurement::Single(SweepResult {
            hz: 14_200_000,
            vswr: 1_050,
        });
        assert_eq!(render(single), "14200000 Hz vswr 1.050");

        let edges = Measurement::Edges(EdgeProfile {
            low: 1_500,
            mid: 1_000,
            high: 9_999,
        });
        assert_eq!(render(edges), "vswr 1.500 1.000 9.999");
    }
}
