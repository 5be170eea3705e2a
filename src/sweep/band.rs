//! Amateur radio bands and measurement modes

/// Sweep and band limits of one amateur band, in Hz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub name: &'static str,
    /// Start of the minimum search sweep
    pub sweep_start: u32,
    /// End (exclusive) of the minimum search sweep
    pub sweep_stop: u32,
    /// Lower band edge
    pub start: u32,
    /// Upper band edge
    pub stop: u32,
}

impl Band {
    pub const fn mid(&self) -> u32 {
        self.start + (self.stop - self.start) / 2
    }
}

pub static BANDS: [Band; 10] = [
    Band {
        name: "160m",
        sweep_start: 1_500_000,
        sweep_stop: 2_300_000,
        start: 1_600_000,
        stop: 2_000_000,
    },
    Band {
        name: "80m",
        sweep_start: 2_000_000,
        sweep_stop: 5_000_000,
        start: 3_500_000,
        stop: 4_000_000,
    },
    Band {
        name: "60m",
        sweep_start: 5_000_000,
        sweep_stop: 6_000_000,
        start: 5_332_000,
        stop: 5_405_000,
    },
    Band {
        name: "40m",
        sweep_start: 6_000_000,
        sweep_stop: 8_000_000,
        start: 7_000_000,
        stop: 7_300_000,
    },
    Band {
        name: "30m",
        sweep_start: 9_000_000,
        sweep_stop: 11_000_000,
        start: 10_100_000,
        stop: 10_150_000,
    },
    Band {
        name: "20m",
        sweep_start: 13_000_000,
        sweep_stop: 16_000_000,
        start: 14_000_000,
        stop: 14_350_000,
    },
    Band {
        name: "17m",
        sweep_start: 17_000_000,
        sweep_stop: 19_000_000,
        start: 18_068_000,
        stop: 18_168_000,
    },
    Band {
        name: "15m",
        sweep_start: 20_000_000,
        sweep_stop: 23_000_000,
        start: 21_000_000,
        stop: 21_450_000,
    },
    Band {
        name: "12m",
        sweep_start: 24_000_000,
        sweep_stop: 26_000_000,
        start: 24_890_000,
        stop: 24_990_000,
    },
    Band {
        name: "10m",
        sweep_start: 28_000_000,
        sweep_stop: 30_000_000,
        start: 28_000_000,
        stop: 29_700_000,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Two-phase search for the lowest VSWR in the sweep range
    SwrMin,
    BandStart,
    BandStop,
    BandMid,
    /// VSWR at start, middle and stop of the band
    BandEdge,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::SwrMin,
        Mode::BandStart,
        Mode::BandStop,
        Mode::BandMid,
        Mode::BandEdge,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Mode::SwrMin => "SWR min",
            Mode::BandStart => "band start",
            Mode::BandStop => "band stop",
            Mode::BandMid => "band mid",
            Mode::BandEdge => "band edge",
        }
    }

    pub fn next(self) -> Mode {
        let index = Self::ALL.iter().position(|&m| m == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

/// Mode and band currently selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub mode: Mode,
    band: u8,
}

impl Selection {
    pub const fn new() -> Self {
        Self {
            mode: Mode::SwrMin,
            band: 0,
        }
    }

    pub fn band(&self) -> &'static Band {
        &BANDS[self.band as usize % BANDS.len()]
    }

    pub fn next_mode(self) -> Self {
        Self {
            mode: self.mode.next(),
            ..self
        }
    }

    pub fn next_band(self) -> Self {
        Self {
            band: (self.band + 1) % BANDS.len() as u8,
            ..self
        }
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::new()
    }
}
