//! Configuration constants for the VSWR analyzer firmware

/// CPU frequency in Hz
pub const CPU_FREQ_HZ: u32 = 16_000_000;

/// Period of the time base interrupt in microseconds
pub const TICK_US: u16 = 200;

/// Number of task slots in the scheduler pool
pub const MAX_TASKS: usize = 4;

/// Console baud rate (USART1)
pub const UART_BAUD: u32 = 9600;

/// AD9850 reference clock
pub const DDS_CLOCK_HZ: u32 = 125_000_000;

/// Number of steps across the full sweep range in the coarse pass
pub const COARSE_STEPS: u32 = 100;

/// Number of steps across the window around the coarse minimum
pub const FINE_STEPS: u32 = 20;

/// Settle time before every fine pass sample
pub const FINE_SETTLE_MS: u16 = 10;

/// Samples averaged by position and edge measurements
pub const POSITION_SAMPLES: u8 = 20;

/// Settle time before a batch of averaged samples
pub const POSITION_SETTLE_MS: u16 = 20;

/// Largest VSWR (x1000) the three-column edge layout can show
pub const EDGE_VSWR_MAX: u16 = 9999;

/// VSWR sentinel for unmeasurable readings
pub const VSWR_MAX: u16 = u16::MAX;

/// Inactivity before the UI switches from the selection screen to results
pub const IDLE_AFTER_MS: u16 = 1000;

/// Result screen refresh interval
pub const REFRESH_MS: u16 = 500;

/// Consecutive stable polls before a button change is accepted
pub const BUTTON_DEBOUNCE_POLLS: u8 = 2;
