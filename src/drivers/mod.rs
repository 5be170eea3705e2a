pub mod ad9850;
pub mod adc_reader;
pub mod button_handler;
pub mod hd44780;
pub mod serial_console;

pub use ad9850::Ad9850;
pub use adc_reader::{AdcHardware, AdcReader};
pub use button_handler::{Button, ButtonEvent, ButtonHandler};
pub use hd44780::Hd44780;
pub use serial_console::SerialConsole;
