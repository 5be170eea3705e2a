//! Firmware library for a portable antenna VSWR analyzer
//!
//! An ATmega32U4 drives an AD9850 DDS into a directional bridge, reads forward
//! and reverse power through the ADC and reports the VSWR on a 16x2 HD44780
//! LCD. Two cooperative tasks share the CPU: the control task owns the
//! buttons and the LCD, the sweep task owns the DDS and the ADC.
//!
//! Everything except `hal` is target independent and tested on the host.

#![cfg_attr(not(test), no_std)]

#[macro_use]
pub mod logger;

pub mod application;
pub mod config;
pub mod display;
pub mod drivers;
pub mod error;
pub mod rtos;
pub mod shared;
pub mod sweep;

#[cfg(target_arch = "avr")]
pub mod hal;

#[cfg(test)]
mod testing;

pub use error::Error;
