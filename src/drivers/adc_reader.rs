//! Interrupt-driven ADC sampling
//!
//! The sampling task starts a conversion and suspends on a
//! [`SuspensionChannel`]; the ADC complete interrupt notifies the channel.

use core::convert::Infallible;

use crate::rtos::{Kernel, SuspensionChannel};
use crate::sweep::{Port, PowerSensor};

/// Register-level access to the converter.
pub trait AdcHardware {
    /// Select `channel` and start a single conversion with the completion
    /// interrupt enabled.
    fn start(&mut self, channel: u8);

    /// Result of the last conversion, `WouldBlock` while it is in progress.
    fn read(&mut self) -> nb::Result<u16, Infallible>;
}

pub struct AdcReader<'k, H> {
    kernel: &'k Kernel,
    channel: &'k SuspensionChannel,
    hw: H,
}

impl<'k, H: AdcHardware> AdcReader<'k, H> {
    pub fn new(kernel: &'k Kernel, channel: &'k SuspensionChannel, hw: H) -> Self {
        Self {
            kernel,
            channel,
            hw,
        }
    }

    pub fn hardware(&self) -> &H {
        &self.hw
    }
}

impl<'k, H: AdcHardware> PowerSensor for AdcReader<'k, H> {
    /// Convert `port` and return the raw 10-bit result. A conversion that
    /// could not be waited for reads as 0, which the VSWR calculation turns
    /// into the unmeasurable maximum.
    async fn sample(&mut self, port: Port) -> u16 {
        let hw = &mut self.hw;
        match self.channel.wait(self.kernel, || hw.start(port as u8)) {
            Ok(done) => done.await,
            Err(e) => {
                error!("adc: {}", e);
                return 0;
            }
        }
        match nb::block!(self.hw.read()) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }
}
