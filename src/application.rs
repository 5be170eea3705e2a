//! The two firmware tasks
//!
//! The control task owns the buttons and the LCD. While the user is pressing
//! buttons it shows the mode/band selection; one second after the last key-up
//! it goes idle and redraws the latest sweep result every 500 ms. The sweep
//! task owns the DDS and the ADC and measures the current selection over and
//! over, publishing each result to [`Shared`].

use core::convert::Infallible;

use embedded_hal::digital::v2::InputPin;

use crate::config::{IDLE_AFTER_MS, REFRESH_MS};
use crate::display::{CharacterDisplay, Screen};
use crate::drivers::{Button, ButtonEvent, ButtonHandler};
use crate::rtos::{elapsed, Kernel};
use crate::shared::Shared;
use crate::sweep::{PowerSensor, Selection, SweepEngine, Synthesizer};

/// User interface state machine driven by the control task.
pub struct Controller<'a, D, MODE, BAND> {
    kernel: &'a Kernel,
    shared: &'a Shared,
    display: D,
    buttons: ButtonHandler<MODE, BAND>,
    idle: bool,
    last_press: u16,
    last_refresh: u16,
}

impl<'a, D, MODE, BAND, E> Controller<'a, D, MODE, BAND>
where
    D: CharacterDisplay,
    MODE: InputPin<Error = E>,
    BAND: InputPin<Error = E>,
{
    pub fn new(
        kernel: &'a Kernel,
        shared: &'a Shared,
        display: D,
        buttons: ButtonHandler<MODE, BAND>,
    ) -> Self {
        Self {
            kernel,
            shared,
            display,
            buttons,
            idle: false,
            last_press: 0,
            last_refresh: 0,
        }
    }

    /// Task body. Never returns.
    pub async fn run(mut self) -> Infallible {
        if self.start().await.is_err() {
            error!("lcd init failed");
        }
        loop {
            if self.step().await.is_err() {
                warn!("lcd write failed");
            }
            self.kernel.yield_now().await;
        }
    }

    /// Initialize the LCD and show the current selection.
    pub async fn start(&mut self) -> Result<(), D::Error> {
        self.display.init().await?;
        self.last_press = self.kernel.msec();
        self.idle = false;
        self.show_selection().await
    }

    /// One pass of the UI loop.
    pub async fn step(&mut self) -> Result<(), D::Error> {
        let event = match self.buttons.poll() {
            Ok(event) => event,
            Err(_) => {
                warn!("button read failed");
                None
            }
        };

        // Key-up changes the selection, but the first one after going idle
        // only wakes the UI.
        if let Some(ButtonEvent::Released(button)) = event {
            if !self.idle {
                let selection = self.shared.update_selection(|s| match button {
                    Button::Mode => s.next_mode(),
                    Button::Band => s.next_band(),
                });
                info!(
                    "mode {} band {}",
                    selection.mode.name(),
                    selection.band().name
                );
            }
            self.show_selection().await?;
            self.last_press = self.kernel.msec();
            self.idle = false;
        }

        let now = self.kernel.msec();
        if !self.idle && elapsed(now, self.last_press) >= IDLE_AFTER_MS {
            self.idle = true;
            // Due immediately
            self.last_refresh = now.wrapping_sub(REFRESH_MS);
        }

        if self.idle && elapsed(self.kernel.msec(), self.last_refresh) >= REFRESH_MS {
            self.last_refresh = self.kernel.msec();
            let screen = self.shared.screen();
            self.display.show(&screen).await?;
        }
        Ok(())
    }

    async fn show_selection(&mut self) -> Result<(), D::Error> {
        let selection = self.shared.selection();
        let screen = Screen::selection(selection.mode, selection.band());
        self.display.show(&screen).await
    }
}

/// Sweep task body: reset the DDS, then measure the current selection
/// forever. Never returns.
pub async fn sweep_task<S, P>(
    kernel: &Kernel,
    shared: &Shared,
    mut engine: SweepEngine<'_, S, P>,
) -> Infallible
where
    S: Synthesizer,
    P: PowerSensor,
{
    if engine.synth_mut().reset().is_err() {
        error!("dds reset failed");
    }
    loop {
        let selection: Selection = shared.selection();
        match engine.run(selection, shared).await {
            Ok(measurement) => info!(
                "{} {}: {}",
                selection.mode.name(),
                selection.band().name,
                measurement
            ),
            Err(_) => error!("sweep aborted: dds write failed"),
        }
        kernel.yield_now().await;
    }
}
