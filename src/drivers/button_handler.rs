use embedded_hal::digital::v2::InputPin;

use crate::config::BUTTON_DEBOUNCE_POLLS;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Button {
    Mode,
    Band,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ButtonEvent {
    Pressed(Button),
    Released(Button),
}

/// Mode and band push buttons, active low.
pub struct ButtonHandler<MODE, BAND> {
    mode: MODE,
    band: BAND,
    states: [bool; 2],
    debounce_counters: [u8; 2],
}

impl<MODE, BAND, E> ButtonHandler<MODE, BAND>
where
    MODE: InputPin<Error = E>,
    BAND: InputPin<Error = E>,
{
    pub fn new(mode: MODE, band: BAND) -> Self {
        Self {
            mode,
            band,
            states: [false; 2],
            debounce_counters: [0; 2],
        }
    }

    /// Sample both buttons once. A level change is reported after it has
    /// been seen on `BUTTON_DEBOUNCE_POLLS` consecutive polls; at most one
    /// event is returned per poll.
    pub fn poll(&mut self) -> Result<Option<ButtonEvent>, E> {
        let raw = [self.mode.is_low()?, self.band.is_low()?];

        for (idx, pressed) in raw.into_iter().enumerate() {
            if pressed == self.states[idx] {
                self.debounce_counters[idx] = 0;
                continue;
            }

            self.debounce_counters[idx] = self.debounce_counters[idx].saturating_add(1);
            if self.debounce_counters[idx] >= BUTTON_DEBOUNCE_POLLS {
                self.states[idx] = pressed;
                self.debounce_counters[idx] = 0;

                let btn = if idx == 0 { Button::Mode } else { Button::Band };
                return Ok(Some(if pressed {
                    ButtonEvent::Pressed(btn)
                } else {
                    ButtonEvent::Released(btn)
                }));
            }
        }
        Ok(None)
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        match button {
            Button::Mode => self.states[0],
            Button::Band => self.states[1],
        }
    }
}
