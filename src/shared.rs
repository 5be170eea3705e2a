//! State shared between the control task and the sweep task
//!
//! The control task owns the selection and the LCD, the sweep task produces
//! result screens. Every access goes through the critical section so a
//! reader never sees a half-written selection or screen.

use core::cell::Cell;

use critical_section::Mutex;

use crate::display::Screen;
use crate::sweep::Selection;

pub struct Shared {
    selection: Mutex<Cell<Selection>>,
    screen: Mutex<Cell<Screen>>,
}

impl Shared {
    pub const fn new() -> Self {
        Self {
            selection: Mutex::new(Cell::new(Selection::new())),
            screen: Mutex::new(Cell::new(Screen::blank())),
        }
    }

    pub fn selection(&self) -> Selection {
        critical_section::with(|cs| self.selection.borrow(cs).get())
    }

    /// Apply `change` to the selection and return the new value.
    pub fn update_selection(&self, change: impl FnOnce(Selection) -> Selection) -> Selection {
        critical_section::with(|cs| {
            let cell = self.selection.borrow(cs);
            let next = change(cell.get());
            cell.set(next);
            next
        })
    }

    /// Latest result screen written by the sweep task.
    pub fn screen(&self) -> Screen {
        critical_section::with(|cs| self.screen.borrow(cs).get())
    }

    pub fn publish(&self, screen: &Screen) {
        critical_section::with(|cs| self.screen.borrow(cs).set(*screen));
    }
}

impl Default for Shared {
    fn default() -> Self {
        Self::new()
    }
}
