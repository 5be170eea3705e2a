//! Host-side fakes and a blocking runner for unit tests

use core::convert::Infallible;
use core::future::Future;
use core::pin::pin;
use std::boxed::Box;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::digital::v2::{InputPin, OutputPin};

use crate::rtos::{Executor, Kernel};
use crate::sweep::{Port, PowerSensor, Synthesizer};

/// Upper bound on simulated timer ticks before `block_on` gives up.
const MAX_TICKS: u32 = 2_000_000;

async fn capture<F: Future>(kernel: &Kernel, fut: F, out: &RefCell<Option<F::Output>>) -> Infallible {
    let value = fut.await;
    *out.borrow_mut() = Some(value);
    loop {
        kernel.sleep(u16::MAX).await;
    }
}

/// Run `fut` as the only task, ticking the time base once per dispatch
/// round, until it completes.
pub fn block_on<F: Future>(kernel: &Kernel, fut: F) -> F::Output {
    let out = RefCell::new(None);
    let mut task = pin!(capture(kernel, fut, &out));
    let mut executor = Executor::new(kernel);
    executor.create(task.as_mut()).unwrap();

    for _ in 0..MAX_TICKS {
        executor.dispatch();
        if let Some(value) = out.borrow_mut().take() {
            return value;
        }
        kernel.tick();
    }
    panic!("future did not complete within {} ticks", MAX_TICKS);
}

/// Synthesizer that records every frequency it was tuned to.
pub struct FakeSynth {
    tuned: Rc<Cell<u32>>,
    history: Vec<u32>,
    resets: Rc<RefCell<Vec<usize>>>,
    fail_above: Option<u32>,
}

impl FakeSynth {
    pub fn new(tuned: Rc<Cell<u32>>) -> Self {
        Self {
            tuned,
            history: Vec::new(),
            resets: Rc::new(RefCell::new(Vec::new())),
            fail_above: None,
        }
    }

    pub fn fail_above(&mut self, hz: u32) {
        self.fail_above = Some(hz);
    }

    pub fn history(&self) -> Vec<u32> {
        self.history.clone()
    }

    /// Number of tunings already made at each reset, shared so it stays
    /// readable after the synthesizer is moved into a task.
    pub fn resets(&self) -> Rc<RefCell<Vec<usize>>> {
        self.resets.clone()
    }
}

impl Synthesizer for FakeSynth {
    type Error = ();

    fn reset(&mut self) -> Result<(), ()> {
        self.resets.borrow_mut().push(self.history.len());
        Ok(())
    }

    fn set_freq(&mut self, hz: u32) -> Result<(), ()> {
        if self.fail_above.is_some_and(|limit| hz > limit) {
            return Err(());
        }
        self.tuned.set(hz);
        self.history.push(hz);
        Ok(())
    }
}

/// Directional bridge whose forward/reverse readings depend on the frequency
/// the paired [`FakeSynth`] is tuned to.
pub struct FakeBridge {
    tuned: Rc<Cell<u32>>,
    response: Box<dyn Fn(u32) -> (u16, u16)>,
    sequence: Vec<(u16, u16)>,
    samples: usize,
}

impl FakeBridge {
    pub fn new(response: impl Fn(u32) -> (u16, u16) + 'static) -> Self {
        Self {
            tuned: Rc::new(Cell::new(0)),
            response: Box::new(response),
            sequence: Vec::new(),
            samples: 0,
        }
    }

    /// Cycle through fixed forward/reverse pairs regardless of frequency.
    pub fn sequence(pairs: &[(u16, u16)]) -> Self {
        Self {
            sequence: pairs.to_vec(),
            ..Self::new(|_| (0, 0))
        }
    }

    pub fn tuned(&self) -> Rc<Cell<u32>> {
        self.tuned.clone()
    }

    /// Number of ADC conversions taken so far.
    pub fn samples(&self) -> usize {
        self.samples
    }

    fn reading(&self, port: Port) -> u16 {
        let (fwd, rev) = if self.sequence.is_empty() {
            (self.response)(self.tuned.get())
        } else {
            // Both ports of one pair share an index
            self.sequence[(self.samples / 2) % self.sequence.len()]
        };
        match port {
            Port::Forward => fwd,
            Port::Reverse => rev,
        }
    }
}

impl PowerSensor for FakeBridge {
    async fn sample(&mut self, port: Port) -> u16 {
        let value = self.reading(port);
        self.samples += 1;
        value
    }
}

/// Output pin that appends `(name, level)` to a shared log.
#[derive(Clone)]
pub struct LogPin {
    name: &'static str,
    log: Rc<RefCell<Vec<(&'static str, bool)>>>,
}

impl LogPin {
    pub fn new(name: &'static str, log: &Rc<RefCell<Vec<(&'static str, bool)>>>) -> Self {
        Self {
            name,
            log: log.clone(),
        }
    }
}

impl OutputPin for LogPin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Infallible> {
        self.log.borrow_mut().push((self.name, false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.log.borrow_mut().push((self.name, true));
        Ok(())
    }
}

/// Input pin whose level the test sets directly.
#[derive(Clone)]
pub struct FakeInput {
    high: Rc<Cell<bool>>,
}

impl FakeInput {
    pub fn new(high: bool) -> Self {
        Self {
            high: Rc::new(Cell::new(high)),
        }
    }

    pub fn set_high(&self, high: bool) {
        self.high.set(high);
    }
}

impl InputPin for FakeInput {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Infallible> {
        Ok(self.high.get())
    }

    fn is_low(&self) -> Result<bool, Infallible> {
        Ok(!self.high.get())
    }
}
