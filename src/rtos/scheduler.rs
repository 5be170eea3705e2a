//! Cooperative round-robin scheduler
//!
//! The scheduler is split in two halves. [`Kernel`] holds everything an
//! interrupt handler may touch (task states, the time base, the current task)
//! behind a single critical-section mutex, so it can live in a `static`.
//! [`Executor`] owns the pinned task futures and runs the dispatch loop; it
//! never leaves the main context.
//!
//! Tasks block only at `.await` points on the futures handed out by the
//! kernel (`yield_now`, `sleep`, `suspend`, suspension channels). A task is
//! polled only while it is `Ready`, so every yield point resumes exactly once
//! per wakeup.

use core::cell::RefCell;
use core::convert::Infallible;
use core::future::Future;
use core::pin::Pin;
use core::ptr;
use core::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

use critical_section::{CriticalSection, Mutex};

use super::task::{Block, TaskHandle, TaskState, YieldNow};
use super::timebase::{elapsed, TimeBase};
use crate::config::{MAX_TASKS, TICK_US};
use crate::error::Error;

struct TaskTable {
    states: [TaskState; MAX_TASKS],
    count: u8,
    current: Option<TaskHandle>,
}

impl TaskTable {
    const fn new() -> Self {
        Self {
            states: [TaskState::Free; MAX_TASKS],
            count: 0,
            current: None,
        }
    }
}

/// Task states and time base shared between tasks and interrupt handlers.
pub struct Kernel {
    time: TimeBase,
    table: Mutex<RefCell<TaskTable>>,
}

impl Kernel {
    pub const fn new() -> Self {
        Self {
            time: TimeBase::new(),
            table: Mutex::new(RefCell::new(TaskTable::new())),
        }
    }

    /// Reset the task pool and the time base.
    pub fn init(&self) {
        self.time.reset();
        critical_section::with(|cs| *self.table.borrow_ref_mut(cs) = TaskTable::new());
    }

    /// Timer interrupt hook.
    #[inline]
    pub fn tick(&self) {
        self.time.tick(TICK_US);
    }

    #[inline]
    pub fn msec(&self) -> u16 {
        self.time.msec()
    }

    #[inline]
    pub fn usec(&self) -> u16 {
        self.time.usec()
    }

    /// Task currently being polled, `None` outside the dispatch loop.
    pub fn current(&self) -> Option<TaskHandle> {
        critical_section::with(|cs| self.table.borrow_ref(cs).current)
    }

    pub fn state(&self, task: TaskHandle) -> TaskState {
        critical_section::with(|cs| self.table.borrow_ref(cs).states[task.index()])
    }

    /// Give up the CPU until the next dispatch round.
    pub fn yield_now(&self) -> YieldNow {
        YieldNow::new()
    }

    /// Sleep for at least `ms` milliseconds. `sleep(0)` is a single yield.
    pub async fn sleep(&self, ms: u16) {
        if ms == 0 {
            self.yield_now().await;
        } else {
            let since = self.msec();
            Block::on_first_poll(self, TaskState::Sleeping { since, duration: ms }).await;
        }
    }

    /// Park the current task until someone calls [`Kernel::wakeup`] on it.
    pub fn suspend(&self) -> Block<'_> {
        Block::on_first_poll(self, TaskState::Suspended)
    }

    /// Make a suspended task ready again. Safe to call from interrupt
    /// context; a no-op for tasks that are not suspended.
    pub fn wakeup(&self, task: TaskHandle) {
        critical_section::with(|cs| self.wakeup_in(cs, task));
    }

    /// Yield until at least `us` microseconds have passed.
    pub async fn yield_usec(&self, us: u16) {
        let mut remaining = us;
        let mut t1 = self.usec();
        loop {
            self.yield_now().await;
            let t2 = self.usec();
            let dt = elapsed(t2, t1);
            if dt >= remaining {
                break;
            }
            remaining -= dt;
            t1 = t2;
        }
    }

    pub(crate) fn wakeup_in(&self, cs: CriticalSection<'_>, task: TaskHandle) {
        let mut table = self.table.borrow_ref_mut(cs);
        if let Some(state) = table.states.get_mut(task.index()) {
            if *state == TaskState::Suspended {
                *state = TaskState::Ready;
            }
        }
    }

    pub(crate) fn current_in(&self, cs: CriticalSection<'_>) -> Option<TaskHandle> {
        self.table.borrow_ref(cs).current
    }

    pub(crate) fn set_state_in(&self, cs: CriticalSection<'_>, task: TaskHandle, state: TaskState) {
        self.table.borrow_ref_mut(cs).states[task.index()] = state;
    }

    /// Put the current task into `state`. Returns false outside a task.
    pub(crate) fn block_current(&self, state: TaskState) -> bool {
        critical_section::with(|cs| match self.current_in(cs) {
            Some(task) => {
                self.set_state_in(cs, task, state);
                true
            }
            None => false,
        })
    }

    pub(crate) fn current_is_ready(&self) -> bool {
        critical_section::with(|cs| {
            let table = self.table.borrow_ref(cs);
            match table.current {
                Some(task) => table.states[task.index()] == TaskState::Ready,
                None => true,
            }
        })
    }

    fn register(&self) -> Result<TaskHandle, Error> {
        critical_section::with(|cs| {
            let mut table = self.table.borrow_ref_mut(cs);
            let index = table.count as usize;
            if index >= MAX_TASKS {
                return Err(Error::PoolExhausted);
            }
            table.states[index] = TaskState::Ready;
            table.count += 1;
            Ok(TaskHandle(index as u8))
        })
    }

    /// Promote an expired sleeper and, if the task is ready, make it current.
    fn enter(&self, task: TaskHandle) -> bool {
        critical_section::with(|cs| {
            let now = self.time.msec();
            let mut table = self.table.borrow_ref_mut(cs);
            let state = &mut table.states[task.index()];
            if let TaskState::Sleeping { since, duration } = *state {
                if elapsed(now, since) >= duration {
                    *state = TaskState::Ready;
                }
            }
            if *state == TaskState::Ready {
                table.current = Some(task);
                true
            } else {
                false
            }
        })
    }

    fn leave(&self) {
        critical_section::with(|cs| self.table.borrow_ref_mut(cs).current = None);
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new()
    }
}

/// A task: a pinned future that never completes.
pub type TaskFuture<'a> = Pin<&'a mut (dyn Future<Output = Infallible> + 'a)>;

/// Owns the task futures and dispatches them in creation order.
pub struct Executor<'a> {
    kernel: &'a Kernel,
    tasks: [Option<TaskFuture<'a>>; MAX_TASKS],
}

impl<'a> Executor<'a> {
    /// Reset `kernel` and start with an empty pool.
    pub fn new(kernel: &'a Kernel) -> Self {
        kernel.init();
        Self {
            kernel,
            tasks: core::array::from_fn(|_| None),
        }
    }

    /// Register a task in the ready state.
    pub fn create(&mut self, task: TaskFuture<'a>) -> Result<TaskHandle, Error> {
        let handle = match self.kernel.register() {
            Ok(handle) => handle,
            Err(e) => {
                error!("create: {}", e);
                return Err(e);
            }
        };
        self.tasks[handle.index()] = Some(task);
        debug!("task {} created", handle.0);
        Ok(handle)
    }

    /// One round-robin pass over the pool. Returns whether any task ran.
    pub fn dispatch(&mut self) -> bool {
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);
        let mut ran = false;

        for (index, slot) in self.tasks.iter_mut().enumerate() {
            let Some(task) = slot else { continue };
            let handle = TaskHandle(index as u8);
            if !self.kernel.enter(handle) {
                continue;
            }
            ran = true;
            match task.as_mut().poll(&mut cx) {
                Poll::Pending => {}
                Poll::Ready(never) => match never {},
            }
            self.kernel.leave();
        }
        ran
    }

    /// Run the dispatch loop forever, calling `idle` whenever every task is
    /// blocked. `idle` should wait for the next interrupt.
    pub fn start(mut self, mut idle: impl FnMut()) -> ! {
        info!("scheduler started");
        loop {
            if !self.dispatch() {
                idle();
            }
        }
    }
}

// The executor re-polls by scanning task states, so wakers carry nothing.
const NOOP_VTABLE: RawWakerVTable = RawWakerVTable::new(noop_clone, noop, noop, noop);

fn noop_clone(_: *const ()) -> RawWaker {
    RawWaker::new(ptr::null(), &NOOP_VTABLE)
}

fn noop(_: *const ()) {}

pub(crate) fn noop_waker() -> Waker {
    // SAFETY: every vtable entry ignores the data pointer.
    unsafe { Waker::from_raw(RawWaker::new(ptr::null(), &NOOP_VTABLE)) }
}
