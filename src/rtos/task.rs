use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

use ufmt::derive::uDebug;

use super::scheduler::Kernel;

/// Opaque reference to a slot in the task pool.
#[derive(uDebug, Debug, Copy, Clone, PartialEq, Eq)]
pub struct TaskHandle(pub(crate) u8);

impl TaskHandle {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TaskState {
    /// Slot not yet handed out by `create`
    Free,
    Ready,
    /// Becomes ready once `duration` ms have passed since `since`
    Sleeping { since: u16, duration: u16 },
    /// Waits for `wakeup`
    Suspended,
}

/// Future returned by [`Kernel::yield_now`] and `sleep(0)`.
pub struct YieldNow {
    yielded: bool,
}

impl YieldNow {
    pub(crate) fn new() -> Self {
        Self { yielded: false }
    }
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            Poll::Ready(())
        } else {
            self.yielded = true;
            Poll::Pending
        }
    }
}

/// Future that parks the current task until the kernel marks it ready again.
///
/// Used both for timed sleeps and for suspension; the blocking state is
/// either applied on first poll or, for suspension channels, already applied
/// inside the arming critical section.
pub struct Block<'k> {
    kernel: &'k Kernel,
    pending: Option<TaskState>,
}

impl<'k> Block<'k> {
    pub(crate) fn on_first_poll(kernel: &'k Kernel, state: TaskState) -> Self {
        Self {
            kernel,
            pending: Some(state),
        }
    }

    pub(crate) fn already_blocked(kernel: &'k Kernel) -> Self {
        Self {
            kernel,
            pending: None,
        }
    }
}

impl Future for Block<'_> {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
        match self.pending.take() {
            Some(state) => {
                if self.kernel.block_current(state) {
                    Poll::Pending
                } else {
                    // Not polled by the executor: nothing to block
                    Poll::Ready(())
                }
            }
            None if self.kernel.current_is_ready() => Poll::Ready(()),
            None => Poll::Pending,
        }
    }
}
