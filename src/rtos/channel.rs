//! Single-slot rendezvous between a task and an interrupt handler
//!
//! A task records itself as the waiter, arms the hardware event and suspends,
//! all inside one critical section. The interrupt handler can therefore only
//! run once the task is already marked suspended, and its `notify` always
//! finds a waiter to wake.
//!
//! There is no timeout: an armed event that never fires blocks its task
//! forever.

use core::cell::Cell;

use critical_section::Mutex;

use super::scheduler::Kernel;
use super::task::{Block, TaskHandle, TaskState};
use crate::error::Error;

pub struct SuspensionChannel {
    waiter: Mutex<Cell<Option<TaskHandle>>>,
}

impl SuspensionChannel {
    pub const fn new() -> Self {
        Self {
            waiter: Mutex::new(Cell::new(None)),
        }
    }

    /// Register the current task, run `arm` and suspend, atomically.
    ///
    /// The returned future completes once the interrupt handler has called
    /// [`notify`](Self::notify). Fails if a waiter is already pending or when
    /// called outside a task.
    pub fn wait<'k>(&self, kernel: &'k Kernel, arm: impl FnOnce()) -> Result<Block<'k>, Error> {
        let armed = critical_section::with(|cs| {
            let slot = self.waiter.borrow(cs);
            if slot.get().is_some() {
                return Err(Error::ChannelBusy);
            }
            let task = kernel.current_in(cs).ok_or(Error::NotInTask)?;
            slot.set(Some(task));
            arm();
            kernel.set_state_in(cs, task, TaskState::Suspended);
            Ok(())
        });

        match armed {
            Ok(()) => Ok(Block::already_blocked(kernel)),
            Err(e) => {
                warn!("channel: {}", e);
                Err(e)
            }
        }
    }

    /// Wake the pending waiter, if any. Called from the interrupt handler.
    pub fn notify(&self, kernel: &Kernel) {
        critical_section::with(|cs| {
            if let Some(task) = self.waiter.borrow(cs).take() {
                kernel.wakeup_in(cs, task);
            }
        });
    }

    pub fn is_armed(&self) -> bool {
        critical_section::with(|cs| self.waiter.borrow(cs).get().is_some())
    }
}

impl Default for SuspensionChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtos::Executor;
    use core::cell::Cell;
    use core::convert::Infallible;
    use core::pin::pin;

    async fn converter(
        kernel: &Kernel,
        channel: &SuspensionChannel,
        armed: &Cell<u8>,
        completed: &Cell<u8>,
    ) -> Infallible {
        loop {
            channel
                .wait(kernel, || armed.set(armed.get() + 1))
                .unwrap()
                .await;
            completed.set(completed.get() + 1);
        }
    }

    /// Arms the event and lets the "interrupt" fire before the task has
    /// returned to the dispatcher.
    async fn racer(
        kernel: &Kernel,
        channel: &SuspensionChannel,
        completed: &Cell<u8>,
    ) -> Infallible {
        loop {
            let wait = channel.wait(kernel, || {}).unwrap();
            channel.notify(kernel);
            wait.await;
            completed.set(completed.get() + 1);
            kernel.sleep(1).await;
        }
    }

    #[test]
    fn waiter_is_woken_when_interrupt_fires_later() {
        let kernel = Kernel::new();
        let channel = SuspensionChannel::new();
        let armed = Cell::new(0);
        let completed = Cell::new(0);
        let mut fut = pin!(converter(&kernel, &channel, &armed, &completed));

        let mut executor = Executor::new(&kernel);
        let task = executor.create(fut.as_mut()).unwrap();
        executor.dispatch();
        assert_eq!(armed.get(), 1);
        assert!(channel.is_armed());
        assert_eq!(kernel.state(task), TaskState::Suspended);

        for _ in 0..3 {
            kernel.tick();
            assert!(!executor.dispatch());
        }

        channel.notify(&kernel);
        assert!(!channel.is_armed());
        executor.dispatch();
        assert_eq!(completed.get(), 1);
        assert_eq!(armed.get(), 2);
    }

    #[test]
    fn interrupt_between_arm_and_dispatch_is_not_lost() {
        let kernel = Kernel::new();
        let channel = SuspensionChannel::new();
        let completed = Cell::new(0);
        let mut fut = pin!(racer(&kernel, &channel, &completed));

        let mut executor = Executor::new(&kernel);
        executor.create(fut.as_mut()).unwrap();
        executor.dispatch();
        assert_eq!(completed.get(), 1);
    }

    #[test]
    fn notify_without_waiter_is_noop() {
        let kernel = Kernel::new();
        let channel = SuspensionChannel::new();
        channel.notify(&kernel);
        assert!(!channel.is_armed());
    }

    #[test]
    fn wait_outside_a_task_is_rejected() {
        let kernel = Kernel::new();
        let channel = SuspensionChannel::new();
        let armed = Cell::new(false);
        assert_eq!(
            channel.wait(&kernel, || armed.set(true)).err(),
            Some(Error::NotInTask)
        );
        assert!(!armed.get());
        assert!(!channel.is_armed());
    }

    async fn double_armer(
        kernel: &Kernel,
        channel: &SuspensionChannel,
        second: &Cell<Option<Error>>,
    ) -> Infallible {
        let first = channel.wait(kernel, || {}).unwrap();
        second.set(channel.wait(kernel, || {}).err());
        first.await;
        loop {
            kernel.sleep(1000).await;
        }
    }

    #[test]
    fn rearming_a_pending_channel_is_a_contract_violation() {
        let kernel = Kernel::new();
        let channel = SuspensionChannel::new();
        let second = Cell::new(None);
        let mut fut = pin!(double_armer(&kernel, &channel, &second));

        let mut executor = Executor::new(&kernel);
        executor.create(fut.as_mut()).unwrap();
        executor.dispatch();
        assert_eq!(second.get(), Some(Error::ChannelBusy));
        assert!(channel.is_armed());
    }
}
