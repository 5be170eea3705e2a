//! Cooperative multitasking: time base, task pool and interrupt rendezvous

pub mod channel;
pub mod scheduler;
pub mod task;
pub mod timebase;

pub use channel::SuspensionChannel;
pub use scheduler::{Executor, Kernel, TaskFuture};
pub use task::{TaskHandle, TaskState};
pub use timebase::elapsed;
