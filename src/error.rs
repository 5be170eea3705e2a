//! Error codes shared by the scheduler and its collaborators

use ufmt::derive::uDebug;

#[derive(uDebug, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Every task slot is taken; the firmware must not start.
    PoolExhausted,
    /// A suspension channel was armed while a waiter was still pending.
    ChannelBusy,
    /// A blocking primitive was used outside the dispatch loop.
    NotInTask,
}

impl ufmt::uDisplay for Error {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        match self {
            Error::PoolExhausted => f.write_str("task pool exhausted"),
            Error::ChannelBusy => f.write_str("channel already armed"),
            Error::NotInTask => f.write_str("not called from a task"),
        }
    }
}
