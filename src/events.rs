//! Queues between a light and the rest of the firmware
//!
//! Calls from other tasks or interrupts are queued as intents and drained by
//! the light on its next tick. State changes flow the other way as
//! [`LightEvent`]s. Both use the same bounded queue built on
//! `critical-section` and `heapless::Deque`.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Deque;

use crate::call::LightCall;
use crate::color::ColorValues;

/// Notification emitted by a light
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightEvent {
    /// Remote values were published
    StateChanged(ColorValues),
    /// The current values reached the last requested target
    TargetReached,
}

/// Error returned when the queue is full
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrySendError<T>(pub T);

/// Error returned when the queue is empty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TryReceiveError;

/// Bounded queue shared between tasks and interrupts.
pub struct Channel<T, const SIZE: usize> {
    inner: Mutex<RefCell<Deque<T, SIZE>>>,
}

impl<T, const SIZE: usize> Channel<T, SIZE> {
    /// Create an empty queue.
    ///
    /// `const`, so a queue can live in a `static` shared with interrupts.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Get a sending handle.
    ///
    /// Handles are `Copy`; any number of tasks may hold one.
    pub const fn sender(&self) -> Sender<'_, T, SIZE> {
        Sender { channel: self }
    }

    /// Get a receiving handle.
    ///
    /// Items are handed out once, so a single consumer (usually the light
    /// tick) should drain the queue.
    pub const fn receiver(&self) -> Receiver<'_, T, SIZE> {
        Receiver { channel: self }
    }

    /// Push an item to the back of the queue without blocking.
    ///
    /// Returns `Err(TrySendError(value))` with the rejected item when the
    /// queue already holds `SIZE` items.
    pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
        critical_section::with(|cs| {
            let mut queue = self.inner.borrow(cs).borrow_mut();
            queue.push_back(value).map_err(TrySendError)
        })
    }

    /// Pop the oldest item without blocking.
    ///
    /// Returns `Err(TryReceiveError)` when nothing is queued.
    pub fn try_receive(&self) -> Result<T, TryReceiveError> {
        critical_section::with(|cs| {
            let mut queue = self.inner.borrow(cs).borrow_mut();
            queue.pop_front().ok_or(TryReceiveError)
        })
    }

    /// Number of queued items
    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.inner.borrow(cs).borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T, const SIZE: usize> Default for Channel<T, SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

/// Sending side of a [`Channel`].
///
/// Only a reference to the queue, cheap to copy into other tasks.
#[derive(Clone, Copy)]
pub struct Sender<'a, T, const SIZE: usize> {
    channel: &'a Channel<T, SIZE>,
}

impl<T, const SIZE: usize> Sender<'_, T, SIZE> {
    /// Queue an item, see [`Channel::try_send`].
    pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
        self.channel.try_send(value)
    }
}

/// Receiving side of a [`Channel`].
#[derive(Clone, Copy)]
pub struct Receiver<'a, T, const SIZE: usize> {
    channel: &'a Channel<T, SIZE>,
}

impl<T, const SIZE: usize> Receiver<'_, T, SIZE> {
    /// Take the oldest item, see [`Channel::try_receive`].
    pub fn try_receive(&self) -> Result<T, TryReceiveError> {
        self.channel.try_receive()
    }
}

/// Capacity of the event queue
pub const EVENT_CHANNEL_SIZE: usize = 8;

/// Capacity of the intent queue
pub const INTENT_CHANNEL_SIZE: usize = 4;

/// Queue of [`LightEvent`]s published by a light
pub type LightEventChannel = Channel<LightEvent, EVENT_CHANNEL_SIZE>;
pub type LightEventSender = Sender<'static, LightEvent, EVENT_CHANNEL_SIZE>;
pub type LightEventReceiver = Receiver<'static, LightEvent, EVENT_CHANNEL_SIZE>;

/// Queue of calls waiting for the next light tick
pub type LightIntentChannel = Channel<LightCall, INTENT_CHANNEL_SIZE>;
pub type LightIntentSender = Sender<'static, LightCall, INTENT_CHANNEL_SIZE>;
pub type LightIntentReceiver = Receiver<'static, LightCall, INTENT_CHANNEL_SIZE>;
