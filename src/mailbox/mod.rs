//! Interrupt-safe event mailbox.
//!
//! Upstream code (network stack callbacks, button interrupts, other threads)
//! must not run transmissions itself: a frame keeps the caller busy for
//! hundreds of milliseconds. Instead it posts an [`Event`] into a
//! [`Mailbox`] and returns immediately. The controller drains the mailbox
//! from its own context.
//!
//! The queue is a fixed-capacity [`heapless::Deque`] guarded by a
//! `critical_section::Mutex`, so a `static` mailbox can be shared between
//! interrupt handlers and the main loop without `unsafe`.
//!
//! ## Example
//! ```rust
//! use came433::channel::CHANNEL_A;
//! use came433::controller::{Event, EventSource};
//! use came433::init_mailbox;
//!
//! init_mailbox!(EVENTS, 8);
//!
//! // from a callback
//! EVENTS.post(Event::Activate(CHANNEL_A)).unwrap();
//!
//! // from the controller context
//! let mut source = &EVENTS;
//! assert_eq!(source.next_event(), Some(Event::Activate(CHANNEL_A)));
//! ```

use core::cell::RefCell;
use core::fmt;

use critical_section::Mutex;
use heapless::Deque;

use crate::controller::{Event, EventSource};
use crate::error::Error;

mod macros;

/// Default number of events a mailbox can hold.
pub const DEFAULT_MAILBOX_DEPTH: usize = 8;

/// A fixed-capacity, critical-section protected event queue.
pub struct Mailbox<const N: usize> {
    queue: Mutex<RefCell<Deque<Event, N>>>,
}

impl<const N: usize> Mailbox<N> {
    /// Creates an empty mailbox. Usable in `static` initializers.
    pub const fn new() -> Self {
        Self {
            queue: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Queues `event` without blocking.
    ///
    /// # Errors
    /// [`Error::QueueFull`] if the mailbox is full; the event is dropped.
    pub fn post(&self, event: Event) -> Result<(), Error> {
        critical_section::with(|cs| self.queue.borrow_ref_mut(cs).push_back(event)).map_err(
            |event| {
                warn!("mailbox full, dropping {}", event);
                Error::QueueFull
            },
        )
    }

    /// Removes the oldest event.
    pub fn take(&self) -> Option<Event> {
        critical_section::with(|cs| self.queue.borrow_ref_mut(cs).pop_front())
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.queue.borrow_ref(cs).len())
    }

    /// Returns `true` if no event is queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every queued event.
    pub fn clear(&self) {
        critical_section::with(|cs| self.queue.borrow_ref_mut(cs).clear())
    }
}

impl<const N: usize> Default for Mailbox<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Debug for Mailbox<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mailbox")
            .field("capacity", &N)
            .field("len", &self.len())
            .finish()
    }
}

impl<const N: usize> EventSource for &Mailbox<N> {
    fn next_event(&mut self) -> Option<Event> {
        self.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{CHANNEL_A, CHANNEL_B};
    use crate::led::IdentifyEffect;

    #[test]
    fn test_fifo_order() {
        let mailbox: Mailbox<4> = Mailbox::new();
        mailbox.post(Event::Activate(CHANNEL_A)).unwrap();
        mailbox.post(Event::Identify(IdentifyEffect::Okay)).unwrap();
        mailbox.post(Event::Activate(CHANNEL_B)).unwrap();
        assert_eq!(mailbox.len(), 3);

        assert_eq!(mailbox.take(), Some(Event::Activate(CHANNEL_A)));
        assert_eq!(mailbox.take(), Some(Event::Identify(IdentifyEffect::Okay)));
        assert_eq!(mailbox.take(), Some(Event::Activate(CHANNEL_B)));
        assert_eq!(mailbox.take(), None);
    }

    #[test]
    fn test_full_mailbox_rejects() {
        let mailbox: Mailbox<2> = Mailbox::new();
        mailbox.post(Event::Activate(CHANNEL_A)).unwrap();
        mailbox.post(Event::Activate(CHANNEL_A)).unwrap();
        assert_eq!(
            mailbox.post(Event::Activate(CHANNEL_B)),
            Err(Error::QueueFull)
        );
        assert_eq!(mailbox.len(), 2);

        mailbox.clear();
        assert!(mailbox.is_empty());
    }

    #[test]
    fn test_static_mailbox_across_threads() {
        crate::init_mailbox!(SHARED, 64);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                std::thread::spawn(|| {
                    for _ in 0..10 {
                        SHARED.post(Event::Activate(CHANNEL_A)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut source = &SHARED;
        let mut count = 0;
        while source.next_event().is_some() {
            count += 1;
        }
        assert_eq!(count, 40);
    }
}
