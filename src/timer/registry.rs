//! Fixed-capacity table of pending timeouts.
//!
//! ```text
//!  main-line                         tick ISR
//!  ─────────                         ────────
//!  register(now, delay, handler)     scan(now)
//!     │  critical section               │  critical section
//!     ▼                                 ▼
//!  ┌──────┬──────┬──────┬──────┐    collect due handlers (slot order)
//!  │ s0   │ s1   │ s2   │ s3   │    free their slots
//!  └──────┴──────┴──────┴──────┘       │  (section released)
//!     ▲                                 ▼
//!  cancel(id)                        run handlers
//! ```
//!
//! Handlers run after their slot is freed and outside the table borrow, so
//! a handler may re-arm itself by registering again.  A handler error is
//! logged and dropped; it never escapes the tick.
//!
//! Delays are capped at [`MAX_DELAY_MS`] so that "armed after `now`" and
//! "armed long ago" stay distinguishable on the wrapping clock: a scan
//! with a `now` older than an entry's arming time leaves it alone.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Vec;
use log::{debug, warn};

use super::clock::elapsed;
use crate::action::Action;
use crate::error::{Error, Result};

/// Longest delay [`register`](TimeoutRegistry::register) accepts, half the
/// clock range.
pub const MAX_DELAY_MS: u32 = i32::MAX as u32;

/// Identity of a registration, returned by
/// [`register`](TimeoutRegistry::register) and accepted by
/// [`cancel`](TimeoutRegistry::cancel).
///
/// The generation changes every time a slot is reused, so a stale id never
/// cancels somebody else's timeout until that slot has been recycled 2^32
/// times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeoutId {
    slot: u16,
    generation: u32,
}

impl TimeoutId {
    pub fn slot(&self) -> usize {
        self.slot as usize
    }
}

/// Internal bookkeeping for a live registration.
#[derive(Clone, Copy)]
struct Entry<'a> {
    armed_at: u32,
    delay_ms: u32,
    handler: &'a dyn Action,
}

impl Entry<'_> {
    fn deadline(&self) -> u32 {
        self.armed_at.wrapping_add(self.delay_ms)
    }

    /// Due once `delay_ms` ticks have elapsed since arming.  Comparing
    /// elapsed time instead of absolute deadlines survives counter wrap.
    /// An age past [`MAX_DELAY_MS`] means `armed_at` is ahead of `now`.
    fn is_due(&self, now: u32) -> bool {
        let age = elapsed(now, self.armed_at);
        age <= MAX_DELAY_MS && age >= self.delay_ms
    }
}

struct Slots<'a, const N: usize> {
    entries: [Option<Entry<'a>>; N],
    generations: [u32; N],
}

pub struct TimeoutRegistry<'a, const N: usize> {
    slots: Mutex<RefCell<Slots<'a, N>>>,
}

impl<const N: usize> Default for TimeoutRegistry<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const N: usize> TimeoutRegistry<'a, N> {
    pub const fn new() -> Self {
        const { assert!(N <= u16::MAX as usize + 1, "slot index must fit in a TimeoutId") };
        Self {
            slots: Mutex::new(RefCell::new(Slots {
                entries: [None; N],
                generations: [0; N],
            })),
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Schedule `handler` to run `delay_ms` ticks after `now`.
    ///
    /// Takes the first free slot.  Fails with
    /// [`Error::ResourceExhausted`] when every slot is live; nothing is
    /// queued, the caller decides whether to retry, drop or escalate.
    /// Delays above [`MAX_DELAY_MS`] are refused with [`Error::Config`].
    pub fn register(&self, now: u32, delay_ms: u32, handler: &'a dyn Action) -> Result<TimeoutId> {
        if delay_ms > MAX_DELAY_MS {
            return Err(Error::Config("timeout delay exceeds MAX_DELAY_MS"));
        }
        critical_section::with(|cs| {
            let mut slots = self.slots.borrow_ref_mut(cs);
            let Some(index) = slots.entries.iter().position(Option::is_none) else {
                warn!("timeouts: all {} slots busy", N);
                return Err(Error::ResourceExhausted);
            };
            let entry = Entry {
                armed_at: now,
                delay_ms,
                handler,
            };
            debug!(
                "timeouts: slot {} armed at {} for {} ms (deadline {})",
                index,
                now,
                delay_ms,
                entry.deadline()
            );
            slots.entries[index] = Some(entry);
            Ok(TimeoutId {
                slot: index as u16,
                generation: slots.generations[index],
            })
        })
    }

    /// Remove a registration that has not fired yet.
    ///
    /// Returns `false` if it already fired, was already cancelled, or the
    /// id is stale.  A handler that has started running cannot be recalled.
    pub fn cancel(&self, id: TimeoutId) -> bool {
        critical_section::with(|cs| {
            let mut slots = self.slots.borrow_ref_mut(cs);
            let index = id.slot();
            if index >= N || slots.generations[index] != id.generation {
                return false;
            }
            if slots.entries[index].take().is_none() {
                return false;
            }
            slots.generations[index] = slots.generations[index].wrapping_add(1);
            debug!("timeouts: slot {} cancelled", index);
            true
        })
    }

    /// Whether `id` is still waiting to fire.
    pub fn is_pending(&self, id: TimeoutId) -> bool {
        critical_section::with(|cs| {
            let slots = self.slots.borrow_ref(cs);
            let index = id.slot();
            index < N && slots.generations[index] == id.generation && slots.entries[index].is_some()
        })
    }

    /// Absolute deadline of a pending registration.
    pub fn deadline(&self, id: TimeoutId) -> Option<u32> {
        critical_section::with(|cs| {
            let slots = self.slots.borrow_ref(cs);
            let index = id.slot();
            if index >= N || slots.generations[index] != id.generation {
                return None;
            }
            slots.entries[index].as_ref().map(Entry::deadline)
        })
    }

    /// Number of live registrations.
    pub fn pending(&self) -> usize {
        critical_section::with(|cs| {
            self.slots
                .borrow_ref(cs)
                .entries
                .iter()
                .filter(|e| e.is_some())
                .count()
        })
    }

    /// Fire every registration that is due at `now`, in slot order.
    /// Returns how many handlers ran.
    pub fn scan(&self, now: u32) -> usize {
        let due = critical_section::with(|cs| {
            let mut slots = self.slots.borrow_ref_mut(cs);
            let mut due: Vec<(usize, &'a dyn Action), N> = Vec::new();
            let Slots {
                entries,
                generations,
            } = &mut *slots;
            for (index, (slot, generation)) in entries.iter_mut().zip(generations.iter_mut()).enumerate() {
                let Some(entry) = slot else { continue };
                if !entry.is_due(now) {
                    continue;
                }
                // At most N slots exist, so the push cannot overflow.
                let _ = due.push((index, entry.handler));
                *slot = None;
                *generation = generation.wrapping_add(1);
            }
            due
        });

        for (index, handler) in &due {
            if let Err(e) = handler.execute() {
                warn!("timeouts: handler in slot {} failed at {}: {}", index, now, e);
            }
        }
        due.len()
    }

    /// Drop every registration without running it.
    pub fn clear(&self) {
        critical_section::with(|cs| {
            let mut slots = self.slots.borrow_ref_mut(cs);
            let Slots {
                entries,
                generations,
            } = &mut *slots;
            for (slot, generation) in entries.iter_mut().zip(generations.iter_mut()) {
                if slot.take().is_some() {
                    *generation = generation.wrapping_add(1);
                }
            }
        });
    }
}
